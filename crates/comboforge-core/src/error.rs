//! Error types for ComboForge

use thiserror::Error;

/// Main error type for ComboForge operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComboForgeError {
    /// Combination size outside the supported range
    #[error("Combo size {0} is outside the supported range 1..=5")]
    InvalidComboSize(usize),

    /// The item pool handed to a search was empty
    #[error("Item pool is empty")]
    EmptyPool,

    /// An item index does not fit in the item universe
    #[error("Item index {0} exceeds the 512-item universe")]
    InvalidItemIndex(usize),

    /// Two items in the same pool share an index
    #[error("Item index {0} appears more than once in the pool")]
    DuplicateItemIndex(usize),

    /// A category index does not fit in the packed counter word
    #[error("Category {category} of item {index} exceeds the 13-category limit")]
    InvalidCategory { index: usize, category: usize },

    /// A requested count (results, loadout slots, pool size) was zero
    #[error("{0} must be at least 1")]
    InvalidCount(&'static str),

    /// A pool cap below the first mined pool
    #[error("Max pool size {max} is smaller than the initial pool size {initial}")]
    PoolCapBelowInitial { max: usize, initial: usize },

    /// An item reached the miner without an analyzed potential score
    #[error("Item {0} has no analyzed potential score")]
    MissingPotential(usize),

    /// A per-item table did not line up with the item pool
    #[error("Expected {expected} entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The search was cancelled before completion
    #[error("Search was cancelled")]
    Cancelled,
}

/// Result type alias for ComboForge operations
pub type Result<T> = std::result::Result<T, ComboForgeError>;
