//! ComboForge Core - Core types for weighted combination search
//!
//! This crate provides the fundamental abstractions for ComboForge:
//! - Fixed-width item masks for O(1) compatibility tests
//! - Immutable items carrying precomputed masks and category counters
//! - The copy-on-branch accumulator used by every search phase
//! - Result combos and their packed projection for set packing
//! - A catalog builder that turns item specs into search-ready items

pub mod catalog;
pub mod combo;
pub mod error;
pub mod item;
pub mod mask;
pub mod pool;
pub mod state;

#[cfg(test)]
mod tests;

pub use catalog::{items_from_mask, with_potentials, CatalogBuilder, ItemSpec, Rarity};
pub use combo::{Combo, ComboItems, PackedCombo};
pub use error::{ComboForgeError, Result};
pub use item::{multiplier_for, Item, MULTIPLIERS};
pub use mask::{CategoryMask, ItemMask, MASK_WORDS, MAX_CATEGORIES, MAX_ITEMS};
pub use pool::{validate_pool, PoolStats};
pub use state::{ComboState, MAX_COMBO_SIZE};
