//! Configuration system for ComboForge.
//!
//! Load engine configuration from TOML or YAML files to control combo size,
//! loadout size, pool growth and parallelism without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use comboforge_config::{EngineConfig, ThreadCount};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     combo_size = 4
//!     loadout_size = 6
//!     max_pool_size = 64000
//!     thread_count = { count = 8 }
//! "#).unwrap();
//!
//! assert_eq!(config.combo_size, 4);
//! assert_eq!(config.initial_pool_size, 2000);
//! assert_eq!(config.max_pool_size, Some(64000));
//! assert_eq!(config.thread_count, ThreadCount::Count(8));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use comboforge_config::EngineConfig;
//!
//! let config = EngineConfig::load("comboforge.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use comboforge_core::{ComboForgeError, MAX_COMBO_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default number of items per combo.
pub const DEFAULT_COMBO_SIZE: usize = 5;

/// Default number of disjoint combos in a loadout.
pub const DEFAULT_LOADOUT_SIZE: usize = 10;

/// Default size of the first mined candidate pool.
pub const DEFAULT_INITIAL_POOL_SIZE: usize = 2000;

/// Main engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct EngineConfig {
    /// Number of items in each combo (1 to 5).
    pub combo_size: usize,

    /// Number of disjoint combos in a loadout.
    pub loadout_size: usize,

    /// Number of combos mined before the first packing attempt.
    pub initial_pool_size: usize,

    /// Largest candidate pool the engine may grow to.
    ///
    /// When the cap is hit before optimality is proven, the best loadout
    /// found so far is returned unproven. `None` grows until proven.
    pub max_pool_size: Option<usize>,

    /// Worker threads for the parallel phases.
    pub thread_count: ThreadCount,

    /// Whether the packing phase runs the parallel score search.
    pub parallel_packing: bool,

    /// Whether champion combos are injected when the mined pool cannot be
    /// packed.
    pub diversity_injection: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            combo_size: DEFAULT_COMBO_SIZE,
            loadout_size: DEFAULT_LOADOUT_SIZE,
            initial_pool_size: DEFAULT_INITIAL_POOL_SIZE,
            max_pool_size: None,
            thread_count: ThreadCount::default(),
            parallel_packing: true,
            diversity_injection: true,
        }
    }
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn with_combo_size(mut self, combo_size: usize) -> Self {
        self.combo_size = combo_size;
        self
    }

    pub fn with_loadout_size(mut self, loadout_size: usize) -> Self {
        self.loadout_size = loadout_size;
        self
    }

    pub fn with_initial_pool_size(mut self, size: usize) -> Self {
        self.initial_pool_size = size;
        self
    }

    /// Caps pool growth, trading the optimality proof for bounded work.
    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = Some(size);
        self
    }

    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_parallel_packing(mut self, enabled: bool) -> Self {
        self.parallel_packing = enabled;
        self
    }

    pub fn with_diversity_injection(mut self, enabled: bool) -> Self {
        self.diversity_injection = enabled;
        self
    }

    /// Checks value ranges and cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check()
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Same checks as [`validate`](Self::validate), reported as the engine's
    /// error type.
    ///
    /// # Errors
    ///
    /// Returns the first bad field as a [`ComboForgeError`].
    pub fn check(&self) -> comboforge_core::Result<()> {
        if self.combo_size == 0 || self.combo_size > MAX_COMBO_SIZE {
            return Err(ComboForgeError::InvalidComboSize(self.combo_size));
        }
        if self.loadout_size == 0 {
            return Err(ComboForgeError::InvalidCount("loadout size"));
        }
        if self.initial_pool_size == 0 {
            return Err(ComboForgeError::InvalidCount("initial pool size"));
        }
        if let Some(max) = self.max_pool_size {
            if max < self.initial_pool_size {
                return Err(ComboForgeError::PoolCapBelowInitial {
                    max,
                    initial: self.initial_pool_size,
                });
            }
        }
        if self.thread_count == ThreadCount::Count(0) {
            return Err(ComboForgeError::InvalidCount("thread count"));
        }
        Ok(())
    }
}

/// Thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// Use the global thread pool.
    #[default]
    Auto,

    /// Run every phase on the calling thread.
    None,

    /// Specific number of threads.
    Count(usize),
}

impl ThreadCount {
    /// Explicit worker count, or `None` for the global pool size.
    pub fn resolve(self) -> Option<usize> {
        match self {
            ThreadCount::Auto => None,
            ThreadCount::None => Some(1),
            ThreadCount::Count(n) => Some(n),
        }
    }
}

#[cfg(test)]
mod tests;
