//! Engine entry points that hide configuration wiring.

use comboforge_config::{ConfigError, EngineConfig};
use comboforge_core::{Item, Result};
use comboforge_solver::{ComboEngine, LoadoutSolution};
use tracing::warn;

/// Configuration file read by [`run_engine`] from the working directory.
pub const CONFIG_FILE: &str = "comboforge.toml";

/// Solves `items` with the settings in [`CONFIG_FILE`].
///
/// A missing file means defaults. A file that cannot be read or parsed is
/// logged and also falls back to defaults.
///
/// # Errors
///
/// Rejects an invalid item pool, and parsed settings that fail
/// [`EngineConfig::check`].
pub fn run_engine(items: Vec<Item>) -> Result<LoadoutSolution> {
    let config = match EngineConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            EngineConfig::default()
        }
        Err(err) => {
            warn!(event = "config_fallback", path = CONFIG_FILE, error = %err);
            EngineConfig::default()
        }
    };
    run_engine_with_config(items, config)
}

/// Solves `items` with `config`.
///
/// With the `console` feature the colored console is initialized first.
///
/// # Errors
///
/// Rejects an invalid item pool or configuration values.
pub fn run_engine_with_config(items: Vec<Item>, config: EngineConfig) -> Result<LoadoutSolution> {
    #[cfg(feature = "console")]
    crate::console::init();

    ComboEngine::with_config(items, config)?.solve()
}
