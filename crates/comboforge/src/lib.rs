//! ComboForge - optimal disjoint combo loadouts in Rust
//!
//! Give it a pool of weighted items and it finds the best loadout of
//! pairwise-disjoint combos, proving optimality by growing the candidate
//! pool until the best loadout clears the proof threshold.
//!
//! # Example
//!
//! ```rust
//! use comboforge::prelude::*;
//!
//! let items = CatalogBuilder::new()
//!     .item(ItemSpec::new(0, 5).category(0))
//!     .item(ItemSpec::new(1, 15).category(0))
//!     .item(ItemSpec::new(2, 45).category(0))
//!     .item(ItemSpec::new(3, 5).category(0))
//!     .item(ItemSpec::new(4, 15).category(0))
//!     .item(ItemSpec::new(5, 45).category(0))
//!     .build()
//!     .unwrap();
//!
//! let config = EngineConfig::new().with_combo_size(2).with_loadout_size(3);
//! let solution = run_engine_with_config(items, config).unwrap();
//!
//! assert_eq!(solution.total_score, 260);
//! assert!(solution.proven_optimal);
//! ```

// Item model
pub use comboforge_core::{
    items_from_mask, with_potentials, CatalogBuilder, Combo, ComboForgeError, Item, ItemMask,
    ItemSpec, PoolStats, Rarity, Result, MAX_COMBO_SIZE, MAX_ITEMS,
};

// Configuration
pub use comboforge_config::{ConfigError, EngineConfig, ThreadCount};

// Engine and monitoring
pub use comboforge_solver::{
    compute_disjoint_loadout, compute_potentials, mine_top_combos, CancellationToken,
    ChannelEventListener, ComboEngine, CountingEventListener, EngineEvent, EngineEventListener,
    EngineStats, FnEventListener, LoadoutSolution, LoggingEventListener, PhaseStats,
};

#[cfg(feature = "console")]
pub mod console;

mod solver;
pub use solver::{run_engine, run_engine_with_config, CONFIG_FILE};

/// Lower-level building blocks of the engine.
pub mod engine {
    pub use comboforge_core::{ComboState, PackedCombo};
    pub use comboforge_solver::{
        analyze_potentials, greedy_packing, inject_champions, mine, mine_best_containing,
        pack_round, ComboBounder, Packing, PackingOptions, PackingSolver,
    };
}

pub mod prelude {
    pub use super::{
        compute_disjoint_loadout, run_engine, run_engine_with_config, CancellationToken,
        CatalogBuilder, Combo, ComboEngine, EngineConfig, Item, ItemSpec, LoadoutSolution,
        ThreadCount,
    };
}

#[cfg(test)]
mod tests;
