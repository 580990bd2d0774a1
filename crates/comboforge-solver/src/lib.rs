//! ComboForge Solver Engine
//!
//! This crate provides the search phases and the engine loop:
//! - Potential analysis (best score reachable by each item)
//! - Top-N combo mining with a bounded queue and shared floor
//! - Disjoint set packing (greedy, diversity injection, exact and parallel
//!   branch-and-bound, reconstruction)
//! - The adaptive pool-growth loop that proves optimality
//! - Cancellation, events and statistics

pub mod bound;
pub mod cancel;
pub mod engine;
pub mod event;
pub mod miner;
pub mod packing;
pub mod potential;
pub mod stats;

#[cfg(test)]
mod tests;

pub use bound::ComboBounder;
pub use cancel::CancellationToken;
pub use engine::{compute_disjoint_loadout, ComboEngine, LoadoutSolution};
pub use event::{
    ChannelEventListener, CountingEventListener, EngineEvent, EngineEventListener,
    EngineEventSupport, FnEventListener, LoggingEventListener,
};
pub use miner::{mine, mine_best_containing, mine_top_combos, MinedCombos};
pub use packing::{
    greedy_packing, inject_champions, pack_round, Packing, PackingOptions, PackingOutcome,
    PackingRound, PackingSolver,
};
pub use potential::{analyze_potentials, compute_potentials, PotentialAnalysis};
pub use stats::{EngineStats, PhaseStats};
