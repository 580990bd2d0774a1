//! Shared test fixtures for ComboForge crates.
//!
//! - [`fixtures`] - small hand-built universes and seeded random universes
//! - [`oracle`] - brute-force reference answers for cross-checking the solver
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! comboforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use comboforge_test::fixtures::{random_universe, RandomUniverse};
//! use comboforge_test::oracle::{best_packing, top_scores};
//! ```

pub mod fixtures;
pub mod oracle;

pub use fixtures::{
    disjoint_category_universe, incompatible_pair_universe, random_universe,
    six_item_universe, RandomUniverse,
};
pub use oracle::{all_combos, best_packing, potentials, top_scores};
