//! Per-item potential analysis.
//!
//! For every item, finds the best score of any legal combo of up to
//! `combo_size` items that contains it. The miner orders and prunes by these
//! values. Roots are independent and run in parallel.

use comboforge_core::{
    validate_pool, ComboForgeError, ComboState, Item, PoolStats, Result, MAX_COMBO_SIZE,
};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::bound::ComboBounder;
use crate::cancel::CancellationToken;

/// Potentials in pool order plus the number of search nodes visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotentialAnalysis {
    pub potentials: Vec<i64>,
    pub nodes_explored: u64,
}

/// Best score reachable by each item with combos of up to five items.
///
/// # Errors
///
/// Returns an error for an invalid pool, or [`ComboForgeError::Cancelled`] if
/// `cancel` fires before every root has been searched.
///
/// # Example
///
/// ```
/// use comboforge_core::{CatalogBuilder, ItemSpec};
/// use comboforge_solver::{compute_potentials, CancellationToken};
///
/// let items = CatalogBuilder::new()
///     .item(ItemSpec::new(0, 10).category(0))
///     .item(ItemSpec::new(1, 20).category(0))
///     .item(ItemSpec::new(2, 30).incompatible_with(0))
///     .build()
///     .unwrap();
///
/// let potentials = compute_potentials(&items, &CancellationToken::new()).unwrap();
/// // {0, 1} share a category: (10 + 20) × 2.
/// assert_eq!(potentials[0], 60);
/// // {1, 2}: no shared category.
/// assert_eq!(potentials[2], 50);
/// ```
pub fn compute_potentials(pool: &[Item], cancel: &CancellationToken) -> Result<Vec<i64>> {
    analyze_potentials(pool, MAX_COMBO_SIZE, cancel).map(|analysis| analysis.potentials)
}

/// Potential analysis with an explicit combo size.
///
/// # Errors
///
/// Same as [`compute_potentials`], plus an invalid `combo_size`.
pub fn analyze_potentials(
    pool: &[Item],
    combo_size: usize,
    cancel: &CancellationToken,
) -> Result<PotentialAnalysis> {
    validate_pool(pool, combo_size)?;
    let bounder = ComboBounder::new(&PoolStats::of(pool));

    let per_root: Option<Vec<(i64, u64)>> = pool
        .par_iter()
        .map(|root| {
            if cancel.is_cancelled() {
                return None;
            }
            let mut search = RootSearch::new(pool, root, combo_size, &bounder);
            search.dfs(ComboState::of(root), 0);
            trace!(
                event = "potential_root",
                item = root.index(),
                potential = search.best,
                nodes = search.nodes,
            );
            Some((search.best, search.nodes))
        })
        .collect();
    let per_root = per_root.ok_or(ComboForgeError::Cancelled)?;

    let nodes_explored = per_root.iter().map(|&(_, nodes)| nodes).sum();
    debug!(
        event = "potentials_done",
        items = pool.len(),
        nodes = nodes_explored,
    );
    Ok(PotentialAnalysis {
        potentials: per_root.into_iter().map(|(best, _)| best).collect(),
        nodes_explored,
    })
}

struct RootSearch<'a> {
    candidates: Vec<&'a Item>,
    bounder: &'a ComboBounder,
    combo_size: usize,
    best: i64,
    nodes: u64,
}

impl<'a> RootSearch<'a> {
    fn new(pool: &'a [Item], root: &Item, combo_size: usize, bounder: &'a ComboBounder) -> Self {
        let mut candidates: Vec<&Item> = pool
            .iter()
            .filter(|c| c.index() != root.index() && root.is_compatible_with(c))
            .collect();
        candidates.sort_by(|a, b| b.weight().cmp(&a.weight()));
        Self {
            candidates,
            bounder,
            combo_size,
            best: root.solo_score(),
            nodes: 0,
        }
    }

    fn dfs(&mut self, state: ComboState, start: usize) {
        self.nodes += 1;
        let score = state.score();
        if score > self.best {
            self.best = score;
        }
        if state.size() >= self.combo_size {
            return;
        }
        let remaining = self.combo_size - state.size();
        if self.bounder.bound(&state, remaining) <= self.best {
            return;
        }
        for i in start..self.candidates.len() {
            let candidate = self.candidates[i];
            if state.can_add(candidate) {
                self.dfs(state.with(candidate), i + 1);
            }
        }
    }
}
