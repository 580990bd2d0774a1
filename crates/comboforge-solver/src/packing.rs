//! Disjoint set packing over a candidate pool.
//!
//! Picks exactly `L` pairwise item-disjoint combos maximizing the total
//! score. A round runs in this order:
//!
//! 1. Greedy: take combos in descending order while they stay disjoint.
//! 2. Diversity injection, only if greedy failed: add each item's best
//!    combo to the pool and retry greedy.
//! 3. Exact branch-and-bound seeded with the greedy score. The parallel
//!    variant proves the optimum score without tracking the path, then a
//!    sequential rerun with floor `optimum - 1` recovers the selection.
//!
//! Candidate pools must be sorted by descending score.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

use comboforge_core::{Combo, ComboForgeError, Item, ItemMask, PackedCombo, Result};
use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::miner::{mine_best_containing, sort_descending};

/// A selection of disjoint combos from a candidate pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packing {
    pub score: i64,
    /// Positions in the candidate pool, ascending.
    pub indices: Vec<usize>,
}

impl Packing {
    /// Clones the selected combos out of `pool`.
    pub fn combos(&self, pool: &[Combo]) -> Vec<Combo> {
        self.indices.iter().map(|&i| pool[i].clone()).collect()
    }
}

/// Takes combos in pool order while they stay disjoint.
///
/// Returns `None` if fewer than `loadout_size` disjoint combos are found.
///
/// # Example
///
/// ```
/// use comboforge_core::{CatalogBuilder, Combo, ItemSpec};
/// use comboforge_solver::packing::greedy_packing;
///
/// let items = CatalogBuilder::new()
///     .items((0..4).map(|i| ItemSpec::new(i, 10)))
///     .build()
///     .unwrap();
/// let pool = vec![
///     Combo::new([items[0], items[1]]),
///     Combo::new([items[1], items[2]]),
///     Combo::new([items[2], items[3]]),
/// ];
///
/// let packing = greedy_packing(&pool, 2).unwrap();
/// assert_eq!(packing.indices, vec![0, 2]);
/// assert_eq!(packing.score, 40);
/// assert!(greedy_packing(&pool, 3).is_none());
/// ```
pub fn greedy_packing(pool: &[Combo], loadout_size: usize) -> Option<Packing> {
    let mut used = ItemMask::empty();
    let mut packing = Packing {
        score: 0,
        indices: Vec::with_capacity(loadout_size),
    };
    for (i, combo) in pool.iter().enumerate() {
        if packing.indices.len() == loadout_size {
            break;
        }
        let mask = combo.item_mask();
        if used.intersects(&mask) {
            continue;
        }
        used.union_with(&mask);
        packing.indices.push(i);
        packing.score = packing.score.saturating_add(combo.score());
    }
    (packing.indices.len() == loadout_size).then_some(packing)
}

/// Adds every item's best combo of `combo_size` items to `pool`.
///
/// Combos already in the pool are skipped and the pool is re-sorted.
/// Returns the number of combos added.
///
/// # Errors
///
/// Returns [`ComboForgeError::Cancelled`] if `cancel` fires, or a pool
/// validation error.
pub fn inject_champions(
    pool: &mut Vec<Combo>,
    items: &[Item],
    combo_size: usize,
    cancel: &CancellationToken,
) -> Result<usize> {
    let champions: Vec<Option<Combo>> = items
        .par_iter()
        .map(|item| {
            cancel.check()?;
            mine_best_containing(items, item, combo_size)
        })
        .collect::<Result<_>>()?;

    let mut seen: HashSet<ItemMask> = pool.iter().map(Combo::item_mask).collect();
    let before = pool.len();
    for champion in champions.into_iter().flatten() {
        if seen.insert(champion.item_mask()) {
            pool.push(champion);
        }
    }
    sort_descending(pool);
    Ok(pool.len() - before)
}

/// Exact packing result plus the number of search nodes visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackingOutcome {
    /// Best selection scoring strictly above the floor, if any.
    pub packing: Option<Packing>,
    pub nodes_explored: u64,
}

/// Exact branch-and-bound over a sorted candidate pool.
#[derive(Debug)]
pub struct PackingSolver<'a> {
    packed: Vec<PackedCombo>,
    /// `prefix[i]` is the sum of the first `i` scores.
    prefix: Vec<i128>,
    loadout_size: usize,
    cancel: &'a CancellationToken,
}

impl<'a> PackingSolver<'a> {
    /// Prepares a search for `loadout_size` combos out of `pool`.
    ///
    /// # Errors
    ///
    /// Rejects `loadout_size == 0`.
    pub fn new(
        pool: &[Combo],
        loadout_size: usize,
        cancel: &'a CancellationToken,
    ) -> Result<Self> {
        if loadout_size == 0 {
            return Err(ComboForgeError::InvalidCount("loadout size"));
        }
        let packed = PackedCombo::pack_all(pool);
        let mut prefix = Vec::with_capacity(packed.len() + 1);
        prefix.push(0i128);
        for combo in &packed {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + combo.score as i128);
        }
        Ok(Self {
            packed,
            prefix,
            loadout_size,
            cancel,
        })
    }

    /// Best selection scoring strictly above `floor`.
    ///
    /// With `parallel` set, the optimum score is proven by the parallel
    /// score search and the selection is rebuilt sequentially.
    ///
    /// # Errors
    ///
    /// Returns [`ComboForgeError::Cancelled`] if `cancel` fires.
    pub fn solve(&self, floor: i64, parallel: bool) -> Result<PackingOutcome> {
        if !parallel {
            return self.solve_sequential(floor);
        }
        let (best, nodes) = self.best_score_parallel(floor)?;
        if best <= floor {
            return Ok(PackingOutcome {
                packing: None,
                nodes_explored: nodes,
            });
        }
        let mut outcome = self.solve_sequential(best - 1)?;
        debug!(
            event = "packing_reconstructed",
            score = best,
            found = outcome.packing.is_some(),
        );
        outcome.nodes_explored += nodes;
        Ok(outcome)
    }

    /// Sequential search recording the best selection above `floor`.
    ///
    /// # Errors
    ///
    /// Returns [`ComboForgeError::Cancelled`] if `cancel` fires.
    pub fn solve_sequential(&self, floor: i64) -> Result<PackingOutcome> {
        let mut search = SequentialSearch {
            solver: self,
            best: floor,
            path: Vec::with_capacity(self.loadout_size),
            best_path: None,
            nodes: 0,
            cancelled: false,
        };
        search.dfs(0, self.loadout_size, ItemMask::empty(), 0, 0);
        if search.cancelled {
            return Err(ComboForgeError::Cancelled);
        }
        let packing = search.best_path.map(|indices| Packing {
            score: search.best,
            indices,
        });
        Ok(PackingOutcome {
            packing,
            nodes_explored: search.nodes,
        })
    }

    /// Best total score above `floor`, or `floor` if none beats it.
    ///
    /// Worker `w` owns first-level candidates `w, w + P, w + 2P, …`.
    ///
    /// # Errors
    ///
    /// Returns [`ComboForgeError::Cancelled`] if `cancel` fires.
    pub fn best_score_parallel(&self, floor: i64) -> Result<(i64, u64)> {
        let shared = SharedBest::new(floor);
        let workers = rayon::current_num_threads().max(1);

        let per_worker: Vec<(u64, bool)> = (0..workers)
            .into_par_iter()
            .map(|worker| {
                let mut search = ScoreSearch {
                    solver: self,
                    shared: &shared,
                    nodes: 0,
                    cancelled: false,
                };
                search.first_level(worker, workers);
                (search.nodes, search.cancelled)
            })
            .collect();

        if per_worker.iter().any(|&(_, cancelled)| cancelled) {
            return Err(ComboForgeError::Cancelled);
        }
        let nodes = per_worker.iter().map(|&(nodes, _)| nodes).sum();
        Ok((shared.get(), nodes))
    }

    /// Returns true if candidates from `i` on cannot lift `current` above
    /// `best` with `remaining` more picks.
    #[inline]
    fn exhausted_from(&self, i: usize, remaining: usize, current: i64, best: i64) -> bool {
        if self.packed.len() - i < remaining {
            return true;
        }
        let window = self.prefix[i + remaining] - self.prefix[i];
        if current as i128 + window <= best as i128 {
            return true;
        }
        let head = self.packed[i].score as i128 * remaining as i128;
        current as i128 + head <= best as i128
    }
}

/// Best score shared by the parallel workers.
///
/// Reads are relaxed loads used only for pruning; writes are serialized and
/// happen only on strict improvement.
struct SharedBest {
    value: AtomicI64,
    lock: Mutex<()>,
}

impl SharedBest {
    fn new(floor: i64) -> Self {
        Self {
            value: AtomicI64::new(floor),
            lock: Mutex::new(()),
        }
    }

    #[inline]
    fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn offer(&self, score: i64) {
        if score <= self.get() {
            return;
        }
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if score > self.value.load(Ordering::Relaxed) {
            self.value.store(score, Ordering::Relaxed);
        }
    }
}

struct SequentialSearch<'s, 'a> {
    solver: &'s PackingSolver<'a>,
    best: i64,
    path: Vec<usize>,
    best_path: Option<Vec<usize>>,
    nodes: u64,
    cancelled: bool,
}

impl SequentialSearch<'_, '_> {
    fn dfs(&mut self, start: usize, remaining: usize, used: ItemMask, current: i64, depth: usize) {
        self.nodes += 1;
        if remaining == 0 {
            if current > self.best {
                self.best = current;
                self.best_path = Some(self.path.clone());
            }
            return;
        }
        let solver = self.solver;
        let packed = &solver.packed;
        for i in start..packed.len() {
            if depth <= 1 && solver.cancel.is_cancelled() {
                self.cancelled = true;
                return;
            }
            if solver.exhausted_from(i, remaining, current, self.best) {
                break;
            }
            let candidate = &packed[i];
            if used.intersects(&candidate.used_items) {
                continue;
            }
            self.path.push(candidate.original_index);
            self.dfs(
                i + 1,
                remaining - 1,
                used.union(&candidate.used_items),
                current.saturating_add(candidate.score),
                depth + 1,
            );
            self.path.pop();
            if self.cancelled {
                return;
            }
        }
    }
}

struct ScoreSearch<'s, 'a> {
    solver: &'s PackingSolver<'a>,
    shared: &'s SharedBest,
    nodes: u64,
    cancelled: bool,
}

impl ScoreSearch<'_, '_> {
    fn first_level(&mut self, worker: usize, workers: usize) {
        let solver = self.solver;
        let remaining = solver.loadout_size;
        let packed = &solver.packed;
        for i in (worker..packed.len()).step_by(workers) {
            if solver.cancel.is_cancelled() {
                self.cancelled = true;
                return;
            }
            if solver.exhausted_from(i, remaining, 0, self.shared.get()) {
                break;
            }
            let candidate = &packed[i];
            self.nodes += 1;
            self.dfs(
                i + 1,
                remaining - 1,
                candidate.used_items,
                candidate.score,
                1,
            );
            if self.cancelled {
                return;
            }
        }
    }

    fn dfs(&mut self, start: usize, remaining: usize, used: ItemMask, current: i64, depth: usize) {
        self.nodes += 1;
        if remaining == 0 {
            self.shared.offer(current);
            return;
        }
        let solver = self.solver;
        let packed = &solver.packed;
        for i in start..packed.len() {
            if depth <= 1 && solver.cancel.is_cancelled() {
                self.cancelled = true;
                return;
            }
            if solver.exhausted_from(i, remaining, current, self.shared.get()) {
                break;
            }
            let candidate = &packed[i];
            if used.intersects(&candidate.used_items) {
                continue;
            }
            self.dfs(
                i + 1,
                remaining - 1,
                used.union(&candidate.used_items),
                current.saturating_add(candidate.score),
                depth + 1,
            );
            if self.cancelled {
                return;
            }
        }
    }
}

/// Settings for one packing round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingOptions {
    pub loadout_size: usize,
    pub combo_size: usize,
    pub parallel: bool,
    pub diversity_injection: bool,
    /// The candidate pool holds every legal combo of the universe.
    pub exhausted: bool,
}

/// Result of one packing round.
#[derive(Debug, Clone)]
pub struct PackingRound {
    /// Candidate pool the selection indexes into, including injected
    /// champions.
    pub pool: Vec<Combo>,
    pub packing: Option<Packing>,
    pub greedy_score: Option<i64>,
    pub champions_added: usize,
    pub nodes_explored: u64,
}

impl PackingRound {
    /// The selected combos, if a selection was found.
    pub fn combos(&self) -> Option<Vec<Combo>> {
        self.packing.as_ref().map(|p| p.combos(&self.pool))
    }
}

/// Runs greedy, diversity injection and exact search on one candidate pool.
///
/// When greedy fails on a pool that is not exhausted, the round ends
/// without a selection. When greedy fails on an exhausted pool, the exact
/// search decides feasibility.
///
/// # Errors
///
/// Rejects `options.loadout_size == 0`; returns
/// [`ComboForgeError::Cancelled`] if `cancel` fires.
pub fn pack_round(
    candidates: Vec<Combo>,
    items: &[Item],
    options: PackingOptions,
    cancel: &CancellationToken,
) -> Result<PackingRound> {
    if options.loadout_size == 0 {
        return Err(ComboForgeError::InvalidCount("loadout size"));
    }
    let mut pool = candidates;
    let mut greedy = greedy_packing(&pool, options.loadout_size);
    let mut champions_added = 0;

    if greedy.is_none() && options.diversity_injection && !options.exhausted {
        champions_added = inject_champions(&mut pool, items, options.combo_size, cancel)?;
        greedy = greedy_packing(&pool, options.loadout_size);
        debug!(
            event = "diversity_injected",
            added = champions_added,
            pool = pool.len(),
            feasible = greedy.is_some(),
        );
    }

    let greedy_score = greedy.as_ref().map(|g| g.score);
    let floor = match greedy_score {
        Some(score) => score,
        None if options.exhausted => -1,
        None => {
            return Ok(PackingRound {
                pool,
                packing: None,
                greedy_score,
                champions_added,
                nodes_explored: 0,
            })
        }
    };

    cancel.check()?;
    let solver = PackingSolver::new(&pool, options.loadout_size, cancel)?;
    let outcome = solver.solve(floor, options.parallel)?;
    debug!(
        event = "packing_done",
        candidates = pool.len(),
        greedy = greedy_score.unwrap_or(-1),
        improved = outcome.packing.is_some(),
        nodes = outcome.nodes_explored,
    );

    Ok(PackingRound {
        packing: outcome.packing.or(greedy),
        pool,
        greedy_score,
        champions_added,
        nodes_explored: outcome.nodes_explored,
    })
}

#[cfg(test)]
#[path = "packing_tests.rs"]
mod tests;
