//! Top-N combination mining.
//!
//! Finds the N highest-scoring legal combos of exactly K items by ordered
//! branch-and-bound. Items are visited in descending potential order and
//! each combo is reached only from its highest-potential member, so a root
//! whose potential cannot beat the current N-th best ends the useful part of
//! the outer loop.
//!
//! Roots run in parallel. Each worker keeps a private bounded queue and,
//! once that queue is full, publishes its minimum to a shared monotone floor.
//! The worker that published a floor holds N combos at or above it, so any
//! search pruned against the floor could only have produced ties.

use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicI64, Ordering};

use comboforge_core::{
    validate_pool, Combo, ComboForgeError, ComboItems, ComboState, Item, PoolStats, Result,
};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::bound::ComboBounder;
use crate::cancel::CancellationToken;

/// Mined combos plus the number of search nodes visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedCombos {
    /// Best combos, descending by score.
    pub combos: Vec<Combo>,
    pub nodes_explored: u64,
}

/// The `n` best combos of exactly `k` items, descending by score.
///
/// Items must carry analyzed potentials (see
/// [`compute_potentials`](crate::compute_potentials)). Fewer than `n` combos
/// are returned only when the pool holds fewer legal combos.
///
/// # Errors
///
/// Rejects an invalid pool or combo size, `n == 0`, and items whose
/// potential is below their own weight. Returns
/// [`ComboForgeError::Cancelled`] if `cancel` fires during the search.
///
/// # Example
///
/// ```
/// use comboforge_core::{with_potentials, CatalogBuilder, ItemSpec};
/// use comboforge_solver::{compute_potentials, mine_top_combos, CancellationToken};
///
/// let items = CatalogBuilder::new()
///     .items([5, 15, 45, 5, 15, 45].into_iter().enumerate()
///         .map(|(i, w)| ItemSpec::new(i, w).category(0)))
///     .build()
///     .unwrap();
/// let cancel = CancellationToken::new();
/// let potentials = compute_potentials(&items, &cancel).unwrap();
/// let items = with_potentials(&items, &potentials).unwrap();
///
/// let top = mine_top_combos(&items, 3, 2, &cancel).unwrap();
/// assert_eq!(top[0].indices().collect::<Vec<_>>(), vec![2, 5]);
/// assert_eq!(top[0].score(), 180);
/// ```
pub fn mine_top_combos(
    pool: &[Item],
    n: usize,
    k: usize,
    cancel: &CancellationToken,
) -> Result<Vec<Combo>> {
    mine(pool, n, k, cancel).map(|mined| mined.combos)
}

/// [`mine_top_combos`] that also reports search effort.
///
/// # Errors
///
/// Same as [`mine_top_combos`].
pub fn mine(pool: &[Item], n: usize, k: usize, cancel: &CancellationToken) -> Result<MinedCombos> {
    validate_pool(pool, k)?;
    if n == 0 {
        return Err(ComboForgeError::InvalidCount("combo count"));
    }
    if let Some(item) = pool.iter().find(|i| i.max_potential() < i.solo_score()) {
        return Err(ComboForgeError::MissingPotential(item.index()));
    }

    let mut order: Vec<&Item> = pool.iter().collect();
    order.sort_by(|a, b| b.max_potential().cmp(&a.max_potential()));

    let bounder = ComboBounder::new(&PoolStats::of(pool));
    let floor = AtomicI64::new(i64::MIN);

    let workers: Vec<MinerWorker> = (0..order.len())
        .into_par_iter()
        .fold(
            || MinerWorker::new(n),
            |mut worker, root| {
                if !cancel.is_cancelled() {
                    worker.search_root(&order, root, k, &bounder, &floor);
                }
                worker
            },
        )
        .collect();
    cancel.check()?;

    let nodes_explored = workers.iter().map(|w| w.nodes).sum();
    let mut combos: Vec<Combo> = workers
        .into_iter()
        .flat_map(|w| w.queue.into_combos())
        .collect();
    sort_descending(&mut combos);
    combos.truncate(n);

    debug!(
        event = "mining_done",
        requested = n,
        mined = combos.len(),
        nodes = nodes_explored,
        threshold = combos.last().map_or(0, Combo::score),
    );
    Ok(MinedCombos {
        combos,
        nodes_explored,
    })
}

/// Best combo of exactly `k` items containing `item`, if one exists.
///
/// Potentials are not required.
///
/// # Errors
///
/// Rejects an invalid pool or combo size.
pub fn mine_best_containing(pool: &[Item], item: &Item, k: usize) -> Result<Option<Combo>> {
    validate_pool(pool, k)?;
    let mut candidates: Vec<&Item> = pool
        .iter()
        .filter(|c| c.index() != item.index() && item.is_compatible_with(c))
        .collect();
    candidates.sort_by(|a, b| b.weight().cmp(&a.weight()));

    let bounder = ComboBounder::new(&PoolStats::of(pool));
    let mut search = ChampionSearch {
        candidates,
        bounder: &bounder,
        k,
        path: ComboItems::new(),
        best: None,
    };
    search.path.push(*item);
    search.dfs(ComboState::of(item), 0);
    Ok(search.best.map(|(_, items)| Combo::new(items)))
}

/// Sorts combos by descending score, breaking ties by member indices.
pub(crate) fn sort_descending(combos: &mut [Combo]) {
    combos.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| a.indices().cmp(b.indices()))
    });
}

struct Ranked(Combo);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.0.score() == other.0.score()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0.score().cmp(&other.0.score())
    }
}

/// Bounded min-queue holding the best combos seen by one worker.
struct TopCombos {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl TopCombos {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1 << 16) + 1),
        }
    }

    fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Score a new combo must exceed, once full.
    fn min(&self) -> Option<i64> {
        if self.is_full() {
            self.heap.peek().map(|Reverse(r)| r.0.score())
        } else {
            None
        }
    }

    fn accepts(&self, score: i64) -> bool {
        self.min().map_or(true, |min| score > min)
    }

    fn insert(&mut self, combo: Combo) {
        if self.is_full() {
            self.heap.pop();
        }
        self.heap.push(Reverse(Ranked(combo)));
    }

    fn into_combos(self) -> impl Iterator<Item = Combo> {
        self.heap.into_iter().map(|Reverse(r)| r.0)
    }
}

struct MinerWorker {
    queue: TopCombos,
    nodes: u64,
}

impl MinerWorker {
    fn new(capacity: usize) -> Self {
        Self {
            queue: TopCombos::new(capacity),
            nodes: 0,
        }
    }

    fn search_root(
        &mut self,
        order: &[&Item],
        root: usize,
        k: usize,
        bounder: &ComboBounder,
        floor: &AtomicI64,
    ) {
        let item = order[root];
        if let Some(threshold) = threshold(&self.queue, floor) {
            if item.max_potential() <= threshold {
                return;
            }
        }
        let candidates: Vec<&Item> = order[root + 1..]
            .iter()
            .copied()
            .filter(|c| item.is_compatible_with(c))
            .collect();

        let before = self.nodes;
        let mut search = RootSearch {
            candidates: &candidates,
            bounder,
            floor,
            k,
            queue: &mut self.queue,
            path: ComboItems::new(),
            nodes: 0,
        };
        search.path.push(*item);
        search.dfs(ComboState::of(item), 0);
        self.nodes += search.nodes;
        trace!(
            event = "mining_root",
            item = item.index(),
            nodes = self.nodes - before,
        );
    }
}

/// Pruning threshold from the local queue and the shared floor.
fn threshold(queue: &TopCombos, floor: &AtomicI64) -> Option<i64> {
    let shared = floor.load(Ordering::Relaxed);
    let shared = (shared != i64::MIN).then_some(shared);
    match (queue.min(), shared) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

struct RootSearch<'a> {
    candidates: &'a [&'a Item],
    bounder: &'a ComboBounder,
    floor: &'a AtomicI64,
    k: usize,
    queue: &'a mut TopCombos,
    path: ComboItems,
    nodes: u64,
}

impl RootSearch<'_> {
    fn dfs(&mut self, state: ComboState, start: usize) {
        self.nodes += 1;
        if state.size() == self.k {
            let score = state.score();
            let above_floor = score > self.floor.load(Ordering::Relaxed);
            if above_floor && self.queue.accepts(score) {
                self.queue.insert(Combo::new(self.path.iter().copied()));
                if let Some(min) = self.queue.min() {
                    self.floor.fetch_max(min, Ordering::Relaxed);
                }
            }
            return;
        }

        let remaining = self.k - state.size();
        if let Some(t) = threshold(self.queue, self.floor) {
            if self.bounder.bound(&state, remaining) <= t {
                return;
            }
        }

        for i in start..self.candidates.len() {
            let candidate = self.candidates[i];
            if let Some(t) = threshold(self.queue, self.floor) {
                if candidate.max_potential() <= t {
                    break;
                }
            }
            if state.can_add(candidate) {
                self.path.push(*candidate);
                self.dfs(state.with(candidate), i + 1);
                self.path.pop();
            }
        }
    }
}

struct ChampionSearch<'a> {
    candidates: Vec<&'a Item>,
    bounder: &'a ComboBounder,
    k: usize,
    path: ComboItems,
    best: Option<(i64, ComboItems)>,
}

impl ChampionSearch<'_> {
    fn dfs(&mut self, state: ComboState, start: usize) {
        if state.size() == self.k {
            let score = state.score();
            if self.best.as_ref().map_or(true, |(best, _)| score > *best) {
                self.best = Some((score, self.path.clone()));
            }
            return;
        }

        let remaining = self.k - state.size();
        if let Some((best, _)) = &self.best {
            if self.bounder.bound(&state, remaining) <= *best {
                return;
            }
        }

        for i in start..self.candidates.len() {
            let candidate = self.candidates[i];
            if state.can_add(candidate) {
                self.path.push(*candidate);
                self.dfs(state.with(candidate), i + 1);
                self.path.pop();
            }
        }
    }
}

#[cfg(test)]
#[path = "miner_tests.rs"]
mod tests;
