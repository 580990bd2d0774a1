//! The engine loop: potentials, mining, packing and pool growth.
//!
//! [`ComboEngine`] owns an item pool and its configuration. A `solve` call
//! mines a candidate pool, packs it, and doubles the pool until the best
//! loadout reaches the proof threshold `T × L` (`T` is the score of the last
//! mined combo) or the universe runs out of combos.

use std::sync::Arc;

use comboforge_config::EngineConfig;
use comboforge_core::{
    validate_pool, with_potentials, Combo, ComboForgeError, Item, ItemMask, Result,
    MAX_COMBO_SIZE,
};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::event::{EngineEvent, EngineEventListener, EngineEventSupport};
use crate::miner::{mine, sort_descending};
use crate::packing::{pack_round, PackingOptions};
use crate::potential::analyze_potentials;
use crate::stats::{EngineStats, PhaseStats};

/// Result of a disjoint loadout search.
#[derive(Debug, Clone)]
pub struct LoadoutSolution {
    /// Selected combos, descending by score. Empty when no loadout of the
    /// requested size exists.
    pub combos: Vec<Combo>,
    pub total_score: i64,
    /// Set when the run stopped on the proof threshold or an exhausted
    /// universe, false when the pool cap stopped it first.
    ///
    /// With an exhausted universe the loadout is the true optimum. The
    /// threshold `T × L` only bounds loadouts made entirely of combos
    /// scoring at most the last mined one, so a stop on the threshold does
    /// not rule out a better loadout that mixes mined and unmined combos.
    pub proven_optimal: bool,
    /// Number of combos in the last mined pool.
    pub pool_size: usize,
    pub stats: EngineStats,
}

impl LoadoutSolution {
    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    /// Every item used by the loadout.
    pub fn item_mask(&self) -> ItemMask {
        self.combos
            .iter()
            .fold(ItemMask::empty(), |mask, combo| mask.union(&combo.item_mask()))
    }
}

/// Search engine over one item pool.
///
/// # Example
///
/// ```
/// use comboforge_config::EngineConfig;
/// use comboforge_core::{CatalogBuilder, ItemSpec};
/// use comboforge_solver::ComboEngine;
///
/// let items = CatalogBuilder::new()
///     .items((0..6).map(|i| ItemSpec::new(i, 10).category(i)))
///     .build()
///     .unwrap();
/// let config = EngineConfig::new().with_combo_size(2).with_loadout_size(3);
///
/// let mut engine = ComboEngine::with_config(items, config).unwrap();
/// let solution = engine.solve().unwrap();
///
/// assert_eq!(solution.len(), 3);
/// assert_eq!(solution.total_score, 60);
/// assert_eq!(solution.item_mask().count(), 6);
/// assert!(solution.proven_optimal);
/// ```
#[derive(Debug)]
pub struct ComboEngine {
    items: Vec<Item>,
    analyzed: bool,
    config: EngineConfig,
    cancel: CancellationToken,
    events: EngineEventSupport,
    thread_pool: Option<ThreadPool>,
}

impl ComboEngine {
    /// Creates an engine with the default configuration.
    ///
    /// # Errors
    ///
    /// Rejects an invalid pool.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        Self::with_config(items, EngineConfig::default())
    }

    /// Creates an engine with `config`.
    ///
    /// Items whose potential is at least their own weight are taken as
    /// already analyzed.
    ///
    /// # Errors
    ///
    /// Rejects an invalid pool and any configuration that
    /// [`EngineConfig::check`] rejects, including a `max_pool_size` below
    /// `initial_pool_size`.
    pub fn with_config(items: Vec<Item>, config: EngineConfig) -> Result<Self> {
        config.check()?;
        validate_pool(&items, config.combo_size)?;

        let analyzed = items.iter().all(|i| i.max_potential() >= i.solo_score());
        let thread_pool = config.thread_count.resolve().and_then(build_thread_pool);
        Ok(Self {
            items,
            analyzed,
            config,
            cancel: CancellationToken::new(),
            events: EngineEventSupport::new(),
            thread_pool,
        })
    }

    /// Replaces the engine's cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn EngineEventListener>) -> Self {
        self.add_listener(listener);
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn EngineEventListener>) {
        self.events.add_listener(listener);
    }

    /// Token that cancels searches run by this engine.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    /// Computes and attaches item potentials, once.
    ///
    /// Potentials are taken over combos of up to [`MAX_COMBO_SIZE`] items,
    /// whatever the configured combo size.
    ///
    /// # Errors
    ///
    /// Returns [`ComboForgeError::Cancelled`] if cancelled.
    pub fn analyze(&mut self) -> Result<&[Item]> {
        let mut stats = EngineStats::default();
        self.ensure_analyzed(&mut stats)?;
        Ok(&self.items)
    }

    /// The `n` best combos, overlapping freely.
    ///
    /// # Errors
    ///
    /// Rejects `n == 0`; returns [`ComboForgeError::Cancelled`] if cancelled.
    pub fn best_combos(&mut self, n: usize) -> Result<Vec<Combo>> {
        let mut stats = EngineStats::default();
        self.ensure_analyzed(&mut stats)?;
        let (items, k, cancel) = (&self.items, self.config.combo_size, &self.cancel);
        self.install(|| mine(items, n, k, cancel))
            .map(|mined| mined.combos)
    }

    /// Finds the best loadout of disjoint combos.
    ///
    /// An infeasible request yields an empty, proven solution.
    ///
    /// # Errors
    ///
    /// Returns [`ComboForgeError::Cancelled`] if cancelled; listeners then
    /// receive [`EngineEvent::Aborted`] with the best score reached.
    pub fn solve(&mut self) -> Result<LoadoutSolution> {
        let mut run = RunState::default();
        run.stats.start();
        self.events
            .fire(EngineEvent::EngineStarted, self.items.len() as i64);
        info!(
            event = "engine_start",
            items = self.items.len(),
            combo_size = self.config.combo_size,
            loadout_size = self.config.loadout_size,
            initial_pool_size = self.config.initial_pool_size,
            max_pool_size = ?self.config.max_pool_size,
        );

        match self.run(&mut run) {
            Ok(mut solution) => {
                solution.stats.finish();
                self.events
                    .fire(EngineEvent::Completed, solution.total_score);
                info!(
                    event = "engine_end",
                    score = solution.total_score,
                    combos = solution.combos.len(),
                    proven = solution.proven_optimal,
                    rounds = solution.stats.rounds,
                    pool_size = solution.pool_size,
                    nodes = solution.stats.nodes_explored(),
                    elapsed_ms = solution.stats.elapsed().as_millis() as u64,
                );
                Ok(solution)
            }
            Err(err) => {
                let best = run.best.as_ref().map_or(0, |b| b.score);
                if err == ComboForgeError::Cancelled {
                    self.events.fire(EngineEvent::Aborted, best);
                    info!(event = "engine_aborted", best, rounds = run.stats.rounds);
                }
                Err(err)
            }
        }
    }

    fn run(&mut self, run: &mut RunState) -> Result<LoadoutSolution> {
        self.ensure_analyzed(&mut run.stats)?;

        let k = self.config.combo_size;
        let loadout_size = self.config.loadout_size;
        let cap = self.config.max_pool_size;
        let mut pool_size = self.config.initial_pool_size;

        loop {
            self.cancel.check()?;
            let round = run.stats.rounds + 1;

            self.events
                .fire(EngineEvent::MiningPhaseStarted, pool_size as i64);
            let mut phase = PhaseStats::new("mining", round);
            let (items, cancel) = (&self.items, &self.cancel);
            let mined = self.install(|| mine(items, pool_size, k, cancel))?;
            phase.record_nodes(mined.nodes_explored);
            phase.finish();
            let mining_speed = phase.nodes_per_second();
            run.stats.record_phase(phase);

            let mined_count = mined.combos.len();
            let exhausted = mined_count < pool_size;
            let threshold = mined.combos.last().map_or(0, Combo::score);
            let proof_bound = threshold.saturating_mul(loadout_size as i64);
            run.stats.pool_size = mined_count;
            info!(
                event = "mining_phase",
                round,
                requested = pool_size,
                mined = mined_count,
                threshold,
                exhausted,
                speed = mining_speed,
            );

            self.events
                .fire(EngineEvent::PackingPhaseStarted, mined_count as i64);
            let mut phase = PhaseStats::new("packing", round);
            let options = PackingOptions {
                loadout_size,
                combo_size: k,
                parallel: self.config.parallel_packing,
                diversity_injection: self.config.diversity_injection,
                exhausted,
            };
            let packed = self.install(|| pack_round(mined.combos, items, options, cancel))?;
            phase.record_nodes(packed.nodes_explored);
            phase.finish();
            let packing_speed = phase.nodes_per_second();
            run.stats.record_phase(phase);
            run.stats.record_round();

            if let Some(combos) = packed.combos() {
                let score = combos.iter().map(Combo::score).fold(0i64, i64::saturating_add);
                if run.best.as_ref().map_or(true, |b| score > b.score) {
                    run.best = Some(BestLoadout { score, combos });
                    self.events.fire(EngineEvent::NewBestFound, score);
                }
            }
            self.events.fire(EngineEvent::SearchProgress, proof_bound);

            let best_score = run.best.as_ref().map(|b| b.score);
            info!(
                event = "packing_phase",
                round,
                candidates = packed.pool.len(),
                champions = packed.champions_added,
                greedy = packed.greedy_score.unwrap_or(-1),
                best = best_score.unwrap_or(-1),
                proof_bound,
                speed = packing_speed,
            );

            if exhausted || best_score.is_some_and(|score| score >= proof_bound) {
                return Ok(run.finish(true, mined_count));
            }
            if let Some(cap) = cap {
                if pool_size >= cap {
                    warn!(
                        event = "pool_cap_reached",
                        pool_size,
                        best = best_score.unwrap_or(-1),
                        proof_bound,
                    );
                    return Ok(run.finish(false, mined_count));
                }
            }

            let next = pool_size.saturating_mul(2);
            pool_size = cap.map_or(next, |cap| next.min(cap));
            self.events.fire(EngineEvent::PoolGrown, pool_size as i64);
            debug!(event = "pool_grown", round, pool_size);
        }
    }

    fn ensure_analyzed(&mut self, stats: &mut EngineStats) -> Result<()> {
        if self.analyzed {
            return Ok(());
        }
        // Sized for every combo size; analyzed items outlive this config.
        let mut phase = PhaseStats::new("potential", 0);
        let (items, cancel) = (&self.items, &self.cancel);
        let analysis = self.install(|| analyze_potentials(items, MAX_COMBO_SIZE, cancel))?;
        phase.record_nodes(analysis.nodes_explored);
        stats.record_phase(phase);

        self.items = with_potentials(&self.items, &analysis.potentials)?;
        self.analyzed = true;
        info!(
            event = "potential_phase",
            items = self.items.len(),
            nodes = analysis.nodes_explored,
        );
        Ok(())
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.thread_pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Best loadout of `combo_size` items per combo from `pool`.
///
/// Runs potential analysis first when the items carry none.
///
/// # Errors
///
/// Rejects an invalid pool, combo size or `loadout_size == 0`; returns
/// [`ComboForgeError::Cancelled`] if `cancel` fires.
///
/// # Example
///
/// ```
/// use comboforge_core::{CatalogBuilder, ItemSpec};
/// use comboforge_solver::{compute_disjoint_loadout, CancellationToken};
///
/// let items = CatalogBuilder::new()
///     .items((0..3).map(|i| ItemSpec::new(i, 10)))
///     .build()
///     .unwrap();
///
/// // Every pair shares an item with every other pair.
/// let solution = compute_disjoint_loadout(&items, 2, 2, &CancellationToken::new(), None).unwrap();
/// assert!(solution.is_empty());
/// ```
pub fn compute_disjoint_loadout(
    pool: &[Item],
    loadout_size: usize,
    combo_size: usize,
    cancel: &CancellationToken,
    listener: Option<Arc<dyn EngineEventListener>>,
) -> Result<LoadoutSolution> {
    let config = EngineConfig::default()
        .with_combo_size(combo_size)
        .with_loadout_size(loadout_size);
    let mut engine = ComboEngine::with_config(pool.to_vec(), config)?
        .with_cancellation(cancel.clone());
    if let Some(listener) = listener {
        engine.add_listener(listener);
    }
    engine.solve()
}

#[derive(Debug)]
struct BestLoadout {
    score: i64,
    combos: Vec<Combo>,
}

#[derive(Debug, Default)]
struct RunState {
    stats: EngineStats,
    best: Option<BestLoadout>,
}

impl RunState {
    fn finish(&mut self, proven_optimal: bool, pool_size: usize) -> LoadoutSolution {
        let (total_score, mut combos) = self
            .best
            .take()
            .map_or((0, Vec::new()), |b| (b.score, b.combos));
        sort_descending(&mut combos);
        LoadoutSolution {
            combos,
            total_score,
            proven_optimal,
            pool_size,
            stats: std::mem::take(&mut self.stats),
        }
    }
}

fn build_thread_pool(threads: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("comboforge-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(event = "thread_pool_fallback", threads, error = %err);
            None
        }
    }
}
