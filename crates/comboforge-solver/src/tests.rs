//! End-to-end tests for the engine loop.

use std::sync::Arc;

use comboforge_config::{EngineConfig, ThreadCount};
use comboforge_core::{CatalogBuilder, ComboForgeError, Item, ItemSpec};
use comboforge_test::{
    all_combos, best_packing, disjoint_category_universe, incompatible_pair_universe,
    random_universe, six_item_universe, top_scores, RandomUniverse,
};

use crate::{
    compute_disjoint_loadout, compute_potentials, CancellationToken, ChannelEventListener,
    ComboEngine, CountingEventListener, EngineEvent,
};

fn config(combo_size: usize, loadout_size: usize) -> EngineConfig {
    EngineConfig::new()
        .with_combo_size(combo_size)
        .with_loadout_size(loadout_size)
}

fn weighted(weights: &[u32]) -> Vec<Item> {
    CatalogBuilder::new()
        .items(
            weights
                .iter()
                .enumerate()
                .map(|(i, &w)| ItemSpec::new(i, w)),
        )
        .build()
        .unwrap()
}

#[test]
fn test_six_items_three_pairs() {
    let mut engine = ComboEngine::with_config(six_item_universe(), config(2, 3)).unwrap();
    let solution = engine.solve().unwrap();

    // Every perfect matching doubles the total weight of 130.
    assert_eq!(solution.total_score, 260);
    assert_eq!(solution.len(), 3);
    assert_eq!(solution.item_mask().count(), 6);
    assert!(solution.proven_optimal);
    assert!(solution
        .combos
        .windows(2)
        .all(|w| w[0].score() >= w[1].score()));
}

#[test]
fn test_disjoint_categories_use_every_item() {
    let solution = compute_disjoint_loadout(
        &disjoint_category_universe(6),
        3,
        2,
        &CancellationToken::new(),
        None,
    )
    .unwrap();

    assert_eq!(solution.len(), 3);
    assert_eq!(solution.item_mask().count(), 6);
    for combo in &solution.combos {
        assert_eq!(combo.len(), 2);
    }
}

#[test]
fn test_incompatible_items_stay_apart() {
    let solution = compute_disjoint_loadout(
        &incompatible_pair_universe(),
        2,
        2,
        &CancellationToken::new(),
        None,
    )
    .unwrap();

    assert_eq!(solution.len(), 2);
    for combo in &solution.combos {
        assert!(!(combo.contains(0) && combo.contains(1)));
        assert!(combo.is_legal());
    }
    // {0, 2} + {1, 3} or {0, 3} + {1, 2}.
    assert_eq!(solution.total_score, 900 + 840);
}

#[test]
fn test_infeasible_request_is_empty() {
    let counter = Arc::new(CountingEventListener::new());
    let solution = compute_disjoint_loadout(
        &weighted(&[10, 20, 30]),
        2,
        2,
        &CancellationToken::new(),
        Some(counter.clone()),
    )
    .unwrap();

    assert!(solution.is_empty());
    assert_eq!(solution.total_score, 0);
    assert!(solution.proven_optimal);
    assert_eq!(counter.count(EngineEvent::Completed), 1);
    assert_eq!(counter.count(EngineEvent::NewBestFound), 0);
}

#[test]
fn test_matches_brute_force_on_exhausted_pool() {
    for seed in 0..4 {
        let shape = RandomUniverse::new(seed, 10)
            .with_categories(3, 2)
            .with_exclusion_probability(0.2);
        let items = random_universe(shape);
        let pool = all_combos(&items, 2);

        for loadout in [2, 3] {
            let mut engine = ComboEngine::with_config(items.clone(), config(2, loadout)).unwrap();
            let solution = engine.solve().unwrap();

            let expected = best_packing(&pool, loadout);
            assert_eq!(
                (!solution.is_empty()).then_some(solution.total_score),
                expected,
                "seed {seed}, loadout {loadout}"
            );
            assert!(solution.proven_optimal);
            assert_eq!(solution.stats.rounds, 1);
        }
    }
}

#[test]
fn test_pool_grows_until_proven() {
    let items = random_universe(
        RandomUniverse::new(5, 14)
            .with_categories(4, 2)
            .with_exclusion_probability(0.0),
    );
    let counter = Arc::new(CountingEventListener::new());
    let mut engine = ComboEngine::with_config(
        items.clone(),
        config(2, 3)
            .with_initial_pool_size(2)
            .with_diversity_injection(false),
    )
    .unwrap()
    .with_listener(counter.clone());

    let solution = engine.solve().unwrap();

    assert!(solution.proven_optimal);
    assert_eq!(solution.len(), 3);
    assert_eq!(solution.item_mask().count(), 6);
    assert!(solution.stats.rounds >= 2);
    assert_eq!(
        counter.count(EngineEvent::PoolGrown),
        solution.stats.rounds as usize - 1
    );
    // A threshold stop bounds only loadouts built from unmined combos.
    let optimum = best_packing(&all_combos(&items, 2), 3).unwrap();
    assert!(solution.total_score <= optimum);
}

#[test]
fn test_pool_cap_returns_unproven() {
    // {0, 1} tops the pool and every runner-up overlaps it.
    let items = weighted(&[100, 100, 1, 1]);
    let counter = Arc::new(CountingEventListener::new());
    let mut engine = ComboEngine::with_config(
        items,
        config(2, 2)
            .with_initial_pool_size(1)
            .with_max_pool_size(2)
            .with_diversity_injection(false),
    )
    .unwrap()
    .with_listener(counter.clone());

    let solution = engine.solve().unwrap();

    assert!(!solution.proven_optimal);
    assert!(solution.is_empty());
    assert_eq!(solution.stats.rounds, 2);
    assert_eq!(solution.pool_size, 2);
    assert_eq!(counter.count(EngineEvent::PoolGrown), 1);
}

#[test]
fn test_cancelled_run_reports_abort() {
    let counter = Arc::new(CountingEventListener::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = compute_disjoint_loadout(
        &six_item_universe(),
        2,
        2,
        &cancel,
        Some(counter.clone()),
    );

    assert_eq!(result.unwrap_err(), ComboForgeError::Cancelled);
    assert_eq!(counter.count(EngineEvent::EngineStarted), 1);
    assert_eq!(counter.count(EngineEvent::Aborted), 1);
    assert_eq!(counter.count(EngineEvent::Completed), 0);
}

#[test]
fn test_event_sequence() {
    let (listener, mut receiver) = ChannelEventListener::channel();
    let mut engine = ComboEngine::with_config(six_item_universe(), config(2, 3))
        .unwrap()
        .with_listener(Arc::new(listener));
    let solution = engine.solve().unwrap();

    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }

    assert_eq!(events.first(), Some(&(EngineEvent::EngineStarted, 6)));
    assert_eq!(
        events.last(),
        Some(&(EngineEvent::Completed, solution.total_score))
    );
    assert!(events.contains(&(EngineEvent::MiningPhaseStarted, 2000)));
    assert!(events.contains(&(EngineEvent::PackingPhaseStarted, 15)));
    assert!(events.contains(&(EngineEvent::NewBestFound, 260)));
}

#[test]
fn test_invalid_requests() {
    let cancel = CancellationToken::new();
    let items = six_item_universe();

    assert_eq!(
        compute_disjoint_loadout(&items, 0, 2, &cancel, None).unwrap_err(),
        ComboForgeError::InvalidCount("loadout size")
    );
    assert_eq!(
        compute_disjoint_loadout(&items, 2, 6, &cancel, None).unwrap_err(),
        ComboForgeError::InvalidComboSize(6)
    );
    assert_eq!(
        compute_disjoint_loadout(&[], 2, 2, &cancel, None).unwrap_err(),
        ComboForgeError::EmptyPool
    );
    assert_eq!(
        ComboEngine::with_config(items.clone(), EngineConfig::new().with_initial_pool_size(0))
            .unwrap_err(),
        ComboForgeError::InvalidCount("initial pool size")
    );
    let capped = EngineConfig::new()
        .with_initial_pool_size(10)
        .with_max_pool_size(5);
    assert!(capped.validate().is_err());
    assert_eq!(
        ComboEngine::with_config(items, capped).unwrap_err(),
        ComboForgeError::PoolCapBelowInitial {
            max: 5,
            initial: 10
        }
    );
}

#[test]
fn test_analyze_attaches_potentials() {
    let items = six_item_universe();
    let mut engine = ComboEngine::new(items.clone()).unwrap();
    assert!(!engine.is_analyzed());

    let analyzed = engine.analyze().unwrap().to_vec();
    let expected = compute_potentials(&items, &CancellationToken::new()).unwrap();

    assert!(engine.is_analyzed());
    let found: Vec<i64> = analyzed.iter().map(Item::max_potential).collect();
    assert_eq!(found, expected);
}

#[test]
fn test_analyzed_items_serve_larger_combo_sizes() {
    let raw = random_universe(
        RandomUniverse::new(7, 12)
            .with_categories(3, 2)
            .with_exclusion_probability(0.1),
    );
    let analyzed = ComboEngine::with_config(raw.clone(), config(2, 1))
        .unwrap()
        .analyze()
        .unwrap()
        .to_vec();

    let mut engine = ComboEngine::with_config(analyzed, config(4, 1)).unwrap();
    assert!(engine.is_analyzed());
    let found: Vec<i64> = engine
        .best_combos(5)
        .unwrap()
        .iter()
        .map(|c| c.score())
        .collect();
    assert_eq!(found, top_scores(&raw, 5, 4));
}

#[test]
fn test_best_combos_overlap() {
    let mut engine = ComboEngine::with_config(six_item_universe(), config(2, 3)).unwrap();
    let top = engine.best_combos(3).unwrap();

    assert_eq!(top.len(), 3);
    assert_eq!(top[0].indices().collect::<Vec<_>>(), vec![2, 5]);
    // Runner-ups reuse a 45.
    assert!(top[1].contains(2) || top[1].contains(5));
}

#[test]
fn test_single_thread_matches_default() {
    let items = random_universe(RandomUniverse::new(9, 16).with_exclusion_probability(0.15));

    let mut parallel = ComboEngine::with_config(items.clone(), config(3, 3)).unwrap();
    let mut single = ComboEngine::with_config(
        items,
        config(3, 3)
            .with_thread_count(ThreadCount::None)
            .with_parallel_packing(false),
    )
    .unwrap();

    let a = parallel.solve().unwrap();
    let b = single.solve().unwrap();
    assert_eq!(a.total_score, b.total_score);
    assert_eq!(a.len(), b.len());
}

#[test]
fn test_stats_cover_every_phase() {
    let mut engine = ComboEngine::with_config(six_item_universe(), config(2, 3)).unwrap();
    let solution = engine.solve().unwrap();

    let kinds: Vec<&str> = solution.stats.phases.iter().map(|p| p.phase_type).collect();
    assert_eq!(kinds, vec!["potential", "mining", "packing"]);
    assert!(solution.stats.nodes_for("mining") > 0);
    assert_eq!(solution.pool_size, 15);
}
