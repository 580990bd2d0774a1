use std::sync::Arc;

use comboforge_test::{disjoint_category_universe, six_item_universe};

use super::*;

#[test]
fn test_run_engine_with_config() {
    let config = EngineConfig::new()
        .with_combo_size(2)
        .with_loadout_size(3)
        .with_thread_count(ThreadCount::Count(2));
    let solution = run_engine_with_config(six_item_universe(), config).unwrap();

    assert_eq!(solution.total_score, 260);
    assert_eq!(solution.item_mask().count(), 6);
}

#[test]
fn test_run_engine_rejects_bad_config() {
    let config = EngineConfig::new().with_combo_size(0);
    assert_eq!(
        run_engine_with_config(six_item_universe(), config).unwrap_err(),
        ComboForgeError::InvalidComboSize(0)
    );
}

#[test]
fn test_loaded_config_is_validated_by_engine() {
    let config = EngineConfig::from_toml_str(
        r#"
        combo_size = 2
        loadout_size = 3
        initial_pool_size = 100
        max_pool_size = 50
        "#,
    )
    .unwrap();

    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    assert_eq!(
        run_engine_with_config(six_item_universe(), config).unwrap_err(),
        ComboForgeError::PoolCapBelowInitial {
            max: 50,
            initial: 100
        }
    );
}

#[test]
fn test_toml_config_drives_engine() {
    let config = EngineConfig::from_toml_str(
        r#"
        combo_size = 3
        loadout_size = 2
        initial_pool_size = 4
        thread_count = "none"
        "#,
    )
    .unwrap();
    let counter = Arc::new(CountingEventListener::new());
    let mut engine = ComboEngine::with_config(disjoint_category_universe(6), config)
        .unwrap()
        .with_listener(counter.clone());

    let solution = engine.solve().unwrap();

    assert_eq!(solution.len(), 2);
    assert_eq!(solution.item_mask().count(), 6);
    assert_eq!(counter.count(EngineEvent::Completed), 1);
}
