//! Tests for engine configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        combo_size = 3
        loadout_size = 4
        initial_pool_size = 500
        max_pool_size = 8000
        thread_count = "none"
        parallel_packing = false
    "#;

    let config = EngineConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.combo_size, 3);
    assert_eq!(config.loadout_size, 4);
    assert_eq!(config.initial_pool_size, 500);
    assert_eq!(config.max_pool_size, Some(8000));
    assert_eq!(config.thread_count, ThreadCount::None);
    assert!(!config.parallel_packing);
    assert!(config.diversity_injection);
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        combo_size: 2
        thread_count: none
        diversity_injection: false
    "#;

    let config = EngineConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.combo_size, 2);
    assert_eq!(config.loadout_size, DEFAULT_LOADOUT_SIZE);
    assert_eq!(config.thread_count, ThreadCount::None);
    assert!(!config.diversity_injection);
}

#[test]
fn test_empty_document_gives_defaults() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.combo_size, 5);
    assert_eq!(config.loadout_size, 10);
    assert_eq!(config.initial_pool_size, 2000);
    assert_eq!(config.max_pool_size, None);
    assert_eq!(config.thread_count, ThreadCount::Auto);
}

#[test]
fn test_builder() {
    let config = EngineConfig::new()
        .with_combo_size(2)
        .with_loadout_size(3)
        .with_initial_pool_size(16)
        .with_max_pool_size(64)
        .with_thread_count(ThreadCount::Count(2))
        .with_parallel_packing(false)
        .with_diversity_injection(false);

    assert_eq!(config.combo_size, 2);
    assert_eq!(config.loadout_size, 3);
    assert_eq!(config.initial_pool_size, 16);
    assert_eq!(config.max_pool_size, Some(64));
    assert_eq!(config.thread_count.resolve(), Some(2));
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_values() {
    let cases = [
        EngineConfig::new().with_combo_size(0),
        EngineConfig::new().with_combo_size(6),
        EngineConfig::new().with_loadout_size(0),
        EngineConfig::new().with_initial_pool_size(0),
        EngineConfig::new().with_max_pool_size(10),
        EngineConfig::new().with_thread_count(ThreadCount::Count(0)),
    ];

    for config in cases {
        assert!(
            matches!(config.validate(), Err(ConfigError::Invalid(_))),
            "{config:?} should be rejected"
        );
    }
}

#[test]
fn test_check_reports_engine_errors() {
    assert_eq!(EngineConfig::new().check(), Ok(()));
    assert_eq!(
        EngineConfig::new().with_combo_size(6).check(),
        Err(ComboForgeError::InvalidComboSize(6))
    );
    assert_eq!(
        EngineConfig::new()
            .with_thread_count(ThreadCount::Count(0))
            .check(),
        Err(ComboForgeError::InvalidCount("thread count"))
    );

    let capped = EngineConfig::new().with_max_pool_size(500);
    assert_eq!(
        capped.check(),
        Err(ComboForgeError::PoolCapBelowInitial {
            max: 500,
            initial: 2000
        })
    );
    match capped.validate() {
        Err(ConfigError::Invalid(msg)) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn test_config_files_round_trip() {
    let dir = std::env::temp_dir();
    let toml_path = dir.join(format!("comboforge-config-{}.toml", std::process::id()));
    let yaml_path = dir.join(format!("comboforge-config-{}.yaml", std::process::id()));
    std::fs::write(&toml_path, "combo_size = 3\nloadout_size = 4\n").unwrap();
    std::fs::write(&yaml_path, "combo_size: 2\nmax_pool_size: 4000\n").unwrap();

    let from_toml = EngineConfig::load(&toml_path).unwrap();
    let from_yaml = EngineConfig::from_yaml_file(&yaml_path).unwrap();
    std::fs::remove_file(&toml_path).unwrap();
    std::fs::remove_file(&yaml_path).unwrap();

    assert_eq!(from_toml.combo_size, 3);
    assert_eq!(from_toml.loadout_size, 4);
    assert_eq!(from_yaml.combo_size, 2);
    assert_eq!(from_yaml.max_pool_size, Some(4000));
    assert_eq!(from_yaml.loadout_size, DEFAULT_LOADOUT_SIZE);
}

#[test]
fn test_thread_count_resolve() {
    assert_eq!(ThreadCount::Auto.resolve(), None);
    assert_eq!(ThreadCount::None.resolve(), Some(1));
    assert_eq!(ThreadCount::Count(6).resolve(), Some(6));
}

#[test]
fn test_invalid_toml() {
    let result = EngineConfig::from_toml_str("combo_size = \"five\"");
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_load_missing_file() {
    let result = EngineConfig::load("/nonexistent/comboforge.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
