//! Configuration loading, environment overrides, and validation.
//!
//! Tests touching `LOADSIM_*` environment variables hold a shared lock:
//! file loaders apply env overrides too, so concurrent mutation would
//! bleed between tests.

use std::io::Write;
use std::sync::Mutex;

use loadsim::{DispatchError, LogFormat, SimulatorConfig};

static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn defaults_are_one_worker_threshold_fifty() {
    let config = SimulatorConfig::default();
    assert_eq!(config.initial_workers, 1);
    assert_eq!(config.scale_threshold, 50.0);
    assert_eq!(config.load_min, 1.0);
    assert_eq!(config.load_max, 11.0);
    assert_eq!(config.seed, None);
    assert!(config.validate().is_ok());
}

#[test]
fn yaml_file_round_trip() {
    let _guard = ENV_LOCK.lock().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "initial_workers: 3\nscale_threshold: 75.5\nseed: 42\nlogging:\n  level: debug\n  format: json"
    )
    .unwrap();

    let config = SimulatorConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.initial_workers, 3);
    assert_eq!(config.scale_threshold, 75.5);
    assert_eq!(config.seed, Some(42));
    // Unspecified fields keep their defaults.
    assert_eq!(config.load_min, 1.0);
    assert_eq!(config.load_max, 11.0);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn json_file_round_trip() {
    let _guard = ENV_LOCK.lock().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{\"scale_threshold\": 30.0, \"load_max\": 21.0}}").unwrap();

    let config = SimulatorConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.scale_threshold, 30.0);
    assert_eq!(config.load_max, 21.0);
    assert_eq!(config.initial_workers, 1);
}

#[test]
fn malformed_file_is_a_configuration_error() {
    let _guard = ENV_LOCK.lock().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "scale_threshold: [not, a, number]").unwrap();

    let err = SimulatorConfig::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(err, DispatchError::Configuration { .. }));
}

#[test]
fn missing_file_is_a_configuration_error() {
    let _guard = ENV_LOCK.lock().unwrap();

    let err = SimulatorConfig::from_yaml_file("/nonexistent/loadsim.yaml").unwrap_err();
    assert!(matches!(err, DispatchError::Configuration { .. }));
}

#[test]
fn env_overrides_take_effect() {
    let _guard = ENV_LOCK.lock().unwrap();

    std::env::set_var("LOADSIM_SCALE_THRESHOLD", "80.0");
    std::env::set_var("LOADSIM_SEED", "1234");
    std::env::set_var("LOADSIM_LOG_FORMAT", "json");

    let mut config = SimulatorConfig::default();
    let result = config.apply_env_overrides();

    std::env::remove_var("LOADSIM_SCALE_THRESHOLD");
    std::env::remove_var("LOADSIM_SEED");
    std::env::remove_var("LOADSIM_LOG_FORMAT");

    result.unwrap();
    assert_eq!(config.scale_threshold, 80.0);
    assert_eq!(config.seed, Some(1234));
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn unparsable_env_value_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();

    std::env::set_var("LOADSIM_INITIAL_WORKERS", "several");
    let mut config = SimulatorConfig::default();
    let result = config.apply_env_overrides();
    std::env::remove_var("LOADSIM_INITIAL_WORKERS");

    assert!(matches!(
        result.unwrap_err(),
        DispatchError::Configuration { .. }
    ));
}

#[test]
fn validation_rejects_empty_pool() {
    let config = SimulatorConfig {
        initial_workers: 0,
        ..SimulatorConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn validation_rejects_bad_threshold() {
    for threshold in [0.0, -10.0, f64::NAN, f64::INFINITY] {
        let config = SimulatorConfig {
            scale_threshold: threshold,
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_err(), "threshold {threshold} accepted");
    }
}

#[test]
fn validation_rejects_inverted_load_range() {
    let config = SimulatorConfig {
        load_min: 11.0,
        load_max: 1.0,
        ..SimulatorConfig::default()
    };
    assert!(config.validate().is_err());

    let config = SimulatorConfig {
        load_min: 5.0,
        load_max: 5.0,
        ..SimulatorConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn serde_round_trip_preserves_config() {
    let config = SimulatorConfig {
        initial_workers: 4,
        scale_threshold: 60.0,
        seed: Some(99),
        ..SimulatorConfig::default()
    };

    let yaml = serde_yaml::to_string(&config).unwrap();
    let back: SimulatorConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, config);
}
