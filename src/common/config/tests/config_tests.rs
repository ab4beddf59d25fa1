//! Unit tests for common-config crate

use common_config::{BraidConfig, ExecutionConfig, ExecutionMode, MAX_PARTITION_COUNT};
use common_error::BraidError;

#[test]
fn test_braid_config_default() {
    let config = BraidConfig::default();

    assert_eq!(config.execution.parallelism, None);
    assert_eq!(config.execution.execution_mode, ExecutionMode::Default);
    assert!(config.execution.collect_metrics);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partition_count_resolution() {
    let config = ExecutionConfig::default().with_parallelism(4);
    assert_eq!(config.partition_count(), 4);

    let auto = ExecutionConfig::default();
    assert!(auto.partition_count() >= 1);
    assert!(auto.partition_count() <= MAX_PARTITION_COUNT);
}

#[test]
fn test_validate_rejects_zero_partitions() {
    let config = ExecutionConfig::default().with_parallelism(0);
    assert!(matches!(config.validate(), Err(BraidError::ConfigError(_))));
}

#[test]
fn test_validate_rejects_oversized_parallelism() {
    let config = ExecutionConfig::default().with_parallelism(MAX_PARTITION_COUNT + 1);
    assert!(config.validate().is_err());

    let config = ExecutionConfig::default().with_parallelism(MAX_PARTITION_COUNT);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_json_partial() {
    let config =
        BraidConfig::from_json(r#"{"execution": {"parallelism": 8, "execution_mode": "sequential"}}"#)
            .unwrap();

    assert_eq!(config.execution.parallelism, Some(8));
    assert_eq!(config.execution.execution_mode, ExecutionMode::Sequential);
    assert!(config.execution.collect_metrics);
}

#[test]
fn test_from_json_invalid() {
    let err = BraidConfig::from_json(r#"{"execution": {"parallelism": 0}}"#).unwrap_err();
    assert!(matches!(err, BraidError::ConfigError(_)));

    let err = BraidConfig::from_json("{").unwrap_err();
    assert!(matches!(err, BraidError::SerdeJsonError(_)));
}

#[test]
fn test_config_roundtrip() {
    let config = BraidConfig {
        execution: ExecutionConfig::default()
            .with_parallelism(2)
            .with_execution_mode(ExecutionMode::ForceParallelism)
            .with_metrics(false),
    };

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("force_parallelism"));
    let decoded = BraidConfig::from_json(&json).unwrap();
    assert_eq!(decoded, config);
}

#[test]
fn test_execution_mode_display() {
    assert_eq!(ExecutionMode::Default.to_string(), "Default");
    assert_eq!(ExecutionMode::Sequential.to_string(), "Sequential");
}
