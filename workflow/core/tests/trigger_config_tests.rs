// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fs;
use workflow_core::{RetryPolicy, TriggerRequest, WorkflowConfig, WorkflowError};

fn assert_validation(result: Result<usize, WorkflowError>) {
    assert!(
        matches!(result, Err(WorkflowError::Validation(_))),
        "Expected validation error, got {:?}",
        result
    );
}

// ============================================================
// Trigger request
// ============================================================

#[test]
fn test_trigger_accepts_positive_count() {
    let request = TriggerRequest::from_json(r#"{ "numberOfItems": 7 }"#).unwrap();
    assert_eq!(request.validate(100).unwrap(), 7);
}

#[test]
fn test_trigger_rejects_missing_count() {
    let request = TriggerRequest::from_json("{}").unwrap();
    assert_validation(request.validate(100));
}

#[test]
fn test_trigger_rejects_zero_and_negative() {
    assert_validation(TriggerRequest::new(0).validate(100));
    assert_validation(TriggerRequest::new(-5).validate(100));
}

#[test]
fn test_trigger_rejects_count_above_maximum() {
    assert_validation(TriggerRequest::new(101).validate(100));
    assert_eq!(TriggerRequest::new(100).validate(100).unwrap(), 100);
}

#[test]
fn test_trigger_rejects_malformed_body() {
    assert!(matches!(
        TriggerRequest::from_json(r#"{ "numberOfItems": "seven" }"#),
        Err(WorkflowError::Validation(_))
    ));
    assert!(matches!(
        TriggerRequest::from_json("not json"),
        Err(WorkflowError::Validation(_))
    ));
}

#[test]
fn test_trigger_serializes_camel_case_field() {
    let json = serde_json::to_string(&TriggerRequest::new(3)).unwrap();
    assert_eq!(json, r#"{"numberOfItems":3}"#);
}

// ============================================================
// Configuration
// ============================================================

#[test]
fn test_default_config_is_valid() {
    let config = WorkflowConfig::default();
    assert_eq!(config.parallelism, 4);
    assert_eq!(config.retry.max_attempts, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_load_keeps_defaults_for_absent_fields() {
    let path = std::env::temp_dir().join(format!("workflow-config-{}.json", uuid::Uuid::new_v4()));
    fs::write(&path, r#"{ "parallelism": 8, "retry": { "max_attempts": 2 } }"#).unwrap();

    let config = WorkflowConfig::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.parallelism, 8);
    assert_eq!(config.max_items, WorkflowConfig::default().max_items);
    assert_eq!(config.retry.max_attempts, 2);
    assert_eq!(
        config.retry.initial_backoff_ms,
        RetryPolicy::default().initial_backoff_ms
    );
}

#[test]
fn test_config_load_missing_file_is_config_error() {
    let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
    assert!(matches!(
        WorkflowConfig::load(&path),
        Err(WorkflowError::Config(_))
    ));
}

#[test]
fn test_config_rejects_zero_parallelism() {
    let config = WorkflowConfig {
        parallelism: 0,
        ..WorkflowConfig::default()
    };
    assert!(matches!(config.validate(), Err(WorkflowError::Config(_))));
}
