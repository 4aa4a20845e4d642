//! Integration tests for leaflet-core infrastructure

use std::time::Duration;
use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok};
use leaflet_core::{
    config_error, import_error, not_found_error, validation_error, with_timeout, ErrorContext,
    LeafletConfig, LeafletError, OutputFormat, Tone, Verbosity,
};

#[tokio::test]
async fn test_error_handling() {
    let error = import_error!("Clone failed", "repo_importer");

    match &error {
        LeafletError::Import {
            message, context, ..
        } => {
            assert_eq!(message, "Clone failed");
            assert_eq!(context.component, "repo_importer");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Import error"),
    }

    // Should not panic without a subscriber
    error.log();

    let rate_limited = LeafletError::RateLimit {
        message: "Too Many Requests".to_string(),
        retry_after_ms: Some(30_000),
        context: ErrorContext::new("ai_service"),
    };
    assert_eq!(rate_limited.to_string(), "Rate limit exceeded: Too Many Requests");
    rate_limited.log();

    let config_error = config_error!("Invalid config", "test");
    let suggestions = &config_error.context().unwrap().recovery_suggestions;
    assert!(suggestions.iter().any(|s| s.contains("leaflet config --init")));
}

#[tokio::test]
async fn test_timeout_mechanism() {
    let quick_operation = async {
        sleep(Duration::from_millis(10)).await;
        "Success"
    };
    let result = assert_ok!(with_timeout(quick_operation, 500, "quick_test").await);
    assert_eq!(result, "Success");

    let slow_operation = async {
        sleep(Duration::from_millis(200)).await;
        "Should not reach here"
    };
    match assert_err!(with_timeout(slow_operation, 20, "slow_test").await) {
        LeafletError::Timeout {
            operation,
            duration_ms,
            ..
        } => {
            assert_eq!(operation, "slow_test");
            assert_eq!(duration_ms, 20);
        }
        other => panic!("Expected Timeout error, got {other:?}"),
    }
}

#[test]
fn test_config_round_trip_through_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("leaflet.toml");

    let mut config = LeafletConfig::default();
    config.ai.model = "gemini-1.5-pro".to_string();
    config.documentation.tone = Tone::Technical;
    config.documentation.output_format = OutputFormat::Markdown;
    config.inventory.extra_ignore_patterns = vec!["target/**".to_string()];

    assert_ok!(config.save_to_file(&path));
    let loaded = assert_ok!(LeafletConfig::from_file(&path));

    assert_eq!(loaded.ai.model, "gemini-1.5-pro");
    assert_eq!(loaded.documentation.tone, Tone::Technical);
    assert_eq!(loaded.documentation.output_format, OutputFormat::Markdown);
    assert_eq!(loaded.documentation.verbosity, Verbosity::Standard);
    assert_eq!(loaded.inventory.extra_ignore_patterns, vec!["target/**"]);
    assert!(loaded.ai.api_key.is_none());
}

#[test]
fn test_config_validation() {
    let mut config = LeafletConfig::default();
    assert_ok!(config.validate());

    config.ai.max_tokens = 0;
    match assert_err!(config.validate()) {
        LeafletError::Config { message, .. } => assert!(message.contains("max_tokens")),
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_error_macros() {
    let validation_err = validation_error!("Invalid id", "id", "storage");
    match validation_err {
        LeafletError::Validation {
            message,
            field,
            context,
        } => {
            assert_eq!(message, "Invalid id");
            assert_eq!(field, Some("id".to_string()));
            assert_eq!(context.component, "storage");
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }

    let not_found_err = not_found_error!("analysis 1700000000000", "storage");
    match not_found_err {
        LeafletError::NotFound { resource, context } => {
            assert_eq!(resource, "analysis 1700000000000");
            assert_eq!(context.component, "storage");
        }
        _ => panic!("Expected NotFound error"),
    }
}
