//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! building clients from it.

use std::io::Write;

use nimbus_domain::constants::{DEFAULT_ENDPOINT, DEFAULT_POLL_MAX_RETRIES};
use nimbus_domain::{BackoffConfig, NimbusError};
use nimbus_infra::{config, ActionsClient};
use tempfile::NamedTempFile;

fn write_with_extension(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "token": "json-token",
        "endpoint": "https://api.example.com/v1",
        "request_timeout_secs": 5,
        "http_max_attempts": 2,
        "poll": {
            "interval_secs": 0.5,
            "backoff": { "kind": "exponential", "cap_secs": 10.0 },
            "max_retries": 40
        }
    }"#;
    let path = write_with_extension(json_content, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("Failed to load config from JSON file");
    assert_eq!(config.token, "json-token");
    assert_eq!(config.request_timeout_secs, 5);
    assert_eq!(config.http_max_attempts, 2);
    assert_eq!(config.poll.max_retries, 40);
    assert_eq!(
        config.poll.backoff,
        BackoffConfig::Exponential { multiplier: 2.0, cap_secs: 10.0, jitter: false }
    );
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
token = "toml-token"

[poll]
interval_secs = 3.0
"#;
    let path = write_with_extension(toml_content, "toml");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = result.expect("Failed to load config from TOML file");
    assert_eq!(config.token, "toml-token");
    assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    assert!((config.poll.interval_secs - 3.0).abs() < f64::EPSILON);
    assert_eq!(config.poll.max_retries, DEFAULT_POLL_MAX_RETRIES);
}

#[test]
fn test_loaded_config_builds_actions_client() {
    let path = write_with_extension(r#"{ "token": "t", "endpoint": "http://localhost:9/v1" }"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let client = ActionsClient::from_config(&result.unwrap()).expect("client should build");
    assert_eq!(client.scoped("/volumes/7").base_path(), "/volumes/7/actions");
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/nimbus.json".into()));

    match result {
        Err(NimbusError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_with_extension(r#"{ "this is": "not valid" "#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    match result {
        Err(NimbusError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}
