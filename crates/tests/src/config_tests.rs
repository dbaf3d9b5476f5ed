//! Configuration Loading Tests
//!
//! These tests exercise layered loading from real TOML files on disk,
//! including fallback behavior when the file is absent or malformed.

use counter_core::config::AppConfig;
use std::path::PathBuf;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
environment = "production"

[server]
bind_port = 4010
max_concurrent_requests = 250
allowed_origins = ["https://jokes.example.com"]

[counter]
max_witnesses = 5

[reports]
directory = "/var/lib/joke-counter/reports"

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = AppConfig::from_file(&path).unwrap();

    assert_eq!(config.environment, "production");
    assert_eq!(config.server.bind_port, 4010);
    assert_eq!(config.server.max_concurrent_requests, 250);
    assert_eq!(config.server.allowed_origins, vec!["https://jokes.example.com"]);
    assert_eq!(config.counter.max_witnesses, 5);
    assert_eq!(config.reports.directory, PathBuf::from("/var/lib/joke-counter/reports"));
    assert_eq!(config.logging.format, "json");

    // Untouched fields keep their defaults.
    assert_eq!(config.server.bind_address, "127.0.0.1");
    assert!(config.reports.enabled);
    assert!(config.metrics.enabled);

    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = AppConfig::from_file(&path).unwrap();

    assert_eq!(config.server.bind_port, 3002);
    assert_eq!(config.counter.max_witnesses, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "this is not [valid toml");

    assert!(AppConfig::from_file(&path).is_err());
}

#[test]
fn test_loaded_config_can_still_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r"
[counter]
max_witnesses = 0
",
    );

    let config = AppConfig::from_file(&path).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_socket_addr_from_loaded_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
bind_address = "0.0.0.0"
bind_port = 8080
"#,
    );

    let config = AppConfig::from_file(&path).unwrap();
    let addr = config.socket_addr().unwrap();

    assert_eq!(addr.to_string(), "0.0.0.0:8080");
}
