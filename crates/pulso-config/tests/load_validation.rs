// crates/pulso-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load & Validation Tests
// Description: Defaults, TOML loading, and field-level rejections.
// Purpose: Pin the strict configuration contract.
// Dependencies: pulso-config, pulso-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Exercises configuration loading: minimal files pick up every default,
//! full files override them, and each invalid value is rejected with a
//! field-qualified error instead of being silently patched.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::PathBuf;

use pulso_config::ConfigError;
use pulso_config::load_from_path;
use pulso_config::load_from_str;
use pulso_store_sqlite::SqliteJournalMode;
use pulso_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn minimal_config_fills_every_default() {
    let config = load_from_str(r#"endpoint = "https://collect.example.org/exec""#).unwrap();
    assert_eq!(config.store.path, PathBuf::from("pulso.db"));
    assert_eq!(config.store.busy_timeout_ms, 5_000);
    assert_eq!(config.store.journal_mode, SqliteJournalMode::Wal);
    assert_eq!(config.store.sync_mode, SqliteSyncMode::Full);
    assert_eq!(config.sync.batch_limit, 500);
    assert_eq!(config.sync.request_timeout_ms, 30_000);
    assert_eq!(config.sync.probe_timeout_ms, 3_000);
}

#[test]
fn full_config_overrides_the_defaults() {
    let config = load_from_str(
        r#"
        endpoint = "https://collect.example.org/exec"

        [store]
        path = "/var/lib/pulso/field.db"
        busy_timeout_ms = 250
        journal_mode = "delete"
        sync_mode = "normal"

        [sync]
        batch_limit = 50
        request_timeout_ms = 10000
        probe_timeout_ms = 500
        "#,
    )
    .unwrap();
    assert_eq!(config.store.path, PathBuf::from("/var/lib/pulso/field.db"));
    assert_eq!(config.store.busy_timeout_ms, 250);
    assert_eq!(config.store.journal_mode, SqliteJournalMode::Delete);
    assert_eq!(config.store.sync_mode, SqliteSyncMode::Normal);
    assert_eq!(config.sync.batch_limit, 50);
    assert_eq!(config.sync.request_timeout_ms, 10_000);
    assert_eq!(config.sync.probe_timeout_ms, 500);
}

#[test]
fn config_loads_from_a_file_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pulso.toml");
    std::fs::write(&path, "endpoint = \"http://localhost:8080/collect\"\n").unwrap();
    let config = load_from_path(&path).unwrap();
    assert_eq!(config.endpoint, "http://localhost:8080/collect");
}

// ============================================================================
// SECTION: Rejections
// ============================================================================

/// Asserts that loading fails with an `Invalid` error on the given field.
fn assert_invalid_field(raw: &str, field: &str) {
    match load_from_str(raw).unwrap_err() {
        ConfigError::Invalid {
            field: seen, ..
        } => assert_eq!(seen, field),
        other => panic!("expected invalid-field error, got {other}"),
    }
}

#[test]
fn missing_file_reports_an_io_error() {
    let error = load_from_path(&PathBuf::from("/definitely/not/here/pulso.toml")).unwrap_err();
    assert!(matches!(error, ConfigError::Io(_)));
}

#[test]
fn broken_toml_reports_a_parse_error() {
    let error = load_from_str("endpoint = ").unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[test]
fn empty_endpoint_is_rejected() {
    assert_invalid_field(r#"endpoint = """#, "endpoint");
}

#[test]
fn non_http_endpoint_scheme_is_rejected() {
    assert_invalid_field(r#"endpoint = "ftp://collect.example.org/exec""#, "endpoint");
}

#[test]
fn zero_batch_limit_is_rejected() {
    assert_invalid_field(
        "endpoint = \"https://collect.example.org/exec\"\n[sync]\nbatch_limit = 0\n",
        "sync.batch_limit",
    );
}

#[test]
fn zero_request_timeout_is_rejected() {
    assert_invalid_field(
        "endpoint = \"https://collect.example.org/exec\"\n[sync]\nrequest_timeout_ms = 0\n",
        "sync.request_timeout_ms",
    );
}

#[test]
fn zero_probe_timeout_is_rejected() {
    assert_invalid_field(
        "endpoint = \"https://collect.example.org/exec\"\n[sync]\nprobe_timeout_ms = 0\n",
        "sync.probe_timeout_ms",
    );
}

#[test]
fn zero_busy_timeout_is_rejected() {
    assert_invalid_field(
        "endpoint = \"https://collect.example.org/exec\"\n[store]\npath = \"x.db\"\n\
         busy_timeout_ms = 0\n",
        "store.busy_timeout_ms",
    );
}
