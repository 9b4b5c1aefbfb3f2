// crates/pulso-config/src/lib.rs
// ============================================================================
// Module: Pulso Configuration
// Description: Canonical configuration model, loading, and validation.
// Purpose: Configure the store, transport, and sync behavior from TOML.
// Dependencies: pulso-store-sqlite, serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! The configuration model covers the three concerns a deployment must pin
//! down: where the durable store lives, which endpoint receives records, and
//! how a sync pass is bounded. Loading is strict: unknown endpoint schemes,
//! zero limits, and zero timeouts are rejected with field-qualified errors
//! instead of being silently defaulted at use sites.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use pulso_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default durable store file name.
const DEFAULT_STORE_PATH: &str = "pulso.db";
/// Default bounded scan size for one sync pass.
const DEFAULT_BATCH_LIMIT: usize = 500;
/// Default request timeout in milliseconds.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default connectivity probe timeout in milliseconds.
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;

/// Returns the default store section.
fn default_store_section() -> SqliteStoreConfig {
    SqliteStoreConfig {
        path: PathBuf::from(DEFAULT_STORE_PATH),
        busy_timeout_ms: 5_000,
        journal_mode: pulso_store_sqlite::SqliteJournalMode::Wal,
        sync_mode: pulso_store_sqlite::SqliteSyncMode::Full,
    }
}

/// Returns the default sync batch limit.
const fn default_batch_limit() -> usize {
    DEFAULT_BATCH_LIMIT
}

/// Returns the default request timeout.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Returns the default probe timeout.
const fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - `Invalid` carries the offending field path for precise reporting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Configuration file could not be parsed as TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Configuration value failed validation.
    #[error("invalid config: {field}: {message}")]
    Invalid {
        /// Field path that failed.
        field: String,
        /// Reason the value was rejected.
        message: String,
    },
}

impl ConfigError {
    /// Builds a field-qualified validation error.
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Model
// ============================================================================

/// Sync pass tuning.
///
/// # Invariants
/// - All values must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    /// Bounded scan size for one sync pass.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    /// Request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Connectivity probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

/// Application configuration.
///
/// # Invariants
/// - `endpoint` is an absolute `http` or `https` URL after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Collection endpoint URL.
    pub endpoint: String,
    /// Durable store settings.
    #[serde(default = "default_store_section")]
    pub store: SqliteStoreConfig,
    /// Sync pass settings.
    #[serde(default)]
    pub sync: SyncSection,
}

impl AppConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::invalid("endpoint", "must not be empty"));
        }
        let url = Url::parse(&self.endpoint)
            .map_err(|err| ConfigError::invalid("endpoint", err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "endpoint",
                format!("unsupported scheme: {}", url.scheme()),
            ));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("store.path", "must not be empty"));
        }
        if self.store.path.is_dir() {
            return Err(ConfigError::invalid("store.path", "must be a file, not a directory"));
        }
        if self.store.busy_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "store.busy_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.sync.batch_limit == 0 {
            return Err(ConfigError::invalid("sync.batch_limit", "must be greater than zero"));
        }
        if self.sync.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "sync.request_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.sync.probe_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "sync.probe_timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read,
/// [`ConfigError::Parse`] when it is not valid TOML, and
/// [`ConfigError::Invalid`] when a value fails validation.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    load_from_str(&raw)
}

/// Parses and validates configuration TOML.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the input is not valid TOML and
/// [`ConfigError::Invalid`] when a value fails validation.
pub fn load_from_str(raw: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig =
        toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
    config.validate()?;
    Ok(config)
}
