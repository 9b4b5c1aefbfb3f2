// crates/pulso-core/src/interfaces/mod.rs
// ============================================================================
// Module: Pulso Interfaces
// Description: Backend-agnostic interfaces for durable storage and transport.
// Purpose: Define the contract surfaces used by the submission pipeline.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the submission pipeline integrates with persistent
//! storage and the remote collection endpoint without embedding
//! backend-specific details. Implementations must fail closed: a store that
//! cannot open reports [`StoreError::Unavailable`] instead of silently
//! dropping writes, and a transport that cannot parse a response reports
//! [`TransportError::Protocol`] instead of inventing an acknowledgment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::classify::Semaphore;
use crate::core::identifiers::RecordId;
use crate::core::record::CacheEntry;
use crate::core::record::Session;
use crate::core::record::SubmissionRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Durable store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Unavailable` is surfaced to callers, never retried silently.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// Persistent storage could not be opened or is blocked by the host.
    #[error("persistent storage unavailable: {0}")]
    Unavailable(String),
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Storage engine error.
    #[error("store backend error: {0}")]
    Db(String),
    /// Stored entry failed its integrity check.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Invalid stored data.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Entry serialization failed.
    #[error("store serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// SECTION: Durable Store
// ============================================================================

/// Key-addressed persistent storage with queue and cache namespaces.
///
/// # Invariants
/// - `put` operations are atomic: a concurrent reader never observes a
///   partially written entry.
/// - Deleting a missing key is a no-op, not an error.
/// - Queue-namespace entries are mutated only by the submission queue.
/// - Listing order is stable for a given store state; callers must not
///   depend on more than that.
pub trait DurableStore: Send + Sync {
    /// Inserts or replaces a record in the queue namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or storage is unavailable.
    fn put_record(&self, record: &SubmissionRecord) -> Result<(), StoreError>;

    /// Loads a record from the queue namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails or the entry is corrupt.
    fn get_record(&self, id: &RecordId) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Deletes a record from the queue namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails; missing keys succeed.
    fn delete_record(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Lists pending records in stable order, bounded by `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the scan fails or an entry is corrupt.
    fn list_pending(&self, limit: usize) -> Result<Vec<SubmissionRecord>, StoreError>;

    /// Inserts or replaces an entry in the cache namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or storage is unavailable.
    fn put_cache(&self, entry: &CacheEntry) -> Result<(), StoreError>;

    /// Loads an entry from the cache namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails or the entry is corrupt.
    fn get_cache(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Deletes an entry from the cache namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails; missing keys succeed.
    fn delete_cache(&self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Remote endpoint transport errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Network` is transient: queued records stay pending and retry later.
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    /// Connection-level failure (timeout, DNS, refused, interrupted body).
    #[error("network error: {0}")]
    Network(String),
    /// Endpoint returned a negative acknowledgment.
    #[error("submission rejected: {message}")]
    Rejected {
        /// Endpoint-provided reason.
        message: String,
        /// True when the endpoint explicitly marked the rejection permanent.
        permanent: bool,
    },
    /// Login credentials rejected.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Response could not be parsed against the wire contract.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Returns true when a later retry of the same call may succeed.
    ///
    /// Unknown negative acknowledgments are treated as retryable; only an
    /// explicit permanent rejection is not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Protocol(_) => true,
            Self::Rejected {
                permanent, ..
            } => !*permanent,
            Self::Auth(_) => false,
        }
    }
}

// ============================================================================
// SECTION: Dashboard Types
// ============================================================================

/// Optional filters for the dashboard summary query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilters {
    /// Restrict to one informant type label.
    #[serde(default)]
    pub informant: Option<String>,
    /// Restrict to one community.
    #[serde(default)]
    pub community: Option<String>,
}

/// Aggregate counters shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardKpi {
    /// Number of answer rows in the window.
    pub responses: u64,
    /// Number of distinct surveys in the window.
    pub surveys: u64,
    /// Number of distinct informants in the window.
    pub informants: u64,
    /// Mean score over the window.
    pub avg_score: f64,
}

/// System-level semaphore shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSemaphore {
    /// Current system color.
    pub color: Semaphore,
    /// Mean daily score backing the color.
    pub mean_daily_score: f64,
    /// Human-readable rationale lines.
    pub rationale: Vec<String>,
}

/// Single sample row in the dashboard table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    /// Capture timestamp rendered by the endpoint.
    pub ts: String,
    /// Informant type label.
    pub informant: String,
    /// Community name.
    pub community: String,
    /// Topic label.
    pub topic: String,
    /// Answer text.
    pub answer: String,
    /// Row score.
    pub score: f64,
}

/// Read-only dashboard summary returned by the endpoint.
///
/// # Invariants
/// - The core never mutates local state from a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// System semaphore, absent when the window holds no data.
    #[serde(default)]
    pub semaphore: Option<DashboardSemaphore>,
    /// Aggregate counters.
    #[serde(default)]
    pub kpi: DashboardKpi,
    /// Mean score per day keyed by ISO date.
    #[serde(default)]
    pub by_day: BTreeMap<String, f64>,
    /// Sample rows for the table view.
    #[serde(default)]
    pub sample: Vec<DashboardRow>,
    /// Community names available for filtering.
    #[serde(default)]
    pub communities: Vec<String>,
}

/// Cosmetic remote configuration blob.
///
/// # Invariants
/// - Contents are opaque to the core and cached verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteConfig(pub Value);

// ============================================================================
// SECTION: Transport
// ============================================================================

/// RPC-style client for the remote collection endpoint.
///
/// # Invariants
/// - `submit` is idempotent on the server side, keyed by the record
///   identifier; retrying a previously accepted record is a safe no-op.
pub trait Transport: Send + Sync {
    /// Exchanges credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Auth`] on rejected credentials and
    /// [`TransportError::Network`] when the endpoint is unreachable.
    fn login(&self, usuario: &str, password: &str) -> Result<Session, TransportError>;

    /// Delivers one submission record.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when delivery is not positively
    /// acknowledged; the caller leaves the record pending.
    fn submit(&self, token: &str, record: &SubmissionRecord) -> Result<(), TransportError>;

    /// Queries the read-only dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the query fails or the caller lacks
    /// the dashboard capability.
    fn dashboard_summary(
        &self,
        token: &str,
        window_days: u32,
        filters: &DashboardFilters,
    ) -> Result<DashboardSummary, TransportError>;

    /// Fetches the cosmetic remote configuration blob.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the fetch fails.
    fn fetch_config(&self) -> Result<RemoteConfig, TransportError>;

    /// Reports current connectivity.
    fn is_online(&self) -> bool;
}
