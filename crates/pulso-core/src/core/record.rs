// crates/pulso-core/src/core/record.rs
// ============================================================================
// Module: Pulso Durable Record Model
// Description: Submission records, sessions, and cache entries.
// Purpose: Define the units of durability for the offline submission pipeline.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! A [`SubmissionRecord`] freezes a validated, classified survey response
//! together with its idempotency identifier and owning session credential.
//! Records live in the store's queue namespace until the remote endpoint
//! acknowledges delivery, at which point they are deleted; there is no
//! stored terminal state. Sessions and remote-config blobs live in the
//! cache namespace as timestamped entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::classify::ClassificationResult;
use crate::core::identifiers::RecordId;
use crate::core::response::SurveyResponse;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Cache Keys
// ============================================================================

/// Cache-namespace key holding the persisted session.
pub const CACHE_KEY_SESSION: &str = "session";
/// Cache-namespace key holding the cached remote configuration blob.
pub const CACHE_KEY_CONFIG: &str = "config";

// ============================================================================
// SECTION: Submission Record
// ============================================================================

/// Lifecycle status of a queued submission record.
///
/// # Invariants
/// - `Pending` is the only stored status: acknowledged records are deleted,
///   never transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Awaiting acknowledged delivery.
    Pending,
}

/// Unit of durability and delivery.
///
/// # Invariants
/// - `record_id` is assigned exactly once at creation and never reused.
/// - The embedded response and classification are immutable once frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Client-generated identifier doubling as the idempotency key.
    pub record_id: RecordId,
    /// Creation timestamp supplied by the host.
    pub created_at: Timestamp,
    /// Lifecycle status.
    pub status: RecordStatus,
    /// Credential token of the owning session.
    pub token: String,
    /// Frozen survey response.
    pub response: SurveyResponse,
    /// Classification computed at freeze time.
    pub classification: ClassificationResult,
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Authenticated session issued by the remote endpoint.
///
/// # Invariants
/// - `token` is opaque; the client never inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Credential token presented on submit and dashboard calls.
    pub token: String,
    /// Whether the session may query the dashboard summary.
    pub can_dashboard: bool,
}

// ============================================================================
// SECTION: Cache Entry
// ============================================================================

/// Versioned blob stored in the cache namespace.
///
/// # Invariants
/// - `key` is a logical name (`session`, `config`); one entry per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Logical entry name.
    pub key: String,
    /// Arbitrary JSON payload.
    pub value: Value,
    /// Save timestamp supplied by the host.
    pub saved_at: Timestamp,
}
