// crates/pulso-core/src/runtime/queue.rs
// ============================================================================
// Module: Pulso Submission Queue & Sync Engine
// Description: Record freezing, durable queueing, and serialized delivery.
// Purpose: Reconcile locally captured records with the remote endpoint.
// Dependencies: crate::core, crate::interfaces, crate::runtime::telemetry
// ============================================================================

//! ## Overview
//! The submission queue freezes validated responses into durable records and
//! drains them to the remote endpoint in serialized sync passes. Delivery is
//! at-least-once: a record is deleted from the queue namespace if and only
//! if the endpoint positively acknowledged it, and the endpoint deduplicates
//! by the record identifier, so retries are safe. Within a pass records are
//! attempted sequentially and one record's failure never aborts the batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::classify::classify;
use crate::core::eligibility::ValidationError;
use crate::core::eligibility::validate;
use crate::core::identifiers::RecordIdGenerator;
use crate::core::record::RecordStatus;
use crate::core::record::Session;
use crate::core::record::SubmissionRecord;
use crate::core::response::SurveyResponse;
use crate::core::time::Timestamp;
use crate::interfaces::DurableStore;
use crate::interfaces::StoreError;
use crate::interfaces::Transport;
use crate::runtime::telemetry::SyncTelemetry;
use crate::runtime::telemetry::SyncTelemetrySnapshot;

// ============================================================================
// SECTION: Queue Errors
// ============================================================================

/// Submission queue errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Validation rejections carry the complete violation list.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Response failed validation; the full violation list is attached.
    #[error("response failed validation with {} violation(s)", .0.len())]
    Rejected(Vec<ValidationError>),
    /// Durable store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A sync pass is already in flight.
    #[error("a sync pass is already in flight")]
    SyncInFlight,
}

// ============================================================================
// SECTION: Sync Types
// ============================================================================

/// Reporting mode for a sync pass.
///
/// Interactive passes render their report to the user; silent passes
/// suppress user-visible reporting but still update telemetry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Suppress user-visible reporting.
    Silent,
    /// Surface the report to the caller.
    Interactive,
}

/// Outcome of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No pending records existed.
    NothingPending,
    /// The transport reported no connectivity; nothing was attempted.
    Offline,
    /// The pass attempted every pending record.
    Completed,
}

impl SyncOutcome {
    /// Returns a stable label for telemetry and reporting.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NothingPending => "nothing_pending",
            Self::Offline => "offline",
            Self::Completed => "completed",
        }
    }
}

/// Result of one sync pass.
///
/// # Invariants
/// - `delivered + failed` equals the number of records attempted.
/// - Offline and nothing-pending passes attempted zero records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Reporting mode the pass ran under.
    pub mode: SyncMode,
    /// Pass outcome.
    pub outcome: SyncOutcome,
    /// Records positively acknowledged and deleted.
    pub delivered: usize,
    /// Records left pending after a failed attempt.
    pub failed: usize,
}

// ============================================================================
// SECTION: In-Flight Guard
// ============================================================================

/// Clears the in-flight flag when a sync pass ends, on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// SECTION: Submission Queue
// ============================================================================

/// Orchestrates record creation, persistence, and best-effort delivery.
///
/// # Invariants
/// - Queue-namespace entries are mutated only through this type.
/// - At most one sync pass runs at a time; concurrent calls are rejected.
/// - A record is deleted if and only if delivery was acknowledged.
pub struct SubmissionQueue {
    /// Durable store holding the queue and cache namespaces.
    store: Arc<dyn DurableStore>,
    /// Transport to the remote endpoint.
    transport: Arc<dyn Transport>,
    /// Identifier generator for new records.
    ids: RecordIdGenerator,
    /// Bounded scan size for one pass.
    batch_limit: usize,
    /// Serialization flag for sync passes.
    in_flight: AtomicBool,
    /// Internal sync counters.
    telemetry: SyncTelemetry,
}

impl SubmissionQueue {
    /// Creates a queue over the provided store and transport.
    #[must_use]
    pub fn new(
        store: Arc<dyn DurableStore>,
        transport: Arc<dyn Transport>,
        batch_limit: usize,
    ) -> Self {
        Self {
            store,
            transport,
            ids: RecordIdGenerator::new(),
            batch_limit,
            in_flight: AtomicBool::new(false),
            telemetry: SyncTelemetry::new(),
        }
    }

    /// Validates, classifies, and persists a response as a pending record.
    ///
    /// The signal set is normalized (grievance exclusivity) before freezing
    /// so stored and delivered payloads honor the rule even when the caller
    /// skipped interactive clearing. No delivery is attempted here.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Rejected`] with the complete violation list
    /// when the response is incomplete, or [`QueueError::Store`] when
    /// persistence fails.
    pub fn create_record(
        &self,
        response: &SurveyResponse,
        session: &Session,
        created_at: Timestamp,
    ) -> Result<SubmissionRecord, QueueError> {
        let errors = validate(response);
        if !errors.is_empty() {
            return Err(QueueError::Rejected(errors));
        }
        let frozen = response.with_normalized_signals();
        let classification = classify(&frozen);
        let record = SubmissionRecord {
            record_id: self.ids.issue(),
            created_at,
            status: RecordStatus::Pending,
            token: session.token.clone(),
            response: frozen,
            classification,
        };
        self.store.put_record(&record)?;
        Ok(record)
    }

    /// Runs one serialized sync pass.
    ///
    /// Pending records are read in the store's stable listing order and
    /// attempted sequentially: each attempt fully completes (acknowledge and
    /// delete, or leave pending) before the next begins, so a mid-batch
    /// crash leaves at most one record's delivery status ambiguous. Any
    /// per-record transport failure is absorbed into the failure tally.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::SyncInFlight`] when a pass is already running
    /// and [`QueueError::Store`] when the store fails mid-pass.
    pub fn sync(&self, mode: SyncMode, now: Timestamp) -> Result<SyncReport, QueueError> {
        if self.in_flight.swap(true, Ordering::Acquire) {
            self.telemetry.record_rejected_concurrent();
            return Err(QueueError::SyncInFlight);
        }
        let guard = InFlightGuard(&self.in_flight);
        let result = self.sync_pass(mode);
        drop(guard);
        if let Ok(report) = &result {
            self.telemetry.record_pass(report, now);
        }
        result
    }

    /// Executes the pass body with the in-flight flag held.
    fn sync_pass(&self, mode: SyncMode) -> Result<SyncReport, QueueError> {
        let pending = self.store.list_pending(self.batch_limit)?;
        if pending.is_empty() {
            return Ok(SyncReport {
                mode,
                outcome: SyncOutcome::NothingPending,
                delivered: 0,
                failed: 0,
            });
        }
        if !self.transport.is_online() {
            return Ok(SyncReport {
                mode,
                outcome: SyncOutcome::Offline,
                delivered: 0,
                failed: 0,
            });
        }
        let mut delivered = 0;
        let mut failed = 0;
        for record in &pending {
            match self.transport.submit(&record.token, record) {
                Ok(()) => {
                    self.store.delete_record(&record.record_id)?;
                    delivered += 1;
                }
                Err(_) => {
                    failed += 1;
                }
            }
        }
        Ok(SyncReport {
            mode,
            outcome: SyncOutcome::Completed,
            delivered,
            failed,
        })
    }

    /// Counts pending records, bounded by the configured batch limit.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Store`] when the scan fails.
    pub fn pending_count(&self) -> Result<usize, QueueError> {
        Ok(self.store.list_pending(self.batch_limit)?.len())
    }

    /// Returns a snapshot of the sync telemetry counters.
    #[must_use]
    pub fn telemetry(&self) -> SyncTelemetrySnapshot {
        self.telemetry.snapshot()
    }
}
