// crates/pulso-core/src/runtime/telemetry.rs
// ============================================================================
// Module: Pulso Sync Telemetry
// Description: Internal counters for sync pass outcomes.
// Purpose: Provide observability without user-visible reporting or hard deps.
// Dependencies: serde, crate::core::time, crate::runtime::queue
// ============================================================================

//! ## Overview
//! This module exposes a thin counter surface for sync pass outcomes. It is
//! intentionally dependency-light so downstream deployments can plug in
//! Prometheus or OpenTelemetry without redesign. Silent sync passes update
//! these counters even though they suppress user-visible reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Deserialize;
use serde::Serialize;

use crate::core::time::Timestamp;
use crate::runtime::queue::SyncOutcome;
use crate::runtime::queue::SyncReport;

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Snapshot of sync telemetry counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncTelemetrySnapshot {
    /// Number of sync passes that started.
    pub passes_started: u64,
    /// Total records delivered across all passes.
    pub delivered_total: u64,
    /// Total per-record failures across all passes.
    pub failed_total: u64,
    /// Number of passes aborted because the transport was offline.
    pub offline_aborts: u64,
    /// Number of passes that found nothing pending.
    pub empty_passes: u64,
    /// Number of sync calls rejected because a pass was in flight.
    pub rejected_concurrent: u64,
    /// Outcome label of the most recent pass.
    #[serde(default)]
    pub last_outcome: Option<String>,
    /// Timestamp of the most recent pass.
    #[serde(default)]
    pub last_pass_at: Option<Timestamp>,
}

// ============================================================================
// SECTION: Telemetry
// ============================================================================

/// Mutable sync counters behind a mutex.
///
/// # Invariants
/// - Counters only grow; a poisoned mutex falls back to the inner value.
#[derive(Debug, Default)]
pub struct SyncTelemetry {
    /// Counter state.
    inner: Mutex<SyncTelemetrySnapshot>,
}

impl SyncTelemetry {
    /// Creates zeroed telemetry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed sync pass.
    pub fn record_pass(&self, report: &SyncReport, at: Timestamp) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.passes_started = guard.passes_started.saturating_add(1);
        guard.delivered_total = guard
            .delivered_total
            .saturating_add(u64::try_from(report.delivered).unwrap_or(u64::MAX));
        guard.failed_total =
            guard.failed_total.saturating_add(u64::try_from(report.failed).unwrap_or(u64::MAX));
        match report.outcome {
            SyncOutcome::Offline => {
                guard.offline_aborts = guard.offline_aborts.saturating_add(1);
            }
            SyncOutcome::NothingPending => {
                guard.empty_passes = guard.empty_passes.saturating_add(1);
            }
            SyncOutcome::Completed => {}
        }
        guard.last_outcome = Some(report.outcome.label().to_string());
        guard.last_pass_at = Some(at);
    }

    /// Records a sync call rejected because a pass was already in flight.
    pub fn record_rejected_concurrent(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.rejected_concurrent = guard.rejected_concurrent.saturating_add(1);
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn snapshot(&self) -> SyncTelemetrySnapshot {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
