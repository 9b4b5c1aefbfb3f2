// crates/pulso-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Helpers
// Description: Shared response builders and a scripted transport double.
// Purpose: Drive the queue and rule engines through deterministic scenarios.
// Dependencies: pulso-core
// ============================================================================

//! ## Overview
//! Shared helpers for pulso-core integration tests: a fully answered
//! questionnaire builder and a scripted transport whose connectivity and
//! per-record acknowledgments are controlled by the test.

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
    clippy::new_without_default,
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use pulso_core::Certainty;
use pulso_core::DashboardFilters;
use pulso_core::DashboardSummary;
use pulso_core::InformantType;
use pulso_core::InterventionUrgency;
use pulso_core::OriginType;
use pulso_core::RecommendedAction;
use pulso_core::Region;
use pulso_core::RemoteConfig;
use pulso_core::Session;
use pulso_core::SignalCode;
use pulso_core::SignalSet;
use pulso_core::SubmissionQueue;
use pulso_core::SubmissionRecord;
use pulso_core::SurveyResponse;
use pulso_core::SyncMode;
use pulso_core::TensionLevel;
use pulso_core::Timestamp;
use pulso_core::Topic;
use pulso_core::Transport;
use pulso_core::TransportError;
use pulso_core::Trend;
use pulso_core::VenueType;

// ============================================================================
// SECTION: Response Builders
// ============================================================================

/// Returns a logical timestamp for deterministic tests.
pub fn ts(value: u64) -> Timestamp {
    Timestamp::Logical(value)
}

/// Returns a fully answered response that passes validation.
pub fn complete_response() -> SurveyResponse {
    let mut response = SurveyResponse::empty(ts(1));
    response.informant = Some(InformantType::Resident);
    response.region = Some(Region::AltoParana);
    response.district = "Hernandarias".to_string();
    response.community = "Itabo".to_string();
    response.venue = Some(VenueType::Home);
    response.tension = TensionLevel::new(2);
    response.trend = Some(Trend::Unchanged);
    response.certainty = Some(Certainty::Medium);
    response.signals = [SignalCode::Informational].into_iter().collect::<SignalSet>();
    response.urgency = Some(InterventionUrgency::Routine);
    response.topic = Some(Topic::Water);
    response.origin = Some(OriginType::Observed);
    response.action = Some(RecommendedAction::Monitor);
    response
}

/// Returns the session used across queue tests.
pub fn session() -> Session {
    Session {
        token: "tok-1".to_string(),
        can_dashboard: true,
    }
}

// ============================================================================
// SECTION: Scripted Transport
// ============================================================================

/// Transport double with scripted connectivity and acknowledgments.
pub struct ScriptedTransport {
    /// Connectivity flag consulted by the sync pass.
    online: AtomicBool,
    /// Record identifiers whose delivery is rejected.
    fail_ids: Mutex<BTreeSet<String>>,
    /// Log of submitted record identifiers, in attempt order.
    submitted: Mutex<Vec<String>>,
    /// Queue handle used to attempt a reentrant sync from inside submit.
    reentrant_queue: OnceLock<Arc<SubmissionQueue>>,
    /// Set when the reentrant sync attempt was rejected.
    reentrant_rejected: AtomicBool,
}

impl ScriptedTransport {
    /// Creates an online transport that acknowledges everything.
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            fail_ids: Mutex::new(BTreeSet::new()),
            submitted: Mutex::new(Vec::new()),
            reentrant_queue: OnceLock::new(),
            reentrant_rejected: AtomicBool::new(false),
        }
    }

    /// Sets the connectivity flag.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Marks one record identifier as failing delivery.
    pub fn fail_record(&self, id: &str) {
        self.fail_ids.lock().unwrap().insert(id.to_string());
    }

    /// Returns the submitted record identifiers in attempt order.
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    /// Arms a reentrant sync attempt from inside the next submit call.
    pub fn arm_reentrant_sync(&self, queue: Arc<SubmissionQueue>) {
        let _ = self.reentrant_queue.set(queue);
    }

    /// Returns true when the reentrant sync attempt was rejected.
    pub fn reentrant_rejected(&self) -> bool {
        self.reentrant_rejected.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn login(&self, _usuario: &str, _password: &str) -> Result<Session, TransportError> {
        Ok(session())
    }

    fn submit(&self, _token: &str, record: &SubmissionRecord) -> Result<(), TransportError> {
        if let Some(queue) = self.reentrant_queue.get() {
            let rejected = matches!(
                queue.sync(SyncMode::Silent, ts(99)),
                Err(pulso_core::QueueError::SyncInFlight)
            );
            if rejected {
                self.reentrant_rejected.store(true, Ordering::SeqCst);
            }
        }
        self.submitted.lock().unwrap().push(record.record_id.as_str().to_string());
        if self.fail_ids.lock().unwrap().contains(record.record_id.as_str()) {
            return Err(TransportError::Rejected {
                message: "scripted rejection".to_string(),
                permanent: false,
            });
        }
        Ok(())
    }

    fn dashboard_summary(
        &self,
        _token: &str,
        _window_days: u32,
        _filters: &DashboardFilters,
    ) -> Result<DashboardSummary, TransportError> {
        Ok(DashboardSummary {
            semaphore: None,
            kpi: pulso_core::DashboardKpi::default(),
            by_day: std::collections::BTreeMap::new(),
            sample: Vec::new(),
            communities: Vec::new(),
        })
    }

    fn fetch_config(&self) -> Result<RemoteConfig, TransportError> {
        Ok(RemoteConfig(serde_json::json!({"ok": true, "app_title": "Pulso"})))
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
