// crates/pulso-transport/tests/http_transport.rs
// ============================================================================
// Module: HTTP Transport Tests
// Description: Wire contract and failure classification against a local server.
// Purpose: Pin the action-dispatch protocol and fail-closed behavior.
// Dependencies: pulso-core, pulso-transport, serde_json, tiny_http
// ============================================================================

//! ## Overview
//! Runs the transport against a `tiny_http` server: request bodies carry the
//! dispatch action and idempotency key, `{ok: false}` envelopes map to the
//! right error classes, non-success statuses and malformed bodies fail
//! closed, and the connectivity probe reports offline for a dead endpoint.

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

use std::sync::mpsc;
use std::thread;

use pulso_core::Certainty;
use pulso_core::DashboardFilters;
use pulso_core::InformantType;
use pulso_core::InterventionUrgency;
use pulso_core::OriginType;
use pulso_core::RecommendedAction;
use pulso_core::RecordId;
use pulso_core::RecordStatus;
use pulso_core::Region;
use pulso_core::SignalCode;
use pulso_core::SignalSet;
use pulso_core::SubmissionRecord;
use pulso_core::SurveyResponse;
use pulso_core::TensionLevel;
use pulso_core::Timestamp;
use pulso_core::Topic;
use pulso_core::Transport;
use pulso_core::TransportError;
use pulso_core::Trend;
use pulso_core::VenueType;
use pulso_core::classify;
use pulso_transport::HttpTransport;
use pulso_transport::HttpTransportConfig;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Captured request seen by the scripted server.
struct SeenRequest {
    /// Request body bytes.
    body: String,
    /// Content type header value.
    content_type: Option<String>,
}

/// Spawns a server that answers one request with the given body and status.
fn one_shot_server(status: u16, body: &'static str) -> (String, mpsc::Receiver<SeenRequest>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let endpoint = format!("http://{addr}");
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut seen_body = String::new();
            let _ = request.as_reader().read_to_string(&mut seen_body);
            let content_type = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Content-Type"))
                .map(|header| header.value.as_str().to_string());
            let _ = sender.send(SeenRequest {
                body: seen_body,
                content_type,
            });
            let header: Header = "Content-Type: application/json".parse().unwrap();
            let response = Response::from_string(body).with_status_code(status).with_header(header);
            let _ = request.respond(response);
        }
    });
    (endpoint, receiver)
}

/// Builds a transport pointed at the given endpoint.
fn transport_for(endpoint: &str) -> HttpTransport {
    HttpTransport::new(&HttpTransportConfig {
        endpoint: endpoint.to_string(),
        timeout_ms: 5_000,
        probe_timeout_ms: 1_000,
    })
    .unwrap()
}

/// Builds a valid submission record for submit tests.
fn sample_record() -> SubmissionRecord {
    let mut response = SurveyResponse::empty(Timestamp::UnixMillis(1_700_000_000_000));
    response.informant = Some(InformantType::CommunityLeader);
    response.region = Some(Region::Canindeyu);
    response.district = "Salto del Guaira".to_string();
    response.community = "Paso Ita".to_string();
    response.venue = Some(VenueType::CommunityMeeting);
    response.tension = TensionLevel::new(2);
    response.trend = Some(Trend::Improved);
    response.certainty = Some(Certainty::High);
    response.signals = [SignalCode::Informational].into_iter().collect::<SignalSet>();
    response.urgency = Some(InterventionUrgency::Routine);
    response.topic = Some(Topic::Water);
    response.origin = Some(OriginType::Observed);
    response.action = Some(RecommendedAction::Monitor);
    let classification = classify(&response);
    SubmissionRecord {
        record_id: RecordId::new("rec-wire-1"),
        created_at: Timestamp::UnixMillis(1_700_000_000_000),
        status: RecordStatus::Pending,
        token: "tok-1".to_string(),
        response,
        classification,
    }
}

// ============================================================================
// SECTION: Login
// ============================================================================

#[test]
fn login_decodes_the_issued_session() {
    let (endpoint, seen) = one_shot_server(
        200,
        r#"{"ok": true, "session": {"token": "tok-9", "can_dashboard": true}}"#,
    );
    let transport = transport_for(&endpoint);
    let session = transport.login("maria", "secret").unwrap();
    assert_eq!(session.token, "tok-9");
    assert!(session.can_dashboard);

    let request = seen.recv().unwrap();
    assert_eq!(request.content_type.as_deref(), Some("text/plain"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["action"], "login");
    assert_eq!(body["usuario"], "maria");
    assert_eq!(body["password"], "secret");
}

#[test]
fn rejected_login_maps_to_auth_error() {
    let (endpoint, _seen) = one_shot_server(200, r#"{"ok": false, "error": "bad credentials"}"#);
    let transport = transport_for(&endpoint);
    let error = transport.login("maria", "wrong").unwrap_err();
    assert!(matches!(error, TransportError::Auth(message) if message == "bad credentials"));
}

// ============================================================================
// SECTION: Submit
// ============================================================================

#[test]
fn submit_sends_the_idempotency_key_on_the_wire() {
    let (endpoint, seen) = one_shot_server(200, r#"{"ok": true}"#);
    let transport = transport_for(&endpoint);
    let record = sample_record();
    transport.submit("tok-1", &record).unwrap();

    let request = seen.recv().unwrap();
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["action"], "submit");
    assert_eq!(body["token"], "tok-1");
    assert_eq!(body["id"], "rec-wire-1");
    assert_eq!(body["classification"]["semaphore"], "green");
    assert_eq!(body["response"]["region"], "canindeyu");
}

#[test]
fn negative_acknowledgment_is_retryable_by_default() {
    let (endpoint, _seen) = one_shot_server(200, r#"{"ok": false, "error": "try later"}"#);
    let transport = transport_for(&endpoint);
    let error = transport.submit("tok-1", &sample_record()).unwrap_err();
    assert!(error.is_retryable());
    assert!(matches!(error, TransportError::Rejected { permanent: false, .. }));
}

#[test]
fn explicit_permanent_rejection_is_not_retryable() {
    let (endpoint, _seen) = one_shot_server(
        200,
        r#"{"ok": false, "error": "schema retired", "error_kind": "permanent"}"#,
    );
    let transport = transport_for(&endpoint);
    let error = transport.submit("tok-1", &sample_record()).unwrap_err();
    assert!(!error.is_retryable());
    assert!(matches!(error, TransportError::Rejected { permanent: true, .. }));
}

#[test]
fn non_success_status_fails_closed_as_network_error() {
    let (endpoint, _seen) = one_shot_server(503, r#"{"ok": true}"#);
    let transport = transport_for(&endpoint);
    let error = transport.submit("tok-1", &sample_record()).unwrap_err();
    assert!(matches!(error, TransportError::Network(_)));
}

#[test]
fn malformed_body_fails_closed_as_protocol_error() {
    let (endpoint, _seen) = one_shot_server(200, "this is not json");
    let transport = transport_for(&endpoint);
    let error = transport.submit("tok-1", &sample_record()).unwrap_err();
    assert!(matches!(error, TransportError::Protocol(_)));
}

// ============================================================================
// SECTION: Dashboard & Config
// ============================================================================

#[test]
fn dashboard_summary_decodes_and_forwards_filters() {
    let (endpoint, seen) = one_shot_server(
        200,
        r#"{"ok": true, "summary": {"kpi": {"responses": 12, "surveys": 4, "informants": 3,
            "avg_score": 2.5}, "by_day": {"2026-08-01": 2.0}, "sample": [], "communities":
            ["Paso Ita"]}}"#,
    );
    let transport = transport_for(&endpoint);
    let filters = DashboardFilters {
        informant: Some("resident".to_string()),
        community: None,
    };
    let summary = transport.dashboard_summary("tok-1", 30, &filters).unwrap();
    assert_eq!(summary.kpi.responses, 12);
    assert_eq!(summary.communities, vec!["Paso Ita".to_string()]);

    let request = seen.recv().unwrap();
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["action"], "dashboard_summary");
    assert_eq!(body["window_days"], 30);
    assert_eq!(body["informant"], "resident");
    assert!(body.get("community").is_none());
}

#[test]
fn remote_config_round_trips_verbatim() {
    let (endpoint, _seen) = one_shot_server(200, r#"{"ok": true, "app_title": "Pulso"}"#);
    let transport = transport_for(&endpoint);
    let config = transport.fetch_config().unwrap();
    assert_eq!(config.0["app_title"], "Pulso");
}

// ============================================================================
// SECTION: Connectivity
// ============================================================================

#[test]
fn probe_reports_online_against_a_live_server() {
    let (endpoint, _seen) = one_shot_server(404, "not found");
    let transport = transport_for(&endpoint);
    assert!(transport.is_online());
}

#[test]
fn probe_reports_offline_against_a_dead_endpoint() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let endpoint = format!("http://{addr}");
    drop(server);
    let transport = transport_for(&endpoint);
    assert!(!transport.is_online());
}
