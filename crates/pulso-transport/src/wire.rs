// crates/pulso-transport/src/wire.rs
// ============================================================================
// Module: Pulso Wire Contract
// Description: Request and response shapes for the collection endpoint.
// Purpose: Encode the action-dispatch protocol consumed by the transport.
// Dependencies: pulso-core, serde
// ============================================================================

//! ## Overview
//! The collection endpoint exposes a single URL that dispatches on an
//! `action` field in the JSON request body and answers with an `{ok, ...}`
//! envelope. These shapes are the complete wire contract; everything else in
//! the transport is connection plumbing. An explicit `error_kind` of
//! `permanent` in a submit response marks the rejection as non-retryable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use pulso_core::ClassificationResult;
use pulso_core::DashboardSummary;
use pulso_core::Session;
use pulso_core::SurveyResponse;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Login request body.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    /// Dispatch action, always `login`.
    pub action: &'static str,
    /// Account name.
    pub usuario: &'a str,
    /// Account password.
    pub password: &'a str,
}

/// Submit request body.
///
/// # Invariants
/// - `id` is the record identifier; the endpoint deduplicates by it.
#[derive(Debug, Serialize)]
pub(crate) struct SubmitRequest<'a> {
    /// Dispatch action, always `submit`.
    pub action: &'static str,
    /// Session credential token.
    pub token: &'a str,
    /// Record identifier and idempotency key.
    pub id: &'a str,
    /// Frozen survey response.
    pub response: &'a SurveyResponse,
    /// Classification computed at freeze time.
    pub classification: &'a ClassificationResult,
}

/// Dashboard summary request body.
#[derive(Debug, Serialize)]
pub(crate) struct DashboardRequest<'a> {
    /// Dispatch action, always `dashboard_summary`.
    pub action: &'static str,
    /// Session credential token.
    pub token: &'a str,
    /// Aggregation window in days.
    pub window_days: u32,
    /// Optional informant type filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informant: Option<&'a str>,
    /// Optional community filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<&'a str>,
}

/// Remote configuration request body.
#[derive(Debug, Serialize)]
pub(crate) struct ConfigRequest {
    /// Dispatch action, always `config`.
    pub action: &'static str,
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Login response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    /// Whether the login was accepted.
    pub ok: bool,
    /// Rejection reason when not ok.
    #[serde(default)]
    pub error: Option<String>,
    /// Issued session when ok.
    #[serde(default)]
    pub session: Option<Session>,
}

/// Submit response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    /// Whether the record was accepted (or already accepted).
    pub ok: bool,
    /// Rejection reason when not ok.
    #[serde(default)]
    pub error: Option<String>,
    /// Rejection class; `permanent` marks the rejection non-retryable.
    #[serde(default)]
    pub error_kind: Option<String>,
}

/// Dashboard summary response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct DashboardResponse {
    /// Whether the query was accepted.
    pub ok: bool,
    /// Rejection reason when not ok.
    #[serde(default)]
    pub error: Option<String>,
    /// Summary payload when ok.
    #[serde(default)]
    pub summary: Option<DashboardSummary>,
}
