// crates/pulso-transport/src/client.rs
// ============================================================================
// Module: Pulso HTTP Transport
// Description: Blocking HTTP client for the collection endpoint.
// Purpose: Implement the transport contract over the action-dispatch protocol.
// Dependencies: pulso-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`HttpTransport`] implements [`pulso_core::Transport`] with one POST per
//! call against a single configured endpoint. Non-success statuses and
//! malformed bodies fail closed; redirects are rejected. The connectivity
//! probe is a short-timeout GET against the same endpoint; any response,
//! including an error status, counts as connectivity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use pulso_core::DashboardFilters;
use pulso_core::DashboardSummary;
use pulso_core::RemoteConfig;
use pulso_core::Session;
use pulso_core::SubmissionRecord;
use pulso_core::Transport;
use pulso_core::TransportError;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::wire::ConfigRequest;
use crate::wire::DashboardRequest;
use crate::wire::DashboardResponse;
use crate::wire::LoginRequest;
use crate::wire::LoginResponse;
use crate::wire::SubmitRequest;
use crate::wire::SubmitResponse;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default connectivity probe timeout in milliseconds.
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;
/// Content type expected by the endpoint's dispatcher.
const BODY_CONTENT_TYPE: &str = "text/plain";
/// Error-kind label marking a rejection as non-retryable.
const PERMANENT_ERROR_KIND: &str = "permanent";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the HTTP transport.
///
/// # Invariants
/// - `endpoint` must be an absolute `http` or `https` URL.
/// - Timeouts are interpreted as milliseconds.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Collection endpoint URL.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connectivity probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
}

impl HttpTransportConfig {
    /// Creates a configuration with default timeouts.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Blocking HTTP transport for the collection endpoint.
///
/// # Invariants
/// - Requests never follow redirects.
/// - One call maps to exactly one request/response exchange.
pub struct HttpTransport {
    /// Parsed endpoint URL.
    endpoint: Url,
    /// Client used for RPC calls.
    client: Client,
    /// Client with a short timeout used for connectivity probes.
    probe_client: Client,
}

impl HttpTransport {
    /// Builds a transport from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Protocol`] when the endpoint URL is invalid
    /// or the HTTP clients cannot be constructed.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|err| TransportError::Protocol(format!("invalid endpoint url: {err}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TransportError::Protocol(format!(
                "unsupported endpoint scheme: {}",
                endpoint.scheme()
            )));
        }
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| TransportError::Protocol(err.to_string()))?;
        let probe_client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_millis(config.probe_timeout_ms))
            .build()
            .map_err(|err| TransportError::Protocol(err.to_string()))?;
        Ok(Self {
            endpoint,
            client,
            probe_client,
        })
    }

    /// Posts one action request and decodes the response body.
    fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp, TransportError> {
        let body = serde_json::to_vec(request)
            .map_err(|err| TransportError::Protocol(err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, BODY_CONTENT_TYPE)
            .body(body)
            .send()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Network(format!("endpoint returned status {status}")));
        }
        let bytes = response.bytes().map_err(|err| TransportError::Network(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| TransportError::Protocol(err.to_string()))
    }
}

impl Transport for HttpTransport {
    fn login(&self, usuario: &str, password: &str) -> Result<Session, TransportError> {
        let response: LoginResponse = self.call(&LoginRequest {
            action: "login",
            usuario,
            password,
        })?;
        if !response.ok {
            return Err(TransportError::Auth(
                response.error.unwrap_or_else(|| "login rejected".to_string()),
            ));
        }
        response
            .session
            .ok_or_else(|| TransportError::Protocol("login response missing session".to_string()))
    }

    fn submit(&self, token: &str, record: &SubmissionRecord) -> Result<(), TransportError> {
        let response: SubmitResponse = self.call(&SubmitRequest {
            action: "submit",
            token,
            id: record.record_id.as_str(),
            response: &record.response,
            classification: &record.classification,
        })?;
        if !response.ok {
            let permanent =
                response.error_kind.as_deref() == Some(PERMANENT_ERROR_KIND);
            return Err(TransportError::Rejected {
                message: response.error.unwrap_or_else(|| "submission rejected".to_string()),
                permanent,
            });
        }
        Ok(())
    }

    fn dashboard_summary(
        &self,
        token: &str,
        window_days: u32,
        filters: &DashboardFilters,
    ) -> Result<DashboardSummary, TransportError> {
        let response: DashboardResponse = self.call(&DashboardRequest {
            action: "dashboard_summary",
            token,
            window_days,
            informant: filters.informant.as_deref(),
            community: filters.community.as_deref(),
        })?;
        if !response.ok {
            return Err(TransportError::Rejected {
                message: response.error.unwrap_or_else(|| "dashboard query rejected".to_string()),
                permanent: false,
            });
        }
        response.summary.ok_or_else(|| {
            TransportError::Protocol("dashboard response missing summary".to_string())
        })
    }

    fn fetch_config(&self) -> Result<RemoteConfig, TransportError> {
        let value: Value = self.call(&ConfigRequest {
            action: "config",
        })?;
        let ok = value.get("ok").and_then(Value::as_bool).unwrap_or(false);
        if !ok {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("config fetch rejected")
                .to_string();
            return Err(TransportError::Rejected {
                message,
                permanent: false,
            });
        }
        Ok(RemoteConfig(value))
    }

    fn is_online(&self) -> bool {
        self.probe_client.get(self.endpoint.clone()).send().is_ok()
    }
}
