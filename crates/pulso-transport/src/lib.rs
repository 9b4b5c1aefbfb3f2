// crates/pulso-transport/src/lib.rs
// ============================================================================
// Module: Pulso Transport Library
// Description: HTTP transport to the remote collection endpoint.
// Purpose: Deliver records and queries over the action-dispatch protocol.
// Dependencies: pulso-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! HTTP implementation of [`pulso_core::Transport`].
//! Invariants:
//! - One call maps to one request/response exchange; no implicit retry.
//! - Non-success statuses and malformed bodies fail closed.
//! - Submit requests carry the record identifier so the endpoint can
//!   deduplicate at-least-once deliveries.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod client;
mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::HttpTransport;
pub use client::HttpTransportConfig;
