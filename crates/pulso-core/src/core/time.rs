// crates/pulso-core/src/core/time.rs
// ============================================================================
// Module: Pulso Time Model
// Description: Canonical timestamp representations for captures and records.
// Purpose: Provide deterministic, replayable time values across Pulso records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Pulso embeds explicit time values in captured responses and submission
//! records so that classification and sync behavior stay deterministic and
//! replayable. The core engine never reads wall-clock time directly; hosts
//! must supply timestamps at the capture and persistence boundaries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Pulso records and sync telemetry.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Timestamp parsing errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TimeParseError {
    /// Input was not a valid RFC 3339 timestamp.
    #[error("invalid rfc3339 timestamp: {0}")]
    InvalidRfc3339(String),
}

/// Parses an RFC 3339 string into a unix-millis timestamp.
///
/// # Errors
///
/// Returns [`TimeParseError::InvalidRfc3339`] when the input does not parse.
pub fn parse_rfc3339(input: &str) -> Result<Timestamp, TimeParseError> {
    let parsed = OffsetDateTime::parse(input, &Rfc3339)
        .map_err(|err| TimeParseError::InvalidRfc3339(err.to_string()))?;
    let millis = parsed.unix_timestamp_nanos() / 1_000_000;
    let millis =
        i64::try_from(millis).map_err(|_| TimeParseError::InvalidRfc3339(input.to_string()))?;
    Ok(Timestamp::UnixMillis(millis))
}

/// Formats a unix-millis timestamp as an RFC 3339 string.
///
/// Logical timestamps have no calendar form and render as `logical:<n>`.
#[must_use]
pub fn format_timestamp(timestamp: Timestamp) -> String {
    match timestamp {
        Timestamp::UnixMillis(millis) => {
            let nanos = i128::from(millis) * 1_000_000;
            OffsetDateTime::from_unix_timestamp_nanos(nanos)
                .ok()
                .and_then(|value| value.format(&Rfc3339).ok())
                .unwrap_or_else(|| format!("unix_millis:{millis}"))
        }
        Timestamp::Logical(value) => format!("logical:{value}"),
    }
}
