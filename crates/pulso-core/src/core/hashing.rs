// crates/pulso-core/src/core/hashing.rs
// ============================================================================
// Module: Pulso Hashing
// Description: Canonical JSON serialization and digest helpers.
// Purpose: Produce stable hashes for durable store integrity checks.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Durable store entries are persisted as canonical JSON (RFC 8785) together
//! with a digest of those bytes. Loads recompute the digest and fail closed
//! on mismatch, so a torn or tampered row is surfaced as corruption instead
//! of being deserialized into a half-valid record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Digest algorithm used for store integrity hashes.
///
/// # Invariants
/// - Labels are stable wire and storage identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

/// Default digest algorithm for new store entries.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

impl HashAlgorithm {
    /// Returns the stable storage label for the algorithm.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Parses a storage label back into an algorithm.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

/// Digest value paired with the algorithm that produced it.
///
/// # Invariants
/// - `value` is lowercase hex of the digest bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced the digest.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest value.
    pub value: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Canonicalization errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HashError {
    /// Value could not be canonicalized to JSON.
    #[error("canonical json failure: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serializes a value to canonical JSON bytes (RFC 8785).
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes raw bytes with the provided algorithm.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let digest = Sha256::digest(bytes);
            let mut value = String::with_capacity(digest.len() * 2);
            for byte in digest {
                value.push_str(&format!("{byte:02x}"));
            }
            HashDigest {
                algorithm,
                value,
            }
        }
    }
}
