// crates/pulso-core/src/core/identifiers.rs
// ============================================================================
// Module: Pulso Identifiers
// Description: Canonical opaque identifiers for submission records.
// Purpose: Provide strongly typed identifiers that double as idempotency keys.
// Dependencies: serde, rand
// ============================================================================

//! ## Overview
//! This module defines the record identifier used throughout Pulso. A record
//! identifier is assigned exactly once when a response is frozen into a
//! submission record and is never regenerated on retry: the remote endpoint
//! deduplicates deliveries by this value, which is what makes the
//! at-least-once sync protocol safe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Record Identifier
// ============================================================================

/// Submission record identifier and idempotency key.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
/// - Assigned exactly once at record creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new record identifier from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Identifier Generator
// ============================================================================

/// Boot-scoped record identifier generator.
///
/// # Invariants
/// - Issued identifiers are unique within the process lifetime.
/// - Uniqueness across devices follows from the 64-bit boot seed entropy.
#[derive(Debug)]
pub struct RecordIdGenerator {
    /// Boot-scoped random identifier for entropy.
    boot_id: u64,
    /// Monotonic counter for identifiers issued in this process.
    counter: AtomicU64,
}

impl RecordIdGenerator {
    /// Creates a new generator seeded from the operating system RNG.
    #[must_use]
    pub fn new() -> Self {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        Self {
            boot_id: u64::from_be_bytes(bytes),
            counter: AtomicU64::new(1),
        }
    }

    /// Issues a fresh record identifier.
    #[must_use]
    pub fn issue(&self) -> RecordId {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        RecordId(format!("rec-{:016x}-{:08x}", self.boot_id, seq))
    }
}

impl Default for RecordIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
