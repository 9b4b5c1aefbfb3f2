// crates/pulso-store-sqlite/src/lib.rs
// ============================================================================
// Module: Pulso SQLite Store Library
// Description: SQLite-backed durable store for the submission pipeline.
// Purpose: Provide persistent queue and cache namespaces with integrity checks.
// Dependencies: pulso-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Persistent [`pulso_core::DurableStore`] implementation over `SQLite`.
//! Invariants:
//! - Entry writes are atomic; readers never observe a torn entry.
//! - Loads verify stored digests and fail closed on mismatch.
//! - An unopenable database surfaces as storage unavailability.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
