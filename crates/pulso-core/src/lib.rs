// crates/pulso-core/src/lib.rs
// ============================================================================
// Module: Pulso Core Library
// Description: Offline-durable survey submission pipeline.
// Purpose: Validate, classify, queue, and sync field-collected responses.
// Dependencies: serde, serde_json, serde_jcs, sha2, thiserror, rand, time
// ============================================================================

//! ## Overview
//! Pulso Core implements the offline-durable submission pipeline: a pure
//! eligibility and validation graph over the questionnaire, a deterministic
//! GREEN/YELLOW/RED scoring engine, and a queue-and-sync protocol that
//! reconciles locally captured records with the remote endpoint under an
//! idempotent at-least-once delivery model.
//! Invariants:
//! - A record identifier is assigned exactly once and never regenerated.
//! - A record leaves the store if and only if delivery was acknowledged.
//! - At most one sync pass runs at a time; records are attempted
//!   sequentially in the store's stable listing order.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod memory;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::classify::ClassificationResult;
pub use crate::core::classify::RedTrigger;
pub use crate::core::classify::Semaphore;
pub use crate::core::classify::classify;
pub use crate::core::eligibility::FieldId;
pub use crate::core::eligibility::ValidationError;
pub use crate::core::eligibility::required_fields;
pub use crate::core::eligibility::required_fields_for;
pub use crate::core::eligibility::validate;
pub use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
pub use crate::core::hashing::HashAlgorithm;
pub use crate::core::hashing::HashDigest;
pub use crate::core::hashing::canonical_json_bytes;
pub use crate::core::hashing::hash_bytes;
pub use crate::core::identifiers::RecordId;
pub use crate::core::identifiers::RecordIdGenerator;
pub use crate::core::record::CACHE_KEY_CONFIG;
pub use crate::core::record::CACHE_KEY_SESSION;
pub use crate::core::record::CacheEntry;
pub use crate::core::record::RecordStatus;
pub use crate::core::record::Session;
pub use crate::core::record::SubmissionRecord;
pub use crate::core::response::Certainty;
pub use crate::core::response::GpsFix;
pub use crate::core::response::InformantType;
pub use crate::core::response::InterventionUrgency;
pub use crate::core::response::OriginType;
pub use crate::core::response::PhotoAttachment;
pub use crate::core::response::RecommendedAction;
pub use crate::core::response::Region;
pub use crate::core::response::RepetitionProbability;
pub use crate::core::response::RumorChannel;
pub use crate::core::response::SignalCode;
pub use crate::core::response::SignalSet;
pub use crate::core::response::SurveyResponse;
pub use crate::core::response::TensionLevel;
pub use crate::core::response::Topic;
pub use crate::core::response::Trend;
pub use crate::core::response::VenueType;
pub use crate::core::time::Timestamp;
pub use crate::core::time::format_timestamp;
pub use crate::core::time::parse_rfc3339;
pub use crate::interfaces::DashboardFilters;
pub use crate::interfaces::DashboardKpi;
pub use crate::interfaces::DashboardRow;
pub use crate::interfaces::DashboardSemaphore;
pub use crate::interfaces::DashboardSummary;
pub use crate::interfaces::DurableStore;
pub use crate::interfaces::RemoteConfig;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::Transport;
pub use crate::interfaces::TransportError;
pub use crate::memory::MemoryStore;
pub use crate::runtime::queue::QueueError;
pub use crate::runtime::queue::SubmissionQueue;
pub use crate::runtime::queue::SyncMode;
pub use crate::runtime::queue::SyncOutcome;
pub use crate::runtime::queue::SyncReport;
pub use crate::runtime::session::LoginOutcome;
pub use crate::runtime::session::SessionError;
pub use crate::runtime::session::SessionManager;
pub use crate::runtime::telemetry::SyncTelemetry;
pub use crate::runtime::telemetry::SyncTelemetrySnapshot;
