// crates/pulso-core/src/runtime/mod.rs
// ============================================================================
// Module: Pulso Runtime
// Description: Stateful orchestrators over the core model and interfaces.
// Purpose: Group the submission queue, session manager, and telemetry.
// Dependencies: crate submodules
// ============================================================================

//! ## Overview
//! Runtime components own trait-object handles to the durable store and the
//! transport and orchestrate the pipeline: freeze responses into records,
//! drain the queue in serialized passes, and keep the session durable.
//! There are no ambient globals; hosts construct and wire these explicitly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod queue;
pub mod session;
pub mod telemetry;
