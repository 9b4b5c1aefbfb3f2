// crates/pulso-core/tests/eligibility_rules.rs
// ============================================================================
// Module: Eligibility Graph Tests
// Description: Conditional required-field rules and full-list validation.
// Purpose: Pin the pure eligibility and validation contract.
// Dependencies: pulso-core, proptest
// ============================================================================

//! ## Overview
//! Exercises the eligibility graph as a pure function: grievance
//! exclusivity, the urgency/repetition conditionals, rumor elaboration,
//! free-text overrides, and the complete (never truncated) violation list.

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

mod common;

use proptest::prelude::*;
use pulso_core::FieldId;
use pulso_core::InformantType;
use pulso_core::OriginType;
use pulso_core::RecommendedAction;
use pulso_core::RumorChannel;
use pulso_core::SignalCode;
use pulso_core::SignalSet;
use pulso_core::SurveyResponse;
use pulso_core::Timestamp;
use pulso_core::Topic;
use pulso_core::required_fields;
use pulso_core::required_fields_for;
use pulso_core::validate;

use crate::common::complete_response;

// ============================================================================
// SECTION: Conditional Rules
// ============================================================================

#[test]
fn empty_signal_set_hides_both_conditionals() {
    let required = required_fields(&SignalSet::new(), Some(OriginType::Observed));
    assert!(!required.contains(&FieldId::Urgency));
    assert!(!required.contains(&FieldId::Repetition));
}

#[test]
fn grievance_with_others_collapses_and_hides_conditionals() {
    let signals = [SignalCode::Grievance, SignalCode::SupplyCutoff, SignalCode::Advisory]
        .into_iter()
        .collect::<SignalSet>();
    let required = required_fields(&signals, Some(OriginType::Observed));
    assert!(!required.contains(&FieldId::Urgency));
    assert!(!required.contains(&FieldId::Repetition));
    let normalized = signals.normalized();
    assert!(normalized.is_grievance_only());
}

#[test]
fn grievance_alone_hides_both_conditionals() {
    let signals = [SignalCode::Grievance].into_iter().collect::<SignalSet>();
    let required = required_fields(&signals, Some(OriginType::Observed));
    assert!(!required.contains(&FieldId::Urgency));
    assert!(!required.contains(&FieldId::Repetition));
}

#[test]
fn soft_signals_require_urgency_but_not_repetition() {
    let signals = [SignalCode::Advisory, SignalCode::Informational]
        .into_iter()
        .collect::<SignalSet>();
    let required = required_fields(&signals, Some(OriginType::Observed));
    assert!(required.contains(&FieldId::Urgency));
    assert!(!required.contains(&FieldId::Repetition));
}

#[test]
fn escalation_signals_require_both_conditionals() {
    for signal in
        [SignalCode::SupplyCutoff, SignalCode::Protest, SignalCode::ContractorComplaint]
    {
        let signals = [signal].into_iter().collect::<SignalSet>();
        let required = required_fields(&signals, Some(OriginType::Observed));
        assert!(required.contains(&FieldId::Urgency));
        assert!(required.contains(&FieldId::Repetition));
    }
}

#[test]
fn rumor_origin_requires_elaboration() {
    let required = required_fields(&SignalSet::new(), Some(OriginType::Rumor));
    assert!(required.contains(&FieldId::RumorChannels));
    let required = required_fields(&SignalSet::new(), Some(OriginType::Firsthand));
    assert!(!required.contains(&FieldId::RumorChannels));
}

// ============================================================================
// SECTION: Free-Text Overrides
// ============================================================================

#[test]
fn other_sentinels_require_their_overrides() {
    let mut response = complete_response();
    response.informant = Some(InformantType::Other);
    response.topic = Some(Topic::Other);
    response.action = Some(RecommendedAction::Other);
    let required = required_fields_for(&response);
    assert!(required.contains(&FieldId::InformantOther));
    assert!(required.contains(&FieldId::TopicOther));
    assert!(required.contains(&FieldId::ActionOther));

    let errors = validate(&response);
    let fields: Vec<FieldId> = errors.iter().map(|error| error.field).collect();
    assert!(fields.contains(&FieldId::InformantOther));
    assert!(fields.contains(&FieldId::TopicOther));
    assert!(fields.contains(&FieldId::ActionOther));
}

#[test]
fn filled_overrides_satisfy_validation() {
    let mut response = complete_response();
    response.informant = Some(InformantType::Other);
    response.informant_other = "visiting engineer".to_string();
    assert!(validate(&response).is_empty());
}

#[test]
fn rumor_other_channel_requires_free_text() {
    let mut response = complete_response();
    response.origin = Some(OriginType::Rumor);
    response.rumor_channels = [RumorChannel::Other].into_iter().collect();
    let errors = validate(&response);
    assert!(errors.iter().any(|error| error.field == FieldId::RumorChannelsOther));

    response.rumor_channels_other = "church bulletin".to_string();
    assert!(validate(&response).is_empty());
}

// ============================================================================
// SECTION: Validation Completeness
// ============================================================================

#[test]
fn complete_response_validates_cleanly() {
    assert!(validate(&complete_response()).is_empty());
}

#[test]
fn empty_response_reports_every_static_field() {
    let response = SurveyResponse::empty(Timestamp::Logical(1));
    let errors = validate(&response);
    let fields: Vec<FieldId> = errors.iter().map(|error| error.field).collect();
    for field in [
        FieldId::Informant,
        FieldId::Region,
        FieldId::Venue,
        FieldId::Tension,
        FieldId::Trend,
        FieldId::Certainty,
        FieldId::Signals,
        FieldId::Topic,
        FieldId::Origin,
        FieldId::Action,
    ] {
        assert!(fields.contains(&field), "missing violation for {field}");
    }
    assert_eq!(errors.len(), 10);
}

#[test]
fn whitespace_only_override_is_still_missing() {
    let mut response = complete_response();
    response.informant = Some(InformantType::Other);
    response.informant_other = "   ".to_string();
    let errors = validate(&response);
    assert!(errors.iter().any(|error| error.field == FieldId::InformantOther));
}

// ============================================================================
// SECTION: Properties
// ============================================================================

/// Strategy over non-grievance signal codes.
fn non_grievance_signal() -> impl Strategy<Value = SignalCode> {
    prop_oneof![
        Just(SignalCode::SupplyCutoff),
        Just(SignalCode::Advisory),
        Just(SignalCode::Protest),
        Just(SignalCode::ContractorComplaint),
        Just(SignalCode::MinorIncident),
        Just(SignalCode::Informational),
    ]
}

/// Strategy over origin types.
fn any_origin() -> impl Strategy<Value = OriginType> {
    prop_oneof![
        Just(OriginType::Observed),
        Just(OriginType::Firsthand),
        Just(OriginType::Rumor),
        Just(OriginType::MediaReport),
    ]
}

proptest! {
    #[test]
    fn conditionals_follow_the_signal_set(
        signals in prop::collection::btree_set(non_grievance_signal(), 0 .. 6),
        origin in any_origin(),
    ) {
        let set: SignalSet = signals.iter().copied().collect();
        let required = required_fields(&set, Some(origin));
        let expects_urgency = !set.is_empty();
        let expects_repetition = signals.iter().any(|signal| signal.escalates());
        assert_eq!(required.contains(&FieldId::Urgency), expects_urgency);
        assert_eq!(required.contains(&FieldId::Repetition), expects_repetition);
        assert_eq!(required.contains(&FieldId::RumorChannels), origin == OriginType::Rumor);
    }
}
