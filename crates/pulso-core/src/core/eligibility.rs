// crates/pulso-core/src/core/eligibility.rs
// ============================================================================
// Module: Pulso Eligibility & Validation Graph
// Description: Conditional required-field computation and response validation.
// Purpose: Gate responses on completeness before classification and persistence.
// Dependencies: serde, thiserror, crate::core::response
// ============================================================================

//! ## Overview
//! The eligibility graph decides which questionnaire fields are currently
//! required. It is a pure function of the selected alert signals and the
//! origin type. There is no hidden state and no event wiring; hosts call it
//! on demand after each answer change. Validation recomputes the required
//! set from the response itself and returns the complete list of violations
//! so a caller can present them all at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::response::InformantType;
use crate::core::response::OriginType;
use crate::core::response::RecommendedAction;
use crate::core::response::RumorChannel;
use crate::core::response::SignalSet;
use crate::core::response::SurveyResponse;
use crate::core::response::Topic;

// ============================================================================
// SECTION: Field Identifiers
// ============================================================================

/// Identifier of a questionnaire field that can be required.
///
/// # Invariants
/// - Variants are stable for serialization and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    /// Informant type code.
    Informant,
    /// Free-text informant type override.
    InformantOther,
    /// Department selection.
    Region,
    /// Venue type code.
    Venue,
    /// Social-tension level.
    Tension,
    /// Perceived trend.
    Trend,
    /// Informant certainty.
    Certainty,
    /// Alert-signal selection.
    Signals,
    /// Repetition probability.
    Repetition,
    /// Intervention urgency.
    Urgency,
    /// Main topic code.
    Topic,
    /// Free-text topic override.
    TopicOther,
    /// Origin type code.
    Origin,
    /// Rumor channel selection.
    RumorChannels,
    /// Free-text rumor channel override.
    RumorChannelsOther,
    /// Recommended action code.
    Action,
    /// Free-text action override.
    ActionOther,
}

impl FieldId {
    /// Returns the stable label for the field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Informant => "informant",
            Self::InformantOther => "informant_other",
            Self::Region => "region",
            Self::Venue => "venue",
            Self::Tension => "tension",
            Self::Trend => "trend",
            Self::Certainty => "certainty",
            Self::Signals => "signals",
            Self::Repetition => "repetition",
            Self::Urgency => "urgency",
            Self::Topic => "topic",
            Self::TopicOther => "topic_other",
            Self::Origin => "origin",
            Self::RumorChannels => "rumor_channels",
            Self::RumorChannelsOther => "rumor_channels_other",
            Self::Action => "action",
            Self::ActionOther => "action_other",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields required on every response regardless of answers.
const STATIC_REQUIRED: [FieldId; 10] = [
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
];

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Single completeness violation on a response.
///
/// # Invariants
/// - Validation returns every violation; the list is never truncated to one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Field that violated the rules.
    pub field: FieldId,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Builds a missing-answer violation for the field.
    #[must_use]
    fn missing(field: FieldId) -> Self {
        Self {
            field,
            message: "answer is required".to_string(),
        }
    }

    /// Builds a missing free-text override violation for the field.
    #[must_use]
    fn missing_other(field: FieldId) -> Self {
        Self {
            field,
            message: "free-text detail is required when \"other\" is selected".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Required Fields
// ============================================================================

/// Computes the required-field set from signals and origin.
///
/// Grievance exclusivity applies first: a grievance selected together with
/// any other signal collapses the set to grievance alone, and both the
/// repetition and urgency questions are hidden. Otherwise a non-empty
/// signal set requires urgency, and repetition is required only when an
/// escalation signal is selected. Rumor channels are required only for
/// rumor-origin responses.
#[must_use]
pub fn required_fields(signals: &SignalSet, origin: Option<OriginType>) -> BTreeSet<FieldId> {
    let mut required: BTreeSet<FieldId> = STATIC_REQUIRED.into_iter().collect();
    let signals = signals.normalized();
    if !signals.is_empty() && !signals.is_grievance_only() {
        required.insert(FieldId::Urgency);
        if signals.has_escalation() {
            required.insert(FieldId::Repetition);
        }
    }
    if origin == Some(OriginType::Rumor) {
        required.insert(FieldId::RumorChannels);
    }
    required
}

/// Computes the full required-field set for a response, including the
/// free-text overrides whose parent answer is the `Other` sentinel.
#[must_use]
pub fn required_fields_for(response: &SurveyResponse) -> BTreeSet<FieldId> {
    let mut required = required_fields(&response.signals, response.origin);
    if response.informant == Some(InformantType::Other) {
        required.insert(FieldId::InformantOther);
    }
    if response.topic == Some(Topic::Other) {
        required.insert(FieldId::TopicOther);
    }
    if response.action == Some(RecommendedAction::Other) {
        required.insert(FieldId::ActionOther);
    }
    if required.contains(&FieldId::RumorChannels)
        && response.rumor_channels.contains(&RumorChannel::Other)
    {
        required.insert(FieldId::RumorChannelsOther);
    }
    required
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a response against its required-field set.
///
/// Never mutates the input; returns the complete list of violations.
#[must_use]
pub fn validate(response: &SurveyResponse) -> Vec<ValidationError> {
    let required = required_fields_for(response);
    let mut errors = Vec::new();
    for field in required {
        if let Some(error) = check_field(response, field) {
            errors.push(error);
        }
    }
    errors
}

/// Checks a single required field for emptiness.
fn check_field(response: &SurveyResponse, field: FieldId) -> Option<ValidationError> {
    let violated = match field {
        FieldId::Informant => response.informant.is_none(),
        FieldId::InformantOther => is_blank(&response.informant_other),
        FieldId::Region => response.region.is_none(),
        FieldId::Venue => response.venue.is_none(),
        FieldId::Tension => response.tension.is_none(),
        FieldId::Trend => response.trend.is_none(),
        FieldId::Certainty => response.certainty.is_none(),
        FieldId::Signals => response.signals.is_empty(),
        FieldId::Repetition => response.repetition.is_none(),
        FieldId::Urgency => response.urgency.is_none(),
        FieldId::Topic => response.topic.is_none(),
        FieldId::TopicOther => is_blank(&response.topic_other),
        FieldId::Origin => response.origin.is_none(),
        FieldId::RumorChannels => response.rumor_channels.is_empty(),
        FieldId::RumorChannelsOther => is_blank(&response.rumor_channels_other),
        FieldId::Action => response.action.is_none(),
        FieldId::ActionOther => is_blank(&response.action_other),
    };
    if !violated {
        return None;
    }
    let error = match field {
        FieldId::InformantOther
        | FieldId::TopicOther
        | FieldId::RumorChannelsOther
        | FieldId::ActionOther => ValidationError::missing_other(field),
        _ => ValidationError::missing(field),
    };
    Some(error)
}

/// Returns true when a free-text answer is missing after trimming.
fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
