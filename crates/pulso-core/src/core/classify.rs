// crates/pulso-core/src/core/classify.rs
// ============================================================================
// Module: Pulso Scoring Engine
// Description: Deterministic semaphore classification of survey responses.
// Purpose: Map a survey response to GREEN/YELLOW/RED with trigger auditing.
// Dependencies: serde, crate::core::response
// ============================================================================

//! ## Overview
//! The scoring engine is a pure function from a survey response to a
//! [`ClassificationResult`]. RED triggers are evaluated first in a fixed
//! order and every firing trigger is recorded; only when none fires is the
//! numeric score computed. A trigger-forced RED carries no score, while a
//! score-derived RED does, and the distinction is preserved all the way to the
//! remote endpoint. Unanswered questions contribute nothing, so the engine
//! is total over partially filled responses and directly unit-testable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::response::Certainty;
use crate::core::response::InterventionUrgency;
use crate::core::response::RepetitionProbability;
use crate::core::response::SurveyResponse;
use crate::core::response::TensionLevel;
use crate::core::response::Trend;

// ============================================================================
// SECTION: Classification Types
// ============================================================================

/// Three-level alert color.
///
/// # Invariants
/// - Variants are stable for serialization and dashboard rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semaphore {
    /// No elevated alert.
    Green,
    /// Elevated attention required.
    Yellow,
    /// Alert condition.
    Red,
}

impl Semaphore {
    /// Returns the display label for the color.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

/// Rule that forces a RED classification regardless of the numeric score.
///
/// # Invariants
/// - Variants are recorded in evaluation order; the order is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedTrigger {
    /// An escalation signal (cut-off, protest, contractor complaint) is selected.
    SignalBased,
    /// Intervention urgency is "urgent today".
    Urgency,
    /// High repetition probability combined with tension >= 4.
    Compound,
}

impl RedTrigger {
    /// Returns the stable description used in reports.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SignalBased => "signal-based red",
            Self::Urgency => "urgency red",
            Self::Compound => "compound red",
        }
    }
}

/// Result of classifying a survey response.
///
/// # Invariants
/// - A trigger-forced RED has `score = None` and a non-empty trigger list.
/// - A non-RED result has an empty trigger list and a populated score.
/// - A score-derived RED (score >= 8) has a populated score and no triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Alert color.
    pub semaphore: Semaphore,
    /// Numeric score when derived by scoring; absent for trigger-forced RED.
    pub score: Option<u8>,
    /// Triggers that fired, in evaluation order; empty unless trigger-forced RED.
    pub triggers: Vec<RedTrigger>,
    /// Reliability coefficient derived from the certainty code.
    pub reliability: f64,
}

// ============================================================================
// SECTION: Score Thresholds
// ============================================================================

/// Highest score still classified GREEN.
const GREEN_MAX_SCORE: u8 = 3;
/// Highest score still classified YELLOW.
const YELLOW_MAX_SCORE: u8 = 7;
/// Maximum number of scored signals counted.
const SCORED_SIGNAL_CAP: usize = 3;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies a survey response into a semaphore result.
///
/// The function is pure and side-effect-free: it reads only the response
/// value and never consults wall-clock time or external state.
#[must_use]
pub fn classify(response: &SurveyResponse) -> ClassificationResult {
    let reliability = response.certainty.map_or(0.0, Certainty::reliability_coefficient);

    let triggers = fired_triggers(response);
    if !triggers.is_empty() {
        return ClassificationResult {
            semaphore: Semaphore::Red,
            score: None,
            triggers,
            reliability,
        };
    }

    let score = numeric_score(response);
    let semaphore = if score <= GREEN_MAX_SCORE {
        Semaphore::Green
    } else if score <= YELLOW_MAX_SCORE {
        Semaphore::Yellow
    } else {
        Semaphore::Red
    };
    ClassificationResult {
        semaphore,
        score: Some(score),
        triggers: Vec::new(),
        reliability,
    }
}

/// Evaluates the RED triggers in their fixed order.
fn fired_triggers(response: &SurveyResponse) -> Vec<RedTrigger> {
    let mut triggers = Vec::new();
    if response.signals.has_escalation() {
        triggers.push(RedTrigger::SignalBased);
    }
    if response.urgency == Some(InterventionUrgency::UrgentToday) {
        triggers.push(RedTrigger::Urgency);
    }
    let tension = response.tension.map_or(0, TensionLevel::get);
    if response.repetition == Some(RepetitionProbability::High) && tension >= 4 {
        triggers.push(RedTrigger::Compound);
    }
    triggers
}

/// Computes the numeric score for a response without fired triggers.
fn numeric_score(response: &SurveyResponse) -> u8 {
    let tension = response.tension.map_or(0, TensionLevel::get);
    let tension_points = tension.saturating_sub(1);
    let trend_points = response.trend.map_or(0, Trend::score_contribution);
    let signal_points =
        u8::try_from(response.signals.scored_count().min(SCORED_SIGNAL_CAP)).unwrap_or(0);
    tension_points + trend_points + signal_points
}
