// crates/pulso-core/src/core/response.rs
// ============================================================================
// Module: Pulso Survey Response Model
// Description: Questionnaire codes and the transient survey response value.
// Purpose: Represent a field-collected response before it is frozen into a record.
// Dependencies: serde, base64, crate::core::time
// ============================================================================

//! ## Overview
//! A [`SurveyResponse`] is collected transiently from user input: enumerated
//! answers are optional until validation confirms completeness, free-text
//! answers are empty strings until filled, and the response is frozen into a
//! durable submission record only after it passes the eligibility graph.
//! Enumerated codes carry stable snake_case wire labels.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde::Serialize;

use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Informant & Location Codes
// ============================================================================

/// Informant type reported by the surveyor.
///
/// # Invariants
/// - `Other` requires the free-text override on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InformantType {
    /// Recognized community leader.
    CommunityLeader,
    /// Resident of the surveyed community.
    Resident,
    /// Local government authority.
    LocalAuthority,
    /// Health worker serving the community.
    HealthWorker,
    /// Local merchant or vendor.
    Merchant,
    /// School teacher.
    Teacher,
    /// Free-text informant type.
    Other,
}

/// Department of the project's operating area.
///
/// # Invariants
/// - Variants are stable for serialization and dashboard filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Alto Paraná department.
    AltoParana,
    /// Canindeyú department.
    Canindeyu,
    /// Caaguazú department.
    Caaguazu,
    /// Itapúa department.
    Itapua,
    /// Guairá department.
    Guaira,
    /// Caazapá department.
    Caazapa,
}

/// Venue where the conversation took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueType {
    /// Informant's home.
    Home,
    /// Market or commercial area.
    Market,
    /// Organized community meeting.
    CommunityMeeting,
    /// Plaza, street, or other public space.
    PublicSpace,
    /// Project or contractor worksite.
    Worksite,
    /// Roadside encounter.
    Roadside,
}

// ============================================================================
// SECTION: Tension, Trend & Certainty
// ============================================================================

/// Ordinal social-tension level.
///
/// # Invariants
/// - Always within 1..=5; construction and deserialization reject other values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TensionLevel(u8);

impl TensionLevel {
    /// Creates a tension level, rejecting values outside 1..=5.
    #[must_use]
    pub const fn new(level: u8) -> Option<Self> {
        if matches!(level, 1 ..= 5) {
            Some(Self(level))
        } else {
            None
        }
    }

    /// Returns the raw ordinal value (always within 1..=5).
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TensionLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("tension level out of range 1..=5: {value}"))
    }
}

impl From<TensionLevel> for u8 {
    fn from(value: TensionLevel) -> Self {
        value.get()
    }
}

/// Perceived trend relative to the previous weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Conditions improved.
    Improved,
    /// Conditions unchanged.
    Unchanged,
    /// Conditions worsened.
    Worsened,
}

impl Trend {
    /// Returns the trend's contribution to the numeric score.
    #[must_use]
    pub const fn score_contribution(self) -> u8 {
        match self {
            Self::Improved => 0,
            Self::Unchanged => 1,
            Self::Worsened => 2,
        }
    }
}

/// Informant certainty about the reported conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Certainty {
    /// Low certainty.
    Low,
    /// Medium certainty.
    Medium,
    /// High certainty.
    High,
}

impl Certainty {
    /// Returns the reliability coefficient for the certainty code.
    #[must_use]
    pub const fn reliability_coefficient(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.8,
            Self::Low => 0.6,
        }
    }
}

// ============================================================================
// SECTION: Alert Signals
// ============================================================================

/// Alert-signal code from the fixed questionnaire alphabet.
///
/// # Invariants
/// - Variants are stable for serialization and rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCode {
    /// Supply or service cut-off affecting the community.
    SupplyCutoff,
    /// Advisory-level concern raised by informants.
    Advisory,
    /// Protest activity observed or announced.
    Protest,
    /// Complaint against project contractors.
    ContractorComplaint,
    /// Minor isolated incident.
    MinorIncident,
    /// Informational observation without direct impact.
    Informational,
    /// Individual grievance handled through the grievance channel.
    Grievance,
}

impl SignalCode {
    /// Returns true when the signal forces escalation handling.
    ///
    /// Escalation signals both require the repetition-probability answer and
    /// force a RED classification regardless of the numeric score.
    #[must_use]
    pub const fn escalates(self) -> bool {
        matches!(self, Self::SupplyCutoff | Self::Protest | Self::ContractorComplaint)
    }

    /// Returns true when the signal contributes to the numeric score.
    #[must_use]
    pub const fn is_scored(self) -> bool {
        matches!(self, Self::Advisory | Self::MinorIncident | Self::Informational)
    }
}

/// Multi-select set of alert-signal codes.
///
/// # Invariants
/// - Set semantics: duplicates collapse, iteration order is code order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalSet(BTreeSet<SignalCode>);

impl SignalSet {
    /// Creates an empty signal set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Inserts a signal code.
    pub fn insert(&mut self, signal: SignalCode) {
        self.0.insert(signal);
    }

    /// Returns true when the set contains the signal.
    #[must_use]
    pub fn contains(&self, signal: SignalCode) -> bool {
        self.0.contains(&signal)
    }

    /// Returns true when no signal is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of selected signals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the selected signals in code order.
    pub fn iter(&self) -> impl Iterator<Item = SignalCode> + '_ {
        self.0.iter().copied()
    }

    /// Returns true when any escalation signal is selected.
    #[must_use]
    pub fn has_escalation(&self) -> bool {
        self.iter().any(SignalCode::escalates)
    }

    /// Returns the number of scored signals selected.
    #[must_use]
    pub fn scored_count(&self) -> usize {
        self.iter().filter(|signal| signal.is_scored()).count()
    }

    /// Applies grievance exclusivity: a grievance selected together with any
    /// other signal collapses the set to grievance alone.
    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.contains(SignalCode::Grievance) && self.len() > 1 {
            let mut only = BTreeSet::new();
            only.insert(SignalCode::Grievance);
            return Self(only);
        }
        self.clone()
    }

    /// Returns true when grievance is the only selected signal.
    #[must_use]
    pub fn is_grievance_only(&self) -> bool {
        self.len() == 1 && self.contains(SignalCode::Grievance)
    }
}

impl FromIterator<SignalCode> for SignalSet {
    fn from_iter<I: IntoIterator<Item = SignalCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// SECTION: Conditional Codes
// ============================================================================

/// Probability that the reported situation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionProbability {
    /// Low probability of repetition.
    Low,
    /// Medium probability of repetition.
    Medium,
    /// High probability of repetition.
    High,
}

/// Urgency of field intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionUrgency {
    /// Intervention needed today.
    UrgentToday,
    /// Intervention needed within days.
    ShortTerm,
    /// Routine follow-up is sufficient.
    Routine,
}

// ============================================================================
// SECTION: Topic, Origin & Action Codes
// ============================================================================

/// Main topic of the reported conditions.
///
/// # Invariants
/// - `Other` requires the free-text override on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Water access or quality.
    Water,
    /// Land use or tenure.
    Land,
    /// Employment and local hiring.
    Employment,
    /// Health services.
    Health,
    /// Education services.
    Education,
    /// Community security.
    Security,
    /// Environmental impact.
    Environment,
    /// Free-text topic.
    Other,
}

/// How the informant learned about the topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    /// Directly observed by the informant.
    Observed,
    /// Told first-hand by an affected person.
    Firsthand,
    /// Heard as a rumor.
    Rumor,
    /// Read or heard in media.
    MediaReport,
}

/// Channel through which a rumor spread.
///
/// # Invariants
/// - `Other` requires the free-text override on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RumorChannel {
    /// Conversation among neighbors.
    Neighbors,
    /// Social media posts or groups.
    SocialMedia,
    /// Local radio.
    Radio,
    /// Marketplace talk.
    Marketplace,
    /// Community meeting.
    CommunityMeeting,
    /// Free-text channel.
    Other,
}

/// Action the surveyor recommends.
///
/// # Invariants
/// - `Other` requires the free-text override on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Keep monitoring without intervention.
    Monitor,
    /// Organize a community dialogue.
    CommunityDialogue,
    /// Escalate to the responsible authorities.
    EscalateToAuthorities,
    /// Schedule an immediate field visit.
    ImmediateVisit,
    /// No action required.
    NoAction,
    /// Free-text action.
    Other,
}

// ============================================================================
// SECTION: Attachments
// ============================================================================

/// GPS fix captured alongside the response.
///
/// # Invariants
/// - Coordinates are raw device output; no geographic validation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Reported accuracy in metres.
    pub accuracy_m: f64,
}

/// Photo attachment carried inline as base64.
///
/// # Invariants
/// - `data` is standard base64 of the raw image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    /// Media type of the image (for example `image/jpeg`).
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl PhotoAttachment {
    /// Encodes raw image bytes into an attachment.
    #[must_use]
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Decodes the attachment back into raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns a decode error message when the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, String> {
        BASE64.decode(&self.data).map_err(|err| err.to_string())
    }
}

// ============================================================================
// SECTION: Survey Response
// ============================================================================

/// Transient field-collected survey response.
///
/// # Invariants
/// - Enumerated answers are `None` and free-text answers empty until filled.
/// - The value is immutable once frozen into a submission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    /// Capture timestamp supplied by the host.
    pub captured_at: Timestamp,
    /// Informant type code.
    #[serde(default)]
    pub informant: Option<InformantType>,
    /// Free-text informant type when the code is `Other`.
    #[serde(default)]
    pub informant_other: String,
    /// Department of the surveyed community.
    #[serde(default)]
    pub region: Option<Region>,
    /// District free text.
    #[serde(default)]
    pub district: String,
    /// Community free text.
    #[serde(default)]
    pub community: String,
    /// Venue type code.
    #[serde(default)]
    pub venue: Option<VenueType>,
    /// Social-tension level (1..=5).
    #[serde(default)]
    pub tension: Option<TensionLevel>,
    /// Perceived trend.
    #[serde(default)]
    pub trend: Option<Trend>,
    /// Informant certainty.
    #[serde(default)]
    pub certainty: Option<Certainty>,
    /// Selected alert-signal codes.
    #[serde(default)]
    pub signals: SignalSet,
    /// Optional free-text elaboration of the selected signals.
    #[serde(default)]
    pub signals_detail: String,
    /// Repetition probability (conditionally required).
    #[serde(default)]
    pub repetition: Option<RepetitionProbability>,
    /// Intervention urgency (conditionally required).
    #[serde(default)]
    pub urgency: Option<InterventionUrgency>,
    /// Main topic code.
    #[serde(default)]
    pub topic: Option<Topic>,
    /// Free-text topic when the code is `Other`.
    #[serde(default)]
    pub topic_other: String,
    /// Origin type code.
    #[serde(default)]
    pub origin: Option<OriginType>,
    /// Rumor channels (required only when origin is `Rumor`).
    #[serde(default)]
    pub rumor_channels: BTreeSet<RumorChannel>,
    /// Free-text channel when `rumor_channels` contains `Other`.
    #[serde(default)]
    pub rumor_channels_other: String,
    /// Recommended action code.
    #[serde(default)]
    pub action: Option<RecommendedAction>,
    /// Free-text action when the code is `Other`.
    #[serde(default)]
    pub action_other: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// Optional GPS fix.
    #[serde(default)]
    pub gps: Option<GpsFix>,
    /// Optional photo attachment.
    #[serde(default)]
    pub photo: Option<PhotoAttachment>,
}

impl SurveyResponse {
    /// Creates an empty response stamped with the provided capture time.
    #[must_use]
    pub fn empty(captured_at: Timestamp) -> Self {
        Self {
            captured_at,
            informant: None,
            informant_other: String::new(),
            region: None,
            district: String::new(),
            community: String::new(),
            venue: None,
            tension: None,
            trend: None,
            certainty: None,
            signals: SignalSet::new(),
            signals_detail: String::new(),
            repetition: None,
            urgency: None,
            topic: None,
            topic_other: String::new(),
            origin: None,
            rumor_channels: BTreeSet::new(),
            rumor_channels_other: String::new(),
            action: None,
            action_other: String::new(),
            notes: String::new(),
            gps: None,
            photo: None,
        }
    }

    /// Returns a copy with the normalized signal set.
    #[must_use]
    pub fn with_normalized_signals(&self) -> Self {
        let mut normalized = self.clone();
        normalized.signals = self.signals.normalized();
        normalized
    }
}
