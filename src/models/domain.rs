use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Server-side matching state.
///
/// The server is the sole authority for this value: the client stores
/// whatever the last status fetch returned and never advances it locally.
/// On the wire it is a numeric code (0-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum MatchStatus {
    NotStarted,
    InQueue,
    Matched,
    MyApproved,
    BothApproved,
    PartnerRejected,
    PartnerRematched,
}

impl MatchStatus {
    /// Wire code used by the matching API.
    pub fn code(self) -> u8 {
        match self {
            MatchStatus::NotStarted => 0,
            MatchStatus::InQueue => 1,
            MatchStatus::Matched => 2,
            MatchStatus::MyApproved => 3,
            MatchStatus::BothApproved => 4,
            MatchStatus::PartnerRejected => 5,
            MatchStatus::PartnerRematched => 6,
        }
    }

    /// Parse a wire code. Returns `None` for codes outside the known set.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MatchStatus::NotStarted),
            1 => Some(MatchStatus::InQueue),
            2 => Some(MatchStatus::Matched),
            3 => Some(MatchStatus::MyApproved),
            4 => Some(MatchStatus::BothApproved),
            5 => Some(MatchStatus::PartnerRejected),
            6 => Some(MatchStatus::PartnerRematched),
            _ => None,
        }
    }

    /// Whether the queue poller should run for this status.
    pub fn is_waiting(self) -> bool {
        self == MatchStatus::InQueue
    }
}

impl Default for MatchStatus {
    fn default() -> Self {
        MatchStatus::NotStarted
    }
}

// Unknown codes collapse to the fail-safe default rather than failing the
// whole response parse; the dispatch table then renders the entry view.
impl From<u8> for MatchStatus {
    fn from(code: u8) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            tracing::warn!("unknown match status code {}, treating as not started", code);
            MatchStatus::NotStarted
        })
    }
}

impl From<MatchStatus> for u8 {
    fn from(status: MatchStatus) -> Self {
        status.code()
    }
}

/// Compatibility score as reported by the server.
///
/// Observed payloads carry either a bare float or a per-category breakdown
/// keyed by category name with the total under "overall". Both shapes are
/// accepted and kept opaque; `overall()` resolves whichever was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompatibilityScore {
    Single(f64),
    Breakdown(HashMap<String, f64>),
}

impl CompatibilityScore {
    pub fn overall(&self) -> Option<f64> {
        match self {
            CompatibilityScore::Single(value) => Some(*value),
            CompatibilityScore::Breakdown(map) => map.get("overall").copied(),
        }
    }

    /// Per-category scores, if the server sent a breakdown.
    pub fn categories(&self) -> Option<&HashMap<String, f64>> {
        match self {
            CompatibilityScore::Single(_) => None,
            CompatibilityScore::Breakdown(map) => Some(map),
        }
    }
}

/// Counterparty's public property facts (no identifying data beyond the
/// nickname and student-id prefix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerProperty {
    pub nickname: String,
    pub student_id: u16,
    pub gender: String,
    pub is_smoker: bool,
    pub dorm_building: String,
    pub stay_period: u8,
    pub has_fridge: bool,
    pub mate_fridge: u8,
    pub has_router: bool,
    pub mate_router: u8,
}

/// Counterparty's survey-derived category scores and badges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSurvey {
    #[serde(default)]
    pub scores: HashMap<String, f64>,
    #[serde(default)]
    pub badges: Vec<String>,
}

/// Public profile card shown for a match candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerCard {
    pub property: PartnerProperty,
    pub survey: PartnerSurvey,
}

/// Counterparty contact, disclosed only after both sides approve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub gender: String,
    pub student_id: u32,
}

/// Profile completeness as reported by the profile endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ProfileStatus {
    NoProperty,
    NoSurvey,
    Complete,
}

impl Default for ProfileStatus {
    fn default() -> Self {
        ProfileStatus::NoProperty
    }
}

impl ProfileStatus {
    pub fn code(self) -> u8 {
        match self {
            ProfileStatus::NoProperty => 0,
            ProfileStatus::NoSurvey => 1,
            ProfileStatus::Complete => 2,
        }
    }
}

impl From<u8> for ProfileStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => ProfileStatus::NoSurvey,
            2 => ProfileStatus::Complete,
            _ => ProfileStatus::NoProperty,
        }
    }
}

impl From<ProfileStatus> for u8 {
    fn from(status: ProfileStatus) -> Self {
        status.code()
    }
}
