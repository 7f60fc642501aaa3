use serde::{Deserialize, Serialize};
use crate::models::domain::{Contact, MatchStatus, PartnerCard, CompatibilityScore, ProfileStatus};

/// Envelope for status-only endpoints (status fetch and every mutating
/// action). Error responses omit `match_status`, which then defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub match_status: MatchStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    /// Server-provided human-readable message, preferring `message`.
    pub fn server_message(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

/// Match result payload: status plus the candidate's public profile and
/// the compatibility score, all from one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResultResponse {
    pub success: bool,
    #[serde(default)]
    pub match_status: MatchStatus,
    #[serde(default)]
    pub match_id: Option<i64>,
    #[serde(default)]
    pub compatibility_score: Option<CompatibilityScore>,
    #[serde(default)]
    pub partner: Option<PartnerCard>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Contact payload, granted once both sides have approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(default)]
    pub match_status: MatchStatus,
    #[serde(default)]
    pub partner: Option<Contact>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Profile completeness, checked before the matching flow is entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStatusResponse {
    pub success: bool,
    #[serde(default)]
    pub profile_status: ProfileStatus,
    #[serde(default)]
    pub error: Option<String>,
}
