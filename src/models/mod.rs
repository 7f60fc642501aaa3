// Model exports
pub mod domain;
pub mod responses;

pub use domain::{MatchStatus, CompatibilityScore, PartnerProperty, PartnerSurvey, PartnerCard, Contact, ProfileStatus};
pub use responses::{StatusResponse, MatchResultResponse, ContactResponse, ProfileStatusResponse};
