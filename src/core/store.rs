use crate::models::{
    CompatibilityScore, Contact, ContactResponse, MatchResultResponse, MatchStatus,
    PartnerProperty, PartnerSurvey,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared handle to the session's status store.
pub(crate) type SharedStore = Arc<Mutex<StatusStore>>;

/// Lock the store, recovering from poison. The lock is never held across
/// an await point, so a poisoned state is still internally consistent.
pub(crate) fn lock_store(store: &SharedStore) -> MutexGuard<'_, StatusStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory owner of the match flow state for one page session.
///
/// Holds the last status returned by the server together with the last
/// fetched result/contact payloads. All mutation flows through the
/// controller's fetch step or an action's post-success refresh; views only
/// read snapshots. Status and payload fields for a given response type are
/// always overwritten together, so a reader never sees a fresh status next
/// to a stale payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusStore {
    pub match_status: MatchStatus,
    pub match_id: Option<i64>,
    pub compatibility_score: Option<CompatibilityScore>,
    pub partner_property: Option<PartnerProperty>,
    pub partner_survey: Option<PartnerSurvey>,
    pub partner_contact: Option<Contact>,
    pub is_loading: bool,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional overwrite. Transition legality is not checked; the
    /// server is trusted as the sole transition authority.
    pub fn set_status(&mut self, status: MatchStatus) {
        self.match_status = status;
    }

    /// Apply a match result payload: status and result fields from the
    /// same response, in one call.
    pub fn set_result(&mut self, payload: &MatchResultResponse) {
        self.match_status = payload.match_status;
        self.match_id = payload.match_id;
        self.compatibility_score = payload.compatibility_score.clone();
        match &payload.partner {
            Some(partner) => {
                self.partner_property = Some(partner.property.clone());
                self.partner_survey = Some(partner.survey.clone());
            }
            None => {
                self.partner_property = None;
                self.partner_survey = None;
            }
        }
    }

    /// Apply a contact payload: status and contact fields from the same
    /// response, in one call.
    pub fn set_contact(&mut self, payload: &ContactResponse) {
        self.match_status = payload.match_status;
        self.partner_contact = payload.partner.clone();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Back to initial defaults, for leaving the matching flow entirely.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
