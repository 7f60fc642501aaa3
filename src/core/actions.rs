use crate::core::controller::{MatchController, MatchView};
use crate::core::store::{lock_store, SharedStore};
use crate::services::BackendError;

/// Mutating actions a view can trigger. Each maps to exactly one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    /// Enter the matching queue.
    Start,
    /// Leave the queue while waiting.
    CancelQueue,
    /// Accept the presented candidate.
    Approve,
    /// Decline the presented candidate.
    Reject,
    /// Withdraw an already-given approval.
    CancelApproval,
    /// Request a new match after a concluded or failed one.
    Rematch,
}

impl MatchAction {
    /// Actions a view offers, in display order.
    pub fn available_for(view: MatchView) -> &'static [MatchAction] {
        match view {
            MatchView::Loading => &[],
            MatchView::Home => &[MatchAction::Start],
            MatchView::Waiting => &[MatchAction::CancelQueue],
            MatchView::Result => &[MatchAction::Approve, MatchAction::Reject],
            MatchView::Approval => &[MatchAction::CancelApproval],
            MatchView::Contact => &[MatchAction::Rematch],
            MatchView::ResultFailed => &[MatchAction::Rematch],
            MatchView::ContactFailed => &[MatchAction::Rematch],
        }
    }

    /// Hard-to-undo actions go through an explicit confirmation step
    /// before any request is issued.
    pub fn requires_confirmation(self) -> bool {
        matches!(
            self,
            MatchAction::CancelQueue
                | MatchAction::Reject
                | MatchAction::CancelApproval
                | MatchAction::Rematch
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchAction::Start => "start matching",
            MatchAction::CancelQueue => "cancel matching",
            MatchAction::Approve => "approve match",
            MatchAction::Reject => "reject match",
            MatchAction::CancelApproval => "cancel approval",
            MatchAction::Rematch => "request rematch",
        }
    }
}

/// Whether the user has confirmed a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    None,
    Confirmed,
}

/// Transient, toast-style notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    fn for_failure(action: MatchAction, err: &BackendError) -> Self {
        Self {
            title: format!("Could not {}", action.label()),
            body: err.user_message(),
        }
    }
}

/// Result of performing an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Request accepted; the store has been re-synced with server truth.
    Refreshed,
    /// Destructive action without confirmation; nothing was sent.
    ConfirmationRequired,
    /// Another request is still in flight; nothing was sent.
    Busy,
    /// Request failed; status untouched, notice for the user.
    Failed(Notice),
}

/// Clears the loading flag on every exit path of `perform`.
struct LoadingGuard(SharedStore);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        lock_store(&self.0).set_loading(false);
    }
}

impl MatchController {
    /// Run one mutating action under the uniform handler contract: gate on
    /// confirmation and on an in-flight request, issue exactly one request,
    /// and on success re-fetch authoritative status instead of guessing
    /// the new one locally.
    pub async fn perform(&mut self, action: MatchAction, confirmation: Confirmation) -> ActionOutcome {
        if action.requires_confirmation() && confirmation != Confirmation::Confirmed {
            return ActionOutcome::ConfirmationRequired;
        }

        let store = self.store_handle();
        {
            let mut guard = lock_store(&store);
            if guard.is_loading {
                return ActionOutcome::Busy;
            }
            guard.set_loading(true);
        }
        let _loading = LoadingGuard(store);

        let backend = self.backend_client();
        let result = match action {
            MatchAction::Start => backend.start_matching().await,
            MatchAction::CancelQueue | MatchAction::CancelApproval => {
                backend.cancel_matching().await
            }
            MatchAction::Approve => backend.approve_match().await,
            MatchAction::Reject => backend.reject_match().await,
            MatchAction::Rematch => backend.request_rematch().await,
        };

        match result {
            Ok(res) => {
                tracing::info!(
                    "{} accepted (server reports {:?}), refreshing",
                    action.label(),
                    res.match_status
                );
                self.refresh().await;
                ActionOutcome::Refreshed
            }
            Err(err) => {
                tracing::warn!("{} failed: {}", action.label(), err);
                ActionOutcome::Failed(Notice::for_failure(action, &err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::DEFAULT_POLL_PERIOD;
    use crate::services::BackendClient;
    use std::sync::Arc;

    fn controller() -> MatchController {
        let backend = Arc::new(
            BackendClient::new("http://localhost:1/api".to_string(), None).unwrap(),
        );
        MatchController::new(backend, DEFAULT_POLL_PERIOD)
    }

    #[test]
    fn test_confirmation_table() {
        assert!(!MatchAction::Start.requires_confirmation());
        assert!(!MatchAction::Approve.requires_confirmation());
        assert!(MatchAction::CancelQueue.requires_confirmation());
        assert!(MatchAction::Reject.requires_confirmation());
        assert!(MatchAction::CancelApproval.requires_confirmation());
        assert!(MatchAction::Rematch.requires_confirmation());
    }

    #[test]
    fn test_availability_per_view() {
        assert_eq!(MatchAction::available_for(MatchView::Home), &[MatchAction::Start]);
        assert_eq!(
            MatchAction::available_for(MatchView::Result),
            &[MatchAction::Approve, MatchAction::Reject]
        );
        assert_eq!(
            MatchAction::available_for(MatchView::Approval),
            &[MatchAction::CancelApproval]
        );
        assert!(MatchAction::available_for(MatchView::Loading).is_empty());
    }

    #[test]
    fn test_destructive_action_needs_confirmation() {
        // Early return: no request is issued, so the unroutable backend
        // address is never touched.
        let mut controller = controller();
        let outcome = tokio_test::block_on(
            controller.perform(MatchAction::Reject, Confirmation::None),
        );
        assert_eq!(outcome, ActionOutcome::ConfirmationRequired);
    }

    #[test]
    fn test_in_flight_request_blocks_resubmission() {
        let mut controller = controller();
        lock_store(&controller.store_handle()).set_loading(true);
        let outcome = tokio_test::block_on(
            controller.perform(MatchAction::Start, Confirmation::None),
        );
        assert_eq!(outcome, ActionOutcome::Busy);
    }

    #[test]
    fn test_loading_guard_clears_flag() {
        let controller = controller();
        let store = controller.store_handle();
        lock_store(&store).set_loading(true);
        {
            let _guard = LoadingGuard(Arc::clone(&store));
        }
        assert!(!lock_store(&store).is_loading);
    }
}
