use crate::core::store::{lock_store, SharedStore, StatusStore};
use crate::models::MatchStatus;
use crate::services::{BackendClient, BackendError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Queue polling period used when the settings do not override it.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(5);

/// The one view active for a given flow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchView {
    /// Initial status fetch has not completed yet.
    Loading,
    /// Offer to enter the queue.
    Home,
    /// Waiting in the queue; polling is active.
    Waiting,
    /// Candidate found; offer accept/reject.
    Result,
    /// Approved, waiting on the counterparty; offer cancel.
    Approval,
    /// Both approved; contact card.
    Contact,
    /// Counterparty rejected; offer rematch.
    ResultFailed,
    /// Counterparty rematched away; stale contact, offer rematch.
    ContactFailed,
}

impl MatchView {
    /// Status to view dispatch. Exhaustive on purpose: a new status is a
    /// compile-visible change here.
    pub fn for_status(status: MatchStatus) -> Self {
        match status {
            MatchStatus::NotStarted => MatchView::Home,
            MatchStatus::InQueue => MatchView::Waiting,
            MatchStatus::Matched => MatchView::Result,
            MatchStatus::MyApproved => MatchView::Approval,
            MatchStatus::BothApproved => MatchView::Contact,
            MatchStatus::PartnerRejected => MatchView::ResultFailed,
            MatchStatus::PartnerRematched => MatchView::ContactFailed,
        }
    }
}

/// Owns the fetch-and-poll lifecycle and the status-to-view dispatch.
///
/// The controller is the single writer of the status store: status lands
/// there from the initial fetch, refreshes after actions, and poll ticks.
/// Views read snapshots and report user intent back through
/// [`perform`](MatchController::perform); they never mutate state.
pub struct MatchController {
    backend: Arc<BackendClient>,
    store: SharedStore,
    status_tx: Arc<watch::Sender<MatchStatus>>,
    poll_period: Duration,
    poller: Option<StatusPoller>,
    initial_load_done: bool,
}

impl MatchController {
    pub fn new(backend: Arc<BackendClient>, poll_period: Duration) -> Self {
        let (status_tx, _) = watch::channel(MatchStatus::NotStarted);
        Self {
            backend,
            store: Arc::new(Mutex::new(StatusStore::new())),
            status_tx: Arc::new(status_tx),
            poll_period,
            poller: None,
            initial_load_done: false,
        }
    }

    /// Initial load: fetch the current status once, then reconcile
    /// polling. Completes regardless of fetch success; a failure leaves
    /// the status at its default and surfaces nothing here.
    pub async fn activate(&mut self) {
        self.fetch_status().await;
        self.initial_load_done = true;
        self.sync_polling();
    }

    /// The shared reconcile step: re-fetch authoritative status and
    /// reconcile polling. Called after every successful mutating action.
    pub async fn refresh(&mut self) {
        self.fetch_status().await;
        self.sync_polling();
    }

    /// The view to render right now.
    pub fn current_view(&self) -> MatchView {
        if !self.initial_load_done {
            return MatchView::Loading;
        }
        MatchView::for_status(lock_store(&self.store).match_status)
    }

    /// Copy of the current store state, for rendering.
    pub fn snapshot(&self) -> StatusStore {
        lock_store(&self.store).clone()
    }

    /// Watch handle for status transitions, so an embedding UI can await
    /// changes (e.g. queue -> matched from a poll tick) instead of
    /// re-reading the store.
    pub fn subscribe(&self) -> watch::Receiver<MatchStatus> {
        self.status_tx.subscribe()
    }

    /// Whether the queue poller task is currently running.
    pub fn polling_active(&self) -> bool {
        self.poller.as_ref().map(StatusPoller::is_active).unwrap_or(false)
    }

    /// Fetch the payload the current view renders: the match result while
    /// a candidate is on the table, the contact once both sides approved
    /// (the stale-contact view re-reads it as well). No-op for statuses
    /// without a payload.
    pub async fn load_view_data(&self) -> Result<(), BackendError> {
        let status = lock_store(&self.store).match_status;
        match status {
            MatchStatus::Matched | MatchStatus::MyApproved | MatchStatus::PartnerRejected => {
                let payload = self.backend.get_match_result().await?;
                lock_store(&self.store).set_result(&payload);
                self.status_tx.send_replace(payload.match_status);
                Ok(())
            }
            MatchStatus::BothApproved | MatchStatus::PartnerRematched => {
                let payload = self.backend.get_contact().await?;
                lock_store(&self.store).set_contact(&payload);
                self.status_tx.send_replace(payload.match_status);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Leave the matching flow entirely: stop polling and clear the store.
    pub fn reset(&mut self) {
        self.poller = None;
        lock_store(&self.store).reset();
        self.status_tx.send_replace(MatchStatus::NotStarted);
    }

    async fn fetch_status(&self) {
        lock_store(&self.store).set_loading(true);
        match self.backend.get_status().await {
            Ok(res) => {
                lock_store(&self.store).set_status(res.match_status);
                self.status_tx.send_replace(res.match_status);
            }
            Err(err) => {
                // Keep the previous status; the dispatch layer must always
                // have something to render.
                tracing::debug!("status fetch failed, keeping last known status: {}", err);
            }
        }
        lock_store(&self.store).set_loading(false);
    }

    /// Reconcile the poller with the current status: running while in the
    /// queue, released otherwise. Dropping the poller aborts its task, so
    /// no timer survives a status change or controller teardown.
    fn sync_polling(&mut self) {
        let waiting = lock_store(&self.store).match_status.is_waiting();
        if waiting {
            if !self.polling_active() {
                tracing::debug!("entered queue, starting status poller");
                self.poller = Some(StatusPoller::spawn(
                    Arc::clone(&self.backend),
                    Arc::clone(&self.store),
                    Arc::clone(&self.status_tx),
                    self.poll_period,
                ));
            }
        } else if self.poller.take().is_some() {
            tracing::debug!("left queue, status poller released");
        }
    }

    pub(crate) fn backend_client(&self) -> Arc<BackendClient> {
        Arc::clone(&self.backend)
    }

    pub(crate) fn store_handle(&self) -> SharedStore {
        Arc::clone(&self.store)
    }
}

/// Scoped handle to the queue polling task.
///
/// The task re-fetches status at a fixed period while the server reports
/// the user as queued, and ends itself on the first non-queue status. The
/// handle aborts the task when dropped, which covers every other exit
/// path: status change, store reset, controller teardown.
struct StatusPoller {
    handle: JoinHandle<()>,
}

impl StatusPoller {
    fn spawn(
        backend: Arc<BackendClient>,
        store: SharedStore,
        status_tx: Arc<watch::Sender<MatchStatus>>,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields immediately; consume that tick so the first
            // poll lands one full period after entering the queue.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match backend.get_status().await {
                    Ok(res) => {
                        lock_store(&store).set_status(res.match_status);
                        status_tx.send_replace(res.match_status);
                        if !res.match_status.is_waiting() {
                            tracing::debug!("queue wait ended: {:?}", res.match_status);
                            break;
                        }
                    }
                    Err(err) => {
                        // Transient poll misses are silent; the next tick
                        // retries.
                        tracing::debug!("status poll failed: {}", err);
                    }
                }
            }
        });
        Self { handle }
    }

    fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
