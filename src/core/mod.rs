// Core flow-engine exports
pub mod actions;
pub mod controller;
pub mod store;

pub use actions::{ActionOutcome, Confirmation, MatchAction, Notice};
pub use controller::{MatchController, MatchView, DEFAULT_POLL_PERIOD};
pub use store::StatusStore;
