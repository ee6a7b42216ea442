//! Polling layer: the single-slot coordinator and the message sync session

mod coordinator;
mod session;

pub use coordinator::{PollingCoordinator, PollingJob, TickFn};
pub use session::{
    GetMessages, MessageSyncSession, MessagesResponse, OnSuccess, PollRequest,
    RequestInFlightError, StopPredicate, DEFAULT_REQUEST_KEY, POLLING_INTERVAL,
};
