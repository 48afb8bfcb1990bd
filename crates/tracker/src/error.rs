//! Tracker error types.

use thiserror::Error;

use crate::status::SagaStatus;

/// Errors surfaced by the progress tracker.
///
/// Stale or superseded poll data is never an error; it is discarded
/// silently inside the reconciler.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Order submission failed; no session was created and no polling
    /// was started.
    #[error("Order submission failed: {0}")]
    Submission(String),

    /// A status query failed. Transport errors are fatal for the session:
    /// the poller converts them into a terminal failure snapshot.
    #[error("Status query failed: {0}")]
    StatusQuery(String),

    /// The cancellation service rejected or failed the request. The
    /// session keeps its prior state so the caller may retry.
    #[error("Cancellation request failed: {0}")]
    Cancellation(String),

    /// Cancellation was requested while the order is not in a cancelable
    /// waiting state.
    #[error("Cannot cancel order in {reported} state; only pending limit orders can be cancelled")]
    CancellationRejected { reported: SagaStatus },

    /// A cancellation request is already in flight for this session.
    #[error("A cancellation request is already in flight")]
    CancellationInFlight,

    /// An operation needed an active session and none exists.
    #[error("No active order session")]
    NoActiveSession,

    /// The order request is malformed (for example a limit order without
    /// a limit price).
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

/// Convenience type alias for tracker results.
pub type Result<T> = std::result::Result<T, TrackerError>;
