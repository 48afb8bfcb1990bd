//! Session and wire status enums.

use serde::{Deserialize, Serialize};

/// The saga status as the backend reports it in a snapshot.
///
/// These are wire values; the reconciler maps them onto the local
/// [`SessionStatus`] state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaStatus {
    /// Saga has been initialized.
    Started,
    /// Saga steps are being processed.
    InProgress,
    /// A limit order is waiting for its price condition; the only state
    /// in which user cancellation is accepted.
    LimitOrderPending,
    /// Saga completed successfully.
    Completed,
    /// Saga failed.
    Failed,
    /// Compensating transactions are running.
    Compensating,
    /// Compensation finished.
    CompensationCompleted,
    /// The user's cancellation request was accepted; rollback follows.
    CancelledByUser,
}

impl SagaStatus {
    /// Returns true if no further progress will be reported.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaStatus::Completed | SagaStatus::Failed | SagaStatus::CompensationCompleted
        )
    }

    /// Returns true if a user cancellation request is accepted in this state.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, SagaStatus::LimitOrderPending)
    }

    /// Returns true if this status means the backend has begun rolling
    /// the saga back.
    pub fn acknowledges_rollback(&self) -> bool {
        matches!(self, SagaStatus::Compensating | SagaStatus::CancelledByUser)
    }

    /// Returns the status name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::Started => "STARTED",
            SagaStatus::InProgress => "IN_PROGRESS",
            SagaStatus::LimitOrderPending => "LIMIT_ORDER_PENDING",
            SagaStatus::Completed => "COMPLETED",
            SagaStatus::Failed => "FAILED",
            SagaStatus::Compensating => "COMPENSATING",
            SagaStatus::CompensationCompleted => "COMPENSATION_COMPLETED",
            SagaStatus::CancelledByUser => "CANCELLED_BY_USER",
        }
    }
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The local state of a tracked session.
///
/// State transitions:
/// ```text
/// Submitting ──► InProgress ──┬──► Completed
///                             ├──► Failed
///                             └──► CancelRequested ──┐
///                             └──────────────────────┴──► Compensating ──► CompensationComplete
/// ```
/// Only moves forward; the compensating branch is a separate forward
/// track. `Completed`, `Failed` and `CompensationComplete` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    /// The submission call is in flight; no snapshot seen yet.
    #[default]
    Submitting,

    /// Forward saga steps are executing.
    InProgress,

    /// The user asked for cancellation; awaiting rollback acknowledgement.
    CancelRequested,

    /// The backend is running compensating transactions.
    Compensating,

    /// Rollback finished (terminal state).
    CompensationComplete,

    /// The saga completed successfully (terminal state).
    Completed,

    /// The saga failed, or progress became unobservable (terminal state).
    Failed,
}

impl SessionStatus {
    /// Returns true if no further mutation of the session is accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::CompensationComplete
        )
    }

    /// Returns true if the compensation catalog is the active one.
    pub fn is_compensation_track(&self) -> bool {
        matches!(
            self,
            SessionStatus::Compensating | SessionStatus::CompensationComplete
        )
    }

    /// Returns true if a cancellation intent may be raised in this state.
    ///
    /// The reported wire status must additionally be cancelable; see
    /// [`SagaStatus::is_cancelable`].
    pub fn can_request_cancel(&self) -> bool {
        matches!(self, SessionStatus::InProgress)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Submitting => "Submitting",
            SessionStatus::InProgress => "InProgress",
            SessionStatus::CancelRequested => "CancelRequested",
            SessionStatus::Compensating => "Compensating",
            SessionStatus::CompensationComplete => "CompensationComplete",
            SessionStatus::Completed => "Completed",
            SessionStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
