//! Status snapshot wire types.

use chrono::{DateTime, Utc};
use common::Generation;
use serde::{Deserialize, Serialize};

use catalog::StepId;

use crate::status::SagaStatus;

/// Failure reason used when progress becomes unobservable (the status
/// query itself failed).
pub const TRANSPORT_FAILURE_REASON: &str = "Failed to get order status updates";

/// A full point-in-time status report from the backend.
///
/// Snapshots are not deltas: each one carries the complete set of steps
/// the backend has confirmed done so far. `current_step` is advisory
/// only; it may repeat across polls or be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Overall saga status.
    pub status: SagaStatus,
    /// The step the backend reports as presently executing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<StepId>,
    /// Steps the backend has confirmed done.
    #[serde(default)]
    pub completed_steps: Vec<StepId>,
    /// Set only when the saga failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Snapshot {
    /// Creates a snapshot with the given status and nothing else.
    pub fn new(status: SagaStatus) -> Self {
        Self {
            status,
            current_step: None,
            completed_steps: Vec::new(),
            failure_reason: None,
        }
    }

    /// Sets the currently executing step.
    pub fn with_current_step(mut self, step: StepId) -> Self {
        self.current_step = Some(step);
        self
    }

    /// Sets the completed step set.
    pub fn with_completed(mut self, steps: impl Into<Vec<StepId>>) -> Self {
        self.completed_steps = steps.into();
        self
    }

    /// Sets the failure reason.
    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    /// The synthetic terminal snapshot the poller emits when the status
    /// query itself fails.
    pub fn transport_failure() -> Self {
        Self::new(SagaStatus::Failed).with_failure_reason(TRANSPORT_FAILURE_REASON)
    }
}

/// A snapshot as emitted by the poller, tagged with the generation the
/// poller was started under so superseded emissions can be discarded.
#[derive(Debug, Clone)]
pub struct PolledSnapshot {
    /// Generation of the session this poll belongs to.
    pub generation: Generation,
    /// The snapshot itself.
    pub snapshot: Snapshot,
    /// When the response was received.
    pub received_at: DateTime<Utc>,
}

impl PolledSnapshot {
    /// Tags a snapshot with its generation, stamping the receive time.
    pub fn new(generation: Generation, snapshot: Snapshot) -> Self {
        Self {
            generation,
            snapshot,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_payload() {
        let payload = r#"{
            "status": "IN_PROGRESS",
            "currentStep": "RESERVE_FUNDS",
            "completedSteps": ["CREATE_ORDER", "VERIFY_TRADING_PERMISSION"],
            "failureReason": null
        }"#;
        let snapshot: Snapshot = serde_json::from_str(payload).unwrap();
        assert_eq!(snapshot.status, SagaStatus::InProgress);
        assert_eq!(snapshot.current_step, Some(StepId::ReserveFunds));
        assert_eq!(
            snapshot.completed_steps,
            vec![StepId::CreateOrder, StepId::VerifyTradingPermission]
        );
        assert!(snapshot.failure_reason.is_none());
    }

    #[test]
    fn missing_optional_fields_default() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"status": "STARTED"}"#).unwrap();
        assert_eq!(snapshot.status, SagaStatus::Started);
        assert!(snapshot.current_step.is_none());
        assert!(snapshot.completed_steps.is_empty());
    }

    #[test]
    fn transport_failure_is_terminal_with_generic_reason() {
        let snapshot = Snapshot::transport_failure();
        assert_eq!(snapshot.status, SagaStatus::Failed);
        assert_eq!(snapshot.failure_reason.as_deref(), Some(TRANSPORT_FAILURE_REASON));
        assert!(snapshot.completed_steps.is_empty());
    }
}
