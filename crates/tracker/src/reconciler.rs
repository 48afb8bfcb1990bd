//! The progress reconciler: the single writer of session state.
//!
//! All mutation flows through [`ProgressReconciler::apply`] (snapshots)
//! and the cancellation-intent methods, so consistency needs no locking:
//! stale generations are discarded, terminal sessions are frozen, and the
//! completed-step set only ever grows.

use common::{Generation, SessionId};

use catalog::{self, OrderVariant};

use crate::error::{Result, TrackerError};
use crate::session::Session;
use crate::snapshot::PolledSnapshot;
use crate::status::{SagaStatus, SessionStatus};

/// What happened to a polled snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The snapshot was merged into the session.
    Applied,
    /// The snapshot belonged to a superseded generation (or no session
    /// exists) and was dropped silently.
    Stale,
    /// The session is terminal; late snapshots are ignored.
    Ignored,
}

/// Consumes snapshots and local intents, maintaining the authoritative
/// session view.
#[derive(Debug, Default)]
pub struct ProgressReconciler {
    session: Option<Session>,
    generation: Generation,
}

impl ProgressReconciler {
    /// Creates a reconciler with no tracked session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tracked session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Returns the current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Starts tracking a new session, superseding any previous one.
    ///
    /// Bumping the generation here is what invalidates poll responses
    /// still in flight for the old session.
    pub fn begin_session(&mut self, id: SessionId, variant: OrderVariant) -> Generation {
        self.generation = self.generation.next();
        self.session = Some(Session::new(id, variant, self.generation));
        tracing::info!(session_id = %id, %variant, generation = %self.generation, "session started");
        self.generation
    }

    /// Drops the tracked session (notification dismissed or view reset).
    /// The generation is kept so late polls keep failing the staleness
    /// check.
    pub fn clear(&mut self) {
        self.session = None;
    }

    /// Applies one polled snapshot to the session.
    pub fn apply(&mut self, polled: &PolledSnapshot) -> SnapshotOutcome {
        let Some(session) = self.session.as_mut() else {
            metrics::counter!("snapshots_stale_dropped_total").increment(1);
            return SnapshotOutcome::Stale;
        };

        if polled.generation != session.generation {
            metrics::counter!("snapshots_stale_dropped_total").increment(1);
            tracing::debug!(
                stale = %polled.generation,
                current = %session.generation,
                "dropping superseded snapshot"
            );
            return SnapshotOutcome::Stale;
        }

        if session.status.is_terminal() {
            return SnapshotOutcome::Ignored;
        }

        let snapshot = &polled.snapshot;
        session.record_status(snapshot.status, snapshot.current_step);
        session.reported_status = Some(snapshot.status);
        if snapshot.current_step.is_some() {
            session.current_step = snapshot.current_step;
        }
        session.merge_completed(&snapshot.completed_steps);

        match snapshot.status {
            SagaStatus::Started | SagaStatus::InProgress | SagaStatus::LimitOrderPending => {
                // CancelRequested holds until the backend acknowledges
                // rollback; everything else is forward progress.
                if session.status == SessionStatus::Submitting {
                    session.status = SessionStatus::InProgress;
                }
            }
            SagaStatus::Completed => {
                session.status = SessionStatus::Completed;
            }
            SagaStatus::Failed => {
                session.status = SessionStatus::Failed;
                if snapshot.failure_reason.is_some() {
                    session.failure_reason = snapshot.failure_reason.clone();
                }
            }
            SagaStatus::Compensating | SagaStatus::CancelledByUser => {
                Self::enter_compensation(session);
                session.status = SessionStatus::Compensating;
                Self::sync_compensation_progress(session);
            }
            SagaStatus::CompensationCompleted => {
                Self::enter_compensation(session);
                // The backend does not always enumerate each compensation
                // step; fold the whole plan in so the reveal can finish.
                if let Some(plan) = session.compensation_plan {
                    let ids: Vec<_> = plan.iter().map(|d| d.id).collect();
                    session.merge_completed(&ids);
                }
                session.status = SessionStatus::CompensationComplete;
                session.cancel_in_flight = false;
            }
        }

        metrics::counter!("snapshots_applied_total").increment(1);
        tracing::debug!(
            session_id = %session.id,
            status = %session.status,
            reported = %snapshot.status,
            completed = session.completed_steps.len(),
            "snapshot applied"
        );
        SnapshotOutcome::Applied
    }

    /// First entry into the compensation track: derive which compensation
    /// steps apply from the forward progress reached, and reset the reveal
    /// state because the active catalog switched. Idempotent.
    fn enter_compensation(session: &mut Session) {
        if session.compensation_plan.is_some() {
            return;
        }
        let plan = catalog::derive_compensation_steps(&session.completed_steps);
        tracing::info!(
            session_id = %session.id,
            steps = plan.len(),
            "entering compensation"
        );
        session.compensation_plan = Some(plan);
        session.revealed_steps.clear();
        session.cancel_in_flight = false;
    }

    /// While compensating, steps ahead of the reported current step have
    /// already run even if the backend never listed them as completed.
    fn sync_compensation_progress(session: &mut Session) {
        let (Some(plan), Some(current)) = (session.compensation_plan, session.current_step) else {
            return;
        };
        if let Some(pos) = catalog::ordinal_in(plan, current) {
            let done: Vec<_> = plan[..pos].iter().map(|d| d.id).collect();
            session.merge_completed(&done);
        }
    }

    /// Raises a local cancellation intent.
    ///
    /// Accepted only while the backend reports a cancelable waiting state
    /// and no cancellation is already in flight; otherwise the error is
    /// surfaced to the caller rather than silently dropped.
    pub fn begin_cancellation(&mut self) -> Result<SessionId> {
        let session = self.session.as_mut().ok_or(TrackerError::NoActiveSession)?;
        if session.cancel_in_flight {
            return Err(TrackerError::CancellationInFlight);
        }
        let reported = session.reported_status.unwrap_or(SagaStatus::Started);
        if !session.status.can_request_cancel() || !reported.is_cancelable() {
            return Err(TrackerError::CancellationRejected { reported });
        }
        session.cancel_in_flight = true;
        Ok(session.id)
    }

    /// The cancellation service accepted the request; rollback will be
    /// observed through subsequent snapshots.
    pub fn cancellation_accepted(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.status = SessionStatus::CancelRequested;
            tracing::info!(session_id = %session.id, "cancellation requested");
        }
    }

    /// The cancellation service failed; the session keeps its prior state
    /// so the user may retry or simply wait.
    pub fn cancellation_failed(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.cancel_in_flight = false;
        }
    }
}
