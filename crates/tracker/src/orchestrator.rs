//! The composition root wiring submission, polling, reconciliation,
//! reveal pacing and notification gating together.

use std::sync::Arc;

use common::SessionId;
use tokio::sync::mpsc;

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::notify::NotificationGate;
use crate::order::OrderRequest;
use crate::poller::SnapshotPoller;
use crate::reconciler::{ProgressReconciler, SnapshotOutcome};
use crate::sequencer::AnimationSequencer;
use crate::services::{OrderCancellationService, OrderSubmissionService, StatusQueryService};
use crate::session::{Session, SessionView};
use crate::snapshot::PolledSnapshot;
use crate::status::SessionStatus;

/// The one-shot terminal signal for a session.
#[derive(Debug, Clone)]
pub struct TerminalEvent {
    /// The session that terminated.
    pub session_id: SessionId,
    /// The terminal status reached.
    pub status: SessionStatus,
    /// True only for a successfully completed order.
    pub success: bool,
    /// Failure reason for failed sessions.
    pub failure_reason: Option<String>,
}

/// Events yielded by the consumer loop.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// The session view changed (snapshot applied or step revealed).
    ViewChanged(SessionView),
    /// The session terminated and its animation finished; fired exactly
    /// once per session.
    Terminal(TerminalEvent),
}

/// Wires the external services to the tracking pipeline and drives it
/// from a single consumer loop.
///
/// All session mutation happens inside `&mut self` methods, so state is
/// single-writer by construction; the poller task only sends over a
/// channel. Only one poller is live at a time: submitting a new order
/// stops the previous poller and bumps the generation, so responses
/// still in flight for the old session are discarded on arrival.
pub struct TransactionOrchestrator<Sub, St, C> {
    submission: Sub,
    status: Arc<St>,
    cancellation: C,
    config: TrackerConfig,
    reconciler: ProgressReconciler,
    sequencer: AnimationSequencer,
    gate: NotificationGate,
    poller: Option<SnapshotPoller>,
    snapshots_tx: mpsc::Sender<PolledSnapshot>,
    snapshots_rx: mpsc::Receiver<PolledSnapshot>,
}

impl<Sub, St, C> TransactionOrchestrator<Sub, St, C>
where
    Sub: OrderSubmissionService,
    St: StatusQueryService + 'static,
    C: OrderCancellationService,
{
    /// Creates a new orchestrator over the three backend services.
    pub fn new(submission: Sub, status: St, cancellation: C, config: TrackerConfig) -> Self {
        let (snapshots_tx, snapshots_rx) = mpsc::channel(32);
        Self {
            submission,
            status: Arc::new(status),
            cancellation,
            config,
            reconciler: ProgressReconciler::new(),
            sequencer: AnimationSequencer::new(),
            gate: NotificationGate::new(),
            poller: None,
            snapshots_tx,
            snapshots_rx,
        }
    }

    /// Submits a new order, superseding any session still being tracked.
    ///
    /// On submission error no session is created and no polling starts;
    /// the previous session (if any) has already been torn down.
    #[tracing::instrument(skip(self, request), fields(symbol = %request.symbol, variant = %request.variant))]
    pub async fn submit(&mut self, request: OrderRequest) -> Result<SessionId> {
        request.validate()?;
        self.teardown_session();

        let session_id = self.submission.submit(&request).await?;
        let generation = self.reconciler.begin_session(session_id, request.variant);
        self.poller = Some(SnapshotPoller::spawn(
            Arc::clone(&self.status),
            session_id,
            generation,
            self.config.poll_interval,
            self.snapshots_tx.clone(),
        ));

        metrics::counter!("orders_submitted_total").increment(1);
        Ok(session_id)
    }

    /// Raises a cancellation intent for the tracked session.
    ///
    /// Accepted only while the backend reports the order as a pending
    /// limit order. A service failure leaves the session in its prior
    /// state so the user may retry; polling continues either way until
    /// the backend confirms compensation completion.
    #[tracing::instrument(skip(self))]
    pub async fn request_cancellation(&mut self) -> Result<()> {
        let session_id = self.reconciler.begin_cancellation()?;
        metrics::counter!("cancellations_requested_total").increment(1);

        match self.cancellation.request_cancellation(session_id).await {
            Ok(()) => {
                self.reconciler.cancellation_accepted();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%session_id, error = %err, "cancellation request failed");
                self.reconciler.cancellation_failed();
                Err(err)
            }
        }
    }

    /// Drives the pipeline one step: applies the next non-stale snapshot
    /// or reveals the next completed step, whichever is due first.
    ///
    /// Returns `None` once the tracked session has fully played out (or
    /// none exists). The inter-step reveal delay is enforced here, so a
    /// burst of completed steps still reveals one at a time.
    pub async fn next_event(&mut self) -> Option<TrackerEvent> {
        loop {
            if let Some(event) = self.take_terminal_event() {
                return Some(event);
            }
            if self.is_played_out() {
                return None;
            }

            let reveal_pending = self
                .reconciler
                .session()
                .is_some_and(|s| self.sequencer.has_pending(s));

            tokio::select! {
                maybe = self.snapshots_rx.recv() => {
                    let polled = maybe?;
                    if self.apply_snapshot(&polled) {
                        return self.view().map(TrackerEvent::ViewChanged);
                    }
                    // Stale or ignored: keep waiting.
                }
                _ = tokio::time::sleep(self.config.reveal_delay), if reveal_pending => {
                    self.reveal_one();
                    return self.view().map(TrackerEvent::ViewChanged);
                }
            }
        }
    }

    /// Returns the presentation view of the tracked session.
    pub fn view(&self) -> Option<SessionView> {
        self.reconciler.session().map(Session::view)
    }

    /// Returns the tracked session.
    pub fn session(&self) -> Option<&Session> {
        self.reconciler.session()
    }

    /// Drops the tracked session and stops its poller; called when the
    /// user dismisses the terminal notification.
    pub fn dismiss(&mut self) {
        self.teardown_session();
    }

    fn teardown_session(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.reconciler.clear();
        self.sequencer.reset();
    }

    fn apply_snapshot(&mut self, polled: &PolledSnapshot) -> bool {
        match self.reconciler.apply(polled) {
            SnapshotOutcome::Applied => {
                self.after_mutation();
                true
            }
            SnapshotOutcome::Stale | SnapshotOutcome::Ignored => false,
        }
    }

    fn reveal_one(&mut self) {
        if let Some(session) = self.reconciler.session_mut() {
            self.sequencer.reveal_next(session);
        }
        self.after_mutation();
    }

    /// Post-mutation bookkeeping: terminal sessions stop their poller and
    /// arm the gate; a finished reveal animation arms the other half.
    fn after_mutation(&mut self) {
        let Some((id, terminal)) = self
            .reconciler
            .session()
            .map(|s| (s.id(), s.status().is_terminal()))
        else {
            return;
        };

        if terminal {
            self.gate.mark_terminal(id);
            if let Some(poller) = self.poller.take() {
                poller.stop();
            }
        }

        let animation_done = match self.reconciler.session() {
            Some(session) => self.sequencer.signal_complete_if_done(session),
            None => false,
        };
        if animation_done {
            self.gate.mark_animation_complete(id);
        }
    }

    fn take_terminal_event(&mut self) -> Option<TrackerEvent> {
        let (id, status, failure_reason) = {
            let session = self.reconciler.session()?;
            (
                session.id(),
                session.status(),
                session.failure_reason().map(str::to_string),
            )
        };

        if !self.gate.should_notify(id) {
            return None;
        }

        let success = status == SessionStatus::Completed;
        tracing::info!(session_id = %id, %status, success, "terminal notification");
        Some(TrackerEvent::Terminal(TerminalEvent {
            session_id: id,
            status,
            success,
            failure_reason,
        }))
    }

    /// True once there is nothing left this session can produce.
    fn is_played_out(&self) -> bool {
        match self.reconciler.session() {
            None => true,
            Some(session) => {
                session.status().is_terminal()
                    && self.gate.is_notified(session.id())
                    && !self.sequencer.has_pending(session)
            }
        }
    }
}
