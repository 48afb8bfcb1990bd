//! Periodic status polling for one session.

use std::sync::Arc;
use std::time::Duration;

use common::{Generation, SessionId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::services::StatusQueryService;
use crate::snapshot::{PolledSnapshot, Snapshot};

/// Polls the status query service for one session on a fixed interval,
/// emitting each snapshot tagged with the session's generation.
///
/// The poller stops on its own once a terminal wire status is observed.
/// A transport error is fatal: one synthetic failure snapshot is emitted
/// and polling stops, with no retry. `stop()` is idempotent; an emission
/// already in flight cannot be recalled, so the consumer discards stale
/// generations instead.
#[derive(Debug)]
pub struct SnapshotPoller {
    session_id: SessionId,
    generation: Generation,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SnapshotPoller {
    /// Spawns the poll loop for `session_id`. The first query is issued
    /// immediately, then one per `interval`.
    pub fn spawn<S>(
        service: Arc<S>,
        session_id: SessionId,
        generation: Generation,
        interval: Duration,
        tx: mpsc::Sender<PolledSnapshot>,
    ) -> Self
    where
        S: StatusQueryService + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            poll_loop(service, session_id, generation, interval, tx, token).await;
        });
        Self {
            session_id,
            generation,
            cancel,
            handle,
        }
    }

    /// Returns the session being polled.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the generation emissions are tagged with.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Stops the poll loop. Idempotent; safe to call after the loop has
    /// already exited on its own.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the poll loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop<S>(
    service: Arc<S>,
    session_id: SessionId,
    generation: Generation,
    interval: Duration,
    tx: mpsc::Sender<PolledSnapshot>,
    cancel: CancellationToken,
) where
    S: StatusQueryService,
{
    tracing::debug!(%session_id, %generation, "poll loop starting");
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match service.fetch_status(session_id).await {
            Ok(snapshot) => {
                let terminal = snapshot.status.is_terminal();
                if tx.send(PolledSnapshot::new(generation, snapshot)).await.is_err() {
                    break;
                }
                if terminal {
                    tracing::debug!(%session_id, "terminal status observed, poll loop stopping");
                    break;
                }
            }
            Err(err) => {
                // A failed status query means progress is unobservable;
                // fail the session rather than retry.
                tracing::warn!(%session_id, error = %err, "status query failed, giving up");
                metrics::counter!("status_polls_failed_total").increment(1);
                let _ = tx
                    .send(PolledSnapshot::new(generation, Snapshot::transport_failure()))
                    .await;
                break;
            }
        }
    }
    tracing::debug!(%session_id, "poll loop exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::StepId;
    use crate::services::ScriptedStatusService;
    use crate::snapshot::TRANSPORT_FAILURE_REASON;
    use crate::status::SagaStatus;

    fn generation() -> Generation {
        Generation::initial().next()
    }

    #[tokio::test(start_paused = true)]
    async fn emits_snapshots_until_terminal() {
        let service = Arc::new(ScriptedStatusService::new());
        let session_id = SessionId::new();
        service.push_snapshot(
            session_id,
            Snapshot::new(SagaStatus::InProgress).with_completed([StepId::CreateOrder]),
        );
        service.push_snapshot(session_id, Snapshot::new(SagaStatus::Completed));

        let (tx, mut rx) = mpsc::channel(8);
        let poller = SnapshotPoller::spawn(
            service,
            session_id,
            generation(),
            Duration::from_secs(1),
            tx,
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.snapshot.status, SagaStatus::InProgress);
        assert_eq!(first.generation, poller.generation());

        let second = rx.recv().await.unwrap();
        assert_eq!(second.snapshot.status, SagaStatus::Completed);

        // Terminal: the loop stops by itself and the channel drains.
        assert!(rx.recv().await.is_none() || poller.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_emits_one_failure_snapshot_and_stops() {
        let service = Arc::new(ScriptedStatusService::new());
        let session_id = SessionId::new();
        service.push_error(session_id, "connection refused");

        let (tx, mut rx) = mpsc::channel(8);
        let _poller = SnapshotPoller::spawn(
            service.clone(),
            session_id,
            generation(),
            Duration::from_secs(1),
            tx,
        );

        let polled = rx.recv().await.unwrap();
        assert_eq!(polled.snapshot.status, SagaStatus::Failed);
        assert_eq!(
            polled.snapshot.failure_reason.as_deref(),
            Some(TRANSPORT_FAILURE_REASON)
        );

        // No retry: exactly one query was issued.
        assert!(rx.recv().await.is_none());
        assert_eq!(service.query_count(session_id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_polling() {
        let service = Arc::new(ScriptedStatusService::new());
        let session_id = SessionId::new();
        service.push_snapshot(session_id, Snapshot::new(SagaStatus::InProgress));

        let (tx, mut rx) = mpsc::channel(8);
        let poller = SnapshotPoller::spawn(
            service.clone(),
            session_id,
            generation(),
            Duration::from_secs(1),
            tx,
        );

        // First emission arrives, then we stop.
        let _ = rx.recv().await.unwrap();
        poller.stop();
        poller.stop();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_the_configured_interval() {
        let service = Arc::new(ScriptedStatusService::new());
        let session_id = SessionId::new();
        // Steady non-terminal state: the script repeats its last snapshot.
        service.push_snapshot(session_id, Snapshot::new(SagaStatus::LimitOrderPending));

        let (tx, mut rx) = mpsc::channel(8);
        let poller = SnapshotPoller::spawn(
            service.clone(),
            session_id,
            generation(),
            Duration::from_secs(1),
            tx,
        );

        let _ = rx.recv().await.unwrap();
        let _ = rx.recv().await.unwrap();
        let _ = rx.recv().await.unwrap();
        assert!(service.query_count(session_id) >= 3);
        poller.stop();
    }
}
