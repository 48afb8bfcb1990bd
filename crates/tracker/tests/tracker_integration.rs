//! End-to-end scenarios driving the orchestrator against scripted
//! backend services on a paused clock.

use std::time::Duration;

use catalog::StepId;
use tracker::{
    InMemoryCancellationService, InMemorySubmissionService, OrderRequest, ScriptedStatusService,
    SagaStatus, SessionStatus, Snapshot, TerminalEvent, TrackerConfig, TrackerError, TrackerEvent,
    TransactionOrchestrator, TRANSPORT_FAILURE_REASON,
};

type Orchestrator = TransactionOrchestrator<
    InMemorySubmissionService,
    ScriptedStatusService,
    InMemoryCancellationService,
>;

fn tracker() -> (Orchestrator, ScriptedStatusService, InMemoryCancellationService) {
    let status = ScriptedStatusService::new();
    let cancellation = InMemoryCancellationService::new();
    let orchestrator = TransactionOrchestrator::new(
        InMemorySubmissionService::new(),
        status.clone(),
        cancellation.clone(),
        TrackerConfig::default(),
    );
    (orchestrator, status, cancellation)
}

/// Drives the pipeline to its terminal notification, asserting along the
/// way that reveals never regress and never jump more than one step.
async fn drive_to_terminal(orchestrator: &mut Orchestrator) -> TerminalEvent {
    let mut last_revealed = 0usize;
    while let Some(event) = orchestrator.next_event().await {
        match event {
            TrackerEvent::ViewChanged(view) => {
                let revealed = view.revealed().count();
                assert!(
                    revealed == last_revealed || revealed == last_revealed + 1 || revealed == 0,
                    "reveals must advance one step at a time, resetting only when \
                     the session switches to the compensation catalog"
                );
                last_revealed = revealed;
            }
            TrackerEvent::Terminal(terminal) => return terminal,
        }
    }
    panic!("pipeline ended without a terminal event");
}

#[tokio::test(start_paused = true)]
async fn limit_order_reveals_steps_in_order_with_a_delay_between_them() {
    let (mut orchestrator, status, _) = tracker();
    let id = orchestrator
        .submit(OrderRequest::limit("ACC-1", "AAPL", 10, 180.0))
        .await
        .unwrap();
    status.push_snapshot(
        id,
        Snapshot::new(SagaStatus::InProgress)
            .with_completed([StepId::CreateOrder, StepId::VerifyTradingPermission]),
    );

    // First event: the snapshot lands, nothing revealed yet.
    let t0 = tokio::time::Instant::now();
    let TrackerEvent::ViewChanged(view) = orchestrator.next_event().await.unwrap() else {
        panic!("expected a view change");
    };
    assert_eq!(view.revealed().count(), 0);

    // Second event: CreateOrder revealed after one reveal delay.
    let TrackerEvent::ViewChanged(view) = orchestrator.next_event().await.unwrap() else {
        panic!("expected a view change");
    };
    let revealed: Vec<StepId> = view.revealed().map(|s| s.id).collect();
    assert_eq!(revealed, [StepId::CreateOrder]);
    let t1 = tokio::time::Instant::now();
    assert_eq!(t1 - t0, Duration::from_millis(300));

    // Third event: VerifyTradingPermission follows, one more delay later.
    let TrackerEvent::ViewChanged(view) = orchestrator.next_event().await.unwrap() else {
        panic!("expected a view change");
    };
    let revealed: Vec<StepId> = view.revealed().map(|s| s.id).collect();
    assert_eq!(revealed, [StepId::CreateOrder, StepId::VerifyTradingPermission]);
    assert_eq!(tokio::time::Instant::now() - t1, Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn market_order_completes_and_notifies_exactly_once() {
    let (mut orchestrator, status, _) = tracker();
    let id = orchestrator
        .submit(OrderRequest::market("ACC-1", "MSFT", 5))
        .await
        .unwrap();
    status.push_snapshot(
        id,
        Snapshot::new(SagaStatus::InProgress)
            .with_completed([StepId::CreateOrder, StepId::VerifyTradingPermission]),
    );
    status.push_snapshot(
        id,
        Snapshot::new(SagaStatus::Completed).with_completed([
            StepId::CreateOrder,
            StepId::VerifyTradingPermission,
            StepId::VerifyAccountStatus,
            StepId::ValidateStock,
        ]),
    );

    let terminal = drive_to_terminal(&mut orchestrator).await;
    assert_eq!(terminal.session_id, id);
    assert!(terminal.success);
    assert_eq!(terminal.status, SessionStatus::Completed);
    assert!(terminal.failure_reason.is_none());

    // Everything the backend confirmed was eventually revealed, and the
    // pipeline is quiet afterward: no second notification.
    let session = orchestrator.session().unwrap();
    assert_eq!(session.revealed_steps().len(), 4);
    assert!(orchestrator.next_event().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn cancellation_of_pending_limit_order_runs_the_compensation_chain() {
    let (mut orchestrator, status, cancellation) = tracker();
    let id = orchestrator
        .submit(OrderRequest::limit("ACC-1", "AAPL", 10, 150.0))
        .await
        .unwrap();
    status.push_snapshot(
        id,
        Snapshot::new(SagaStatus::LimitOrderPending).with_completed([
            StepId::CreateOrder,
            StepId::VerifyTradingPermission,
            StepId::VerifyAccountStatus,
            StepId::ValidateStock,
            StepId::CalculateRequiredFunds,
            StepId::ReserveFunds,
        ]),
    );

    // Wait until the pending state is visible, then cancel.
    let TrackerEvent::ViewChanged(view) = orchestrator.next_event().await.unwrap() else {
        panic!("expected a view change");
    };
    assert!(view.can_cancel);

    orchestrator.request_cancellation().await.unwrap();
    assert!(cancellation.was_requested(id));
    assert_eq!(
        orchestrator.session().unwrap().status(),
        SessionStatus::CancelRequested
    );

    // Backend acknowledges rollback, then finishes it.
    status.push_snapshot(id, Snapshot::new(SagaStatus::CancelledByUser));
    status.push_snapshot(id, Snapshot::new(SagaStatus::CompensationCompleted));

    let terminal = drive_to_terminal(&mut orchestrator).await;
    assert!(!terminal.success);
    assert_eq!(terminal.status, SessionStatus::CompensationComplete);

    // Funds were reserved but nothing executed: the derived chain is
    // release-funds then cancel-order, and both were revealed in order.
    let session = orchestrator.session().unwrap();
    let plan: Vec<StepId> = session
        .compensation_plan()
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(plan, [StepId::ReleaseFunds, StepId::CancelOrder]);
    assert_eq!(session.revealed_steps(), [StepId::ReleaseFunds, StepId::CancelOrder]);

    assert!(orchestrator.next_event().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_rejected_once_the_order_completed() {
    let (mut orchestrator, status, cancellation) = tracker();
    let id = orchestrator
        .submit(OrderRequest::limit("ACC-1", "AAPL", 1, 99.0))
        .await
        .unwrap();
    status.push_snapshot(id, Snapshot::new(SagaStatus::Completed));

    let terminal = drive_to_terminal(&mut orchestrator).await;
    assert!(terminal.success);

    let result = orchestrator.request_cancellation().await;
    assert!(matches!(
        result,
        Err(TrackerError::CancellationRejected { reported: SagaStatus::Completed })
    ));
    assert_eq!(orchestrator.session().unwrap().status(), SessionStatus::Completed);
    assert_eq!(cancellation.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_service_failure_leaves_the_session_retryable() {
    let (mut orchestrator, status, cancellation) = tracker();
    let id = orchestrator
        .submit(OrderRequest::limit("ACC-1", "AAPL", 1, 120.0))
        .await
        .unwrap();
    status.push_snapshot(id, Snapshot::new(SagaStatus::LimitOrderPending));
    let _ = orchestrator.next_event().await.unwrap();

    cancellation.set_fail_on_cancel(true);
    let result = orchestrator.request_cancellation().await;
    assert!(matches!(result, Err(TrackerError::Cancellation(_))));

    // State unchanged, cancel still offered, and the retry succeeds.
    let session = orchestrator.session().unwrap();
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert!(!session.cancel_in_flight());
    assert!(session.can_cancel());

    cancellation.set_fail_on_cancel(false);
    orchestrator.request_cancellation().await.unwrap();
    assert_eq!(
        orchestrator.session().unwrap().status(),
        SessionStatus::CancelRequested
    );
}

#[tokio::test(start_paused = true)]
async fn superseding_order_discards_stale_results_from_the_old_session() {
    let (mut orchestrator, status, _) = tracker();

    // Session A makes visible progress and keeps polling.
    let a = orchestrator
        .submit(OrderRequest::market("ACC-1", "AAPL", 1))
        .await
        .unwrap();
    status.push_snapshot(
        a,
        Snapshot::new(SagaStatus::InProgress).with_completed([
            StepId::CreateOrder,
            StepId::SettleTransaction,
        ]),
    );
    let _ = orchestrator.next_event().await.unwrap();

    // Let A's poller queue further emissions before it is torn down.
    tokio::time::sleep(Duration::from_secs(3)).await;

    // Session B supersedes A while A responses are still in the pipe.
    let b = orchestrator
        .submit(OrderRequest::market("ACC-1", "MSFT", 2))
        .await
        .unwrap();
    status.push_snapshot(b, Snapshot::new(SagaStatus::InProgress));
    status.push_snapshot(
        b,
        Snapshot::new(SagaStatus::Completed).with_completed([StepId::CreateOrder]),
    );

    let terminal = drive_to_terminal(&mut orchestrator).await;
    assert_eq!(terminal.session_id, b);

    // Nothing from A leaked into B's session.
    let session = orchestrator.session().unwrap();
    assert_eq!(session.id(), b);
    assert!(!session.completed_steps().contains(&StepId::SettleTransaction));
    assert_eq!(session.completed_steps(), [StepId::CreateOrder]);
}

#[tokio::test(start_paused = true)]
async fn transport_error_on_first_poll_fails_the_session_and_notifies_once() {
    let (mut orchestrator, status, _) = tracker();
    let id = orchestrator
        .submit(OrderRequest::market("ACC-1", "AAPL", 1))
        .await
        .unwrap();
    status.push_error(id, "connection reset by peer");

    let terminal = drive_to_terminal(&mut orchestrator).await;
    assert_eq!(terminal.session_id, id);
    assert!(!terminal.success);
    assert_eq!(terminal.status, SessionStatus::Failed);
    assert_eq!(terminal.failure_reason.as_deref(), Some(TRANSPORT_FAILURE_REASON));

    // Exactly one query was issued (no retry) and no further events come.
    assert_eq!(status.query_count(id), 1);
    assert!(orchestrator.next_event().await.is_none());
}
