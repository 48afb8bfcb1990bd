//! Client-side progress reconciler for the asynchronous order saga.
//!
//! The backend executes a trade order as a long-running saga identified by
//! an opaque session id and exposes only a pull-based status query. This
//! crate turns a sequence of possibly out-of-order, duplicated or stale
//! full-snapshot polls into a monotonically advancing, user-intelligible
//! progress view:
//!
//! 1. [`SnapshotPoller`] queries the status service on a fixed interval and
//!    emits generation-tagged snapshots.
//! 2. [`ProgressReconciler`] applies snapshots to the authoritative
//!    [`Session`], discarding stale generations and freezing terminal state.
//! 3. [`AnimationSequencer`] paces newly completed steps into one-at-a-time
//!    reveals so the view never jumps.
//! 4. [`NotificationGate`] guarantees the terminal notification fires
//!    exactly once per session.
//! 5. [`TransactionOrchestrator`] wires submission, polling, cancellation
//!    and the consumer loop together.

pub mod config;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod order;
pub mod poller;
pub mod reconciler;
pub mod sequencer;
pub mod services;
pub mod session;
pub mod snapshot;
pub mod status;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use notify::NotificationGate;
pub use orchestrator::{TerminalEvent, TrackerEvent, TransactionOrchestrator};
pub use order::{OrderRequest, TimeInForce};
pub use poller::SnapshotPoller;
pub use reconciler::{ProgressReconciler, SnapshotOutcome};
pub use sequencer::{AnimationSequencer, pending_reveals};
pub use services::{
    InMemoryCancellationService, InMemorySubmissionService, OrderCancellationService,
    OrderSubmissionService, ScriptedStatusService, StatusQueryService,
};
pub use session::{Session, SessionView, StatusChange, StepView};
pub use snapshot::{PolledSnapshot, Snapshot, TRANSPORT_FAILURE_REASON};
pub use status::{SagaStatus, SessionStatus};
