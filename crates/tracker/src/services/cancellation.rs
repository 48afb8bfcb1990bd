//! Cancellation service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SessionId;

use crate::error::TrackerError;

/// Trait for requesting a saga rollback.
///
/// A successful response acknowledges that rollback has been requested,
/// not that it finished; compensation progress arrives through status
/// snapshots.
#[async_trait]
pub trait OrderCancellationService: Send + Sync {
    /// Requests cancellation of the given session.
    async fn request_cancellation(&self, session_id: SessionId) -> Result<(), TrackerError>;
}

#[derive(Debug, Default)]
struct InMemoryCancellationState {
    requests: Vec<SessionId>,
    fail_on_cancel: bool,
}

/// In-memory cancellation service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCancellationService {
    state: Arc<RwLock<InMemoryCancellationState>>,
}

impl InMemoryCancellationService {
    /// Creates a new in-memory cancellation service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail the next cancellation call.
    pub fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().unwrap().fail_on_cancel = fail;
    }

    /// Returns the number of accepted cancellation requests.
    pub fn request_count(&self) -> usize {
        self.state.read().unwrap().requests.len()
    }

    /// Returns true if cancellation was requested for the session.
    pub fn was_requested(&self, session_id: SessionId) -> bool {
        self.state.read().unwrap().requests.contains(&session_id)
    }
}

#[async_trait]
impl OrderCancellationService for InMemoryCancellationService {
    async fn request_cancellation(&self, session_id: SessionId) -> Result<(), TrackerError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_cancel {
            return Err(TrackerError::Cancellation(
                "Cancellation service unavailable".to_string(),
            ));
        }

        state.requests.push(session_id);
        Ok(())
    }
}
