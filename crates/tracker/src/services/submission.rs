//! Order submission service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SessionId;

use crate::error::TrackerError;
use crate::order::OrderRequest;

/// Trait for submitting an order, starting a new backend saga.
///
/// Called exactly once per user-initiated transaction; the returned
/// session id identifies the saga for status polling and cancellation.
#[async_trait]
pub trait OrderSubmissionService: Send + Sync {
    /// Submits the order and returns the assigned session id.
    async fn submit(&self, request: &OrderRequest) -> Result<SessionId, TrackerError>;
}

#[derive(Debug, Default)]
struct InMemorySubmissionState {
    submitted: Vec<(SessionId, OrderRequest)>,
    fail_on_submit: bool,
}

/// In-memory submission service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionService {
    state: Arc<RwLock<InMemorySubmissionState>>,
}

impl InMemorySubmissionService {
    /// Creates a new in-memory submission service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail the next submit call.
    pub fn set_fail_on_submit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_submit = fail;
    }

    /// Returns the number of accepted submissions.
    pub fn submission_count(&self) -> usize {
        self.state.read().unwrap().submitted.len()
    }

    /// Returns the session id assigned to the most recent submission.
    pub fn last_session_id(&self) -> Option<SessionId> {
        self.state.read().unwrap().submitted.last().map(|(id, _)| *id)
    }
}

#[async_trait]
impl OrderSubmissionService for InMemorySubmissionService {
    async fn submit(&self, request: &OrderRequest) -> Result<SessionId, TrackerError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_submit {
            return Err(TrackerError::Submission(
                "Order rejected by broker".to_string(),
            ));
        }

        let session_id = SessionId::new();
        state.submitted.push((session_id, request.clone()));
        Ok(session_id)
    }
}
