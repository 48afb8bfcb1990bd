//! Status query service trait and a scriptable in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SessionId;

use crate::error::TrackerError;
use crate::snapshot::Snapshot;

/// Trait for querying the status of a saga session.
///
/// The backend returns a full snapshot per query, never a delta. The
/// poller calls this on a fixed interval until stopped.
#[async_trait]
pub trait StatusQueryService: Send + Sync {
    /// Fetches the current status snapshot for the session.
    async fn fetch_status(&self, session_id: SessionId) -> Result<Snapshot, TrackerError>;
}

enum ScriptEntry {
    Snapshot(Snapshot),
    Error(String),
}

#[derive(Default)]
struct ScriptedState {
    scripts: HashMap<SessionId, VecDeque<ScriptEntry>>,
    last_served: HashMap<SessionId, Snapshot>,
    query_counts: HashMap<SessionId, usize>,
}

/// In-memory status service scripted with a queue of responses per
/// session.
///
/// Each query pops the next entry; when the script runs dry the last
/// served snapshot is repeated, modeling a backend in a steady state
/// between progress updates.
#[derive(Clone, Default)]
pub struct ScriptedStatusService {
    state: Arc<RwLock<ScriptedState>>,
}

impl ScriptedStatusService {
    /// Creates a new scripted status service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot to the session's script.
    pub fn push_snapshot(&self, session_id: SessionId, snapshot: Snapshot) {
        self.state
            .write()
            .unwrap()
            .scripts
            .entry(session_id)
            .or_default()
            .push_back(ScriptEntry::Snapshot(snapshot));
    }

    /// Appends a transport error to the session's script.
    pub fn push_error(&self, session_id: SessionId, message: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .scripts
            .entry(session_id)
            .or_default()
            .push_back(ScriptEntry::Error(message.into()));
    }

    /// Returns how many queries have been issued for the session.
    pub fn query_count(&self, session_id: SessionId) -> usize {
        self.state
            .read()
            .unwrap()
            .query_counts
            .get(&session_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl StatusQueryService for ScriptedStatusService {
    async fn fetch_status(&self, session_id: SessionId) -> Result<Snapshot, TrackerError> {
        let mut state = self.state.write().unwrap();
        *state.query_counts.entry(session_id).or_insert(0) += 1;

        let next = state
            .scripts
            .get_mut(&session_id)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(ScriptEntry::Snapshot(snapshot)) => {
                state.last_served.insert(session_id, snapshot.clone());
                Ok(snapshot)
            }
            Some(ScriptEntry::Error(message)) => Err(TrackerError::StatusQuery(message)),
            None => state
                .last_served
                .get(&session_id)
                .cloned()
                .ok_or_else(|| TrackerError::StatusQuery("unknown session".to_string())),
        }
    }
}
