//! Paced step-reveal sequencing.
//!
//! A single snapshot can report many newly completed steps at once. The
//! sequencer turns that jump into an ordered one-at-a-time reveal so the
//! view never skips from step 2 straight to step 9. The orchestrator's
//! consumer loop provides the inter-step delay; the sequencer itself is
//! timing-free and therefore trivially testable.

use catalog::{self, StepId};

use crate::session::Session;

/// Returns the completed-but-unrevealed steps of the session's active
/// catalog, in ascending catalog ordinal. Steps outside the active
/// catalog are ignored.
pub fn pending_reveals(session: &Session) -> Vec<StepId> {
    let active = session.active_catalog();
    let mut pending: Vec<(usize, StepId)> = session
        .completed_steps()
        .iter()
        .filter(|step| !session.revealed_steps().contains(step))
        .filter_map(|step| catalog::ordinal_in(active, *step).map(|ord| (ord, *step)))
        .collect();
    pending.sort_by_key(|(ord, _)| *ord);
    pending.into_iter().map(|(_, step)| step).collect()
}

/// Drives the reveal sequence and latches the animation-complete signal.
#[derive(Debug, Default)]
pub struct AnimationSequencer {
    complete_signalled: bool,
}

impl AnimationSequencer {
    /// Creates a sequencer for a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets all reveal state; called when a new session supersedes the
    /// previous one.
    pub fn reset(&mut self) {
        self.complete_signalled = false;
    }

    /// Returns true if at least one reveal is pending.
    pub fn has_pending(&self, session: &Session) -> bool {
        !pending_reveals(session).is_empty()
    }

    /// Reveals the lowest-ordinal pending step, if any.
    pub fn reveal_next(&mut self, session: &mut Session) -> Option<StepId> {
        let step = pending_reveals(session).into_iter().next()?;
        session.reveal(step);
        metrics::counter!("steps_revealed_total").increment(1);
        tracing::debug!(session_id = %session.id(), step = ?step, "step revealed");
        Some(step)
    }

    /// Latches the animation-complete signal: true exactly once, when the
    /// session is terminal and every completed step of the active catalog
    /// has been revealed.
    pub fn signal_complete_if_done(&mut self, session: &Session) -> bool {
        if self.complete_signalled {
            return false;
        }
        if session.status().is_terminal() && !self.has_pending(session) {
            self.complete_signalled = true;
            tracing::debug!(session_id = %session.id(), "reveal animation complete");
            return true;
        }
        false
    }

    /// Returns true if the complete signal has already been raised.
    pub fn is_complete(&self) -> bool {
        self.complete_signalled
    }
}
