//! One-shot terminal notification gating.

use std::collections::HashSet;

use common::SessionId;

/// Guarantees the terminal notification fires exactly once per session.
///
/// A notification requires both conditions: the session reached a
/// terminal status, and the reveal animation finished. Whichever lands
/// second triggers it. Once fired for a session id it never fires again,
/// even if further terminal-equivalent snapshots or errors arrive.
#[derive(Debug, Default)]
pub struct NotificationGate {
    terminal: HashSet<SessionId>,
    animated: HashSet<SessionId>,
    notified: HashSet<SessionId>,
}

impl NotificationGate {
    /// Creates an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the session reached a terminal status.
    pub fn mark_terminal(&mut self, id: SessionId) {
        self.terminal.insert(id);
    }

    /// Records that the reveal animation finished for the session.
    pub fn mark_animation_complete(&mut self, id: SessionId) {
        self.animated.insert(id);
    }

    /// Returns true exactly once per session, when both conditions have
    /// been recorded. Subsequent calls return false forever.
    pub fn should_notify(&mut self, id: SessionId) -> bool {
        if self.notified.contains(&id) {
            return false;
        }
        if self.terminal.contains(&id) && self.animated.contains(&id) {
            self.notified.insert(id);
            metrics::counter!("terminal_notifications_total").increment(1);
            return true;
        }
        false
    }

    /// Returns true if the notification already fired for this session.
    pub fn is_notified(&self, id: SessionId) -> bool {
        self.notified.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_both_conditions() {
        let mut gate = NotificationGate::new();
        let id = SessionId::new();

        assert!(!gate.should_notify(id));
        gate.mark_terminal(id);
        assert!(!gate.should_notify(id));
        gate.mark_animation_complete(id);
        assert!(gate.should_notify(id));
    }

    #[test]
    fn later_condition_triggers_regardless_of_order() {
        let mut gate = NotificationGate::new();
        let id = SessionId::new();

        gate.mark_animation_complete(id);
        assert!(!gate.should_notify(id));
        gate.mark_terminal(id);
        assert!(gate.should_notify(id));
    }

    #[test]
    fn fires_exactly_once() {
        let mut gate = NotificationGate::new();
        let id = SessionId::new();
        gate.mark_terminal(id);
        gate.mark_animation_complete(id);

        assert!(gate.should_notify(id));
        assert!(!gate.should_notify(id));

        // Repeated terminal-equivalent marks change nothing.
        gate.mark_terminal(id);
        gate.mark_animation_complete(id);
        assert!(!gate.should_notify(id));
        assert!(gate.is_notified(id));
    }

    #[test]
    fn sessions_are_gated_independently() {
        let mut gate = NotificationGate::new();
        let a = SessionId::new();
        let b = SessionId::new();

        gate.mark_terminal(a);
        gate.mark_animation_complete(a);
        assert!(gate.should_notify(a));

        gate.mark_terminal(b);
        assert!(!gate.should_notify(b));
        gate.mark_animation_complete(b);
        assert!(gate.should_notify(b));
    }
}
