//! Tracker timing configuration.

use std::time::Duration;

const DEFAULT_POLL_MILLIS: u64 = 1_000;
const DEFAULT_REVEAL_MILLIS: u64 = 300;

/// Timing knobs for polling and step-reveal animation.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Interval between status queries while a session is live.
    pub poll_interval: Duration,
    /// Delay between consecutive step reveals.
    pub reveal_delay: Duration,
}

impl TrackerConfig {
    /// Creates a config with the reference timings: 1 s polls, 300 ms
    /// between reveals.
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_MILLIS),
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_MILLIS),
        }
    }

    /// Overrides the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the reveal delay.
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}
