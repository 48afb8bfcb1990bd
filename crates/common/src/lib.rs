//! Shared identifier types used across the order progress tracker.

mod types;

pub use types::{Generation, SessionId};
