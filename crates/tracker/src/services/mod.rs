//! External collaborator traits and in-memory test doubles.
//!
//! The tracker consumes three backend services, specified only at their
//! interface boundary: order submission, status query, and cancellation.
//! Step execution itself lives entirely behind these traits.

pub mod cancellation;
pub mod status;
pub mod submission;

pub use cancellation::{InMemoryCancellationService, OrderCancellationService};
pub use status::{ScriptedStatusService, StatusQueryService};
pub use submission::{InMemorySubmissionService, OrderSubmissionService};
