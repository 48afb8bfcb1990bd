//! Static step catalogs for the order saga.
//!
//! The backend executes a fixed forward step sequence per order variant
//! (limit orders skip the market-price lookup) and, on rollback, a
//! compensation sequence whose length depends on how far forward progress
//! had already gone. This crate owns those sequences and the pure
//! derivation rule; it has no runtime dependencies.

mod compensation;
mod flows;
mod step;

pub use compensation::derive_compensation_steps;
pub use flows::{compensation_steps, forward_steps, ordinal_in};
pub use step::{OrderVariant, StepDefinition, StepId};
