//! Compensation-chain derivation.

use crate::flows::compensation_steps;
use crate::step::{StepDefinition, StepId};

/// Selects the compensation steps that undo the forward progress recorded
/// in `completed`.
///
/// The rule inspects the highest forward milestone reached and returns the
/// corresponding contiguous suffix of the master compensation flow:
///
/// | milestone reached        | compensation steps                       |
/// |--------------------------|------------------------------------------|
/// | transaction settled      | all five, from `ReverseSettlement`       |
/// | portfolio updated        | last four, from `RemovePositions`        |
/// | order executed/validated | last three, from `CancelBrokerOrder`     |
/// | funds reserved           | last two, from `ReleaseFunds`            |
/// | none of the above        | `CancelOrder` only                       |
///
/// The result is computed once on compensation entry and held immutable
/// for the rest of the session.
pub fn derive_compensation_steps(completed: &[StepId]) -> &'static [StepDefinition] {
    let reached = |step| completed.contains(&step);

    let start = if reached(StepId::SettleTransaction) {
        0
    } else if reached(StepId::UpdatePortfolio) {
        1
    } else if reached(StepId::UpdateOrderExecuted) || reached(StepId::UpdateOrderValidated) {
        2
    } else if reached(StepId::ReserveFunds) {
        3
    } else {
        4
    };

    &compensation_steps()[start..]
}
