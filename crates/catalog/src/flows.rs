//! The ordered step sequences for each transaction variant.

use crate::step::{OrderVariant, StepDefinition, StepId};

const fn def(id: StepId, ordinal: usize) -> StepDefinition {
    StepDefinition {
        id,
        display_name: id.display_name(),
        ordinal,
    }
}

/// Forward flow for market orders.
static MARKET_FLOW: [StepDefinition; 14] = [
    def(StepId::CreateOrder, 0),
    def(StepId::VerifyTradingPermission, 1),
    def(StepId::VerifyAccountStatus, 2),
    def(StepId::ValidateStock, 3),
    def(StepId::GetMarketPrice, 4),
    def(StepId::CalculateRequiredFunds, 5),
    def(StepId::ReserveFunds, 6),
    def(StepId::UpdateOrderValidated, 7),
    def(StepId::SubmitOrder, 8),
    def(StepId::UpdateOrderExecuted, 9),
    def(StepId::UpdatePortfolio, 10),
    def(StepId::SettleTransaction, 11),
    def(StepId::UpdateOrderCompleted, 12),
    def(StepId::CompleteSaga, 13),
];

/// Forward flow for limit orders. The market-price lookup is skipped
/// because the limit price is supplied with the order.
static LIMIT_FLOW: [StepDefinition; 13] = [
    def(StepId::CreateOrder, 0),
    def(StepId::VerifyTradingPermission, 1),
    def(StepId::VerifyAccountStatus, 2),
    def(StepId::ValidateStock, 3),
    def(StepId::CalculateRequiredFunds, 4),
    def(StepId::ReserveFunds, 5),
    def(StepId::UpdateOrderValidated, 6),
    def(StepId::SubmitOrder, 7),
    def(StepId::UpdateOrderExecuted, 8),
    def(StepId::UpdatePortfolio, 9),
    def(StepId::SettleTransaction, 10),
    def(StepId::UpdateOrderCompleted, 11),
    def(StepId::CompleteSaga, 12),
];

/// Master compensation flow, in execution order. A rollback runs a
/// contiguous suffix of this list; see [`crate::derive_compensation_steps`].
static COMPENSATION_FLOW: [StepDefinition; 5] = [
    def(StepId::ReverseSettlement, 0),
    def(StepId::RemovePositions, 1),
    def(StepId::CancelBrokerOrder, 2),
    def(StepId::ReleaseFunds, 3),
    def(StepId::CancelOrder, 4),
];

/// Returns the ordered forward step sequence for the given variant.
pub fn forward_steps(variant: OrderVariant) -> &'static [StepDefinition] {
    match variant {
        OrderVariant::Market => &MARKET_FLOW,
        OrderVariant::Limit => &LIMIT_FLOW,
    }
}

/// Returns the master compensation flow in execution order.
pub fn compensation_steps() -> &'static [StepDefinition] {
    &COMPENSATION_FLOW
}

/// Returns the position of `step` within `catalog`, or `None` if the step
/// does not belong to that catalog.
pub fn ordinal_in(catalog: &[StepDefinition], step: StepId) -> Option<usize> {
    catalog.iter().position(|s| s.id == step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_flow_has_fourteen_steps_in_order() {
        let steps = forward_steps(OrderVariant::Market);
        assert_eq!(steps.len(), 14);
        assert_eq!(steps[0].id, StepId::CreateOrder);
        assert_eq!(steps[13].id, StepId::CompleteSaga);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.ordinal, i);
        }
    }

    #[test]
    fn limit_flow_skips_market_price() {
        let steps = forward_steps(OrderVariant::Limit);
        assert_eq!(steps.len(), 13);
        assert!(steps.iter().all(|s| s.id != StepId::GetMarketPrice));
        // Ordinals stay contiguous after the skip.
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.ordinal, i);
        }
    }

    #[test]
    fn compensation_flow_order() {
        let steps = compensation_steps();
        let ids: Vec<StepId> = steps.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            [
                StepId::ReverseSettlement,
                StepId::RemovePositions,
                StepId::CancelBrokerOrder,
                StepId::ReleaseFunds,
                StepId::CancelOrder,
            ]
        );
    }

    #[test]
    fn ordinal_lookup() {
        let market = forward_steps(OrderVariant::Market);
        let limit = forward_steps(OrderVariant::Limit);
        assert_eq!(ordinal_in(market, StepId::GetMarketPrice), Some(4));
        assert_eq!(ordinal_in(limit, StepId::GetMarketPrice), None);
        assert_eq!(ordinal_in(limit, StepId::CalculateRequiredFunds), Some(4));
        assert_eq!(ordinal_in(market, StepId::ReleaseFunds), None);
    }

    #[test]
    fn display_names_follow_step() {
        let steps = forward_steps(OrderVariant::Market);
        assert_eq!(steps[8].display_name, "Execute Order");
    }
}
