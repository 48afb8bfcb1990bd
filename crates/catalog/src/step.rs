//! Step and variant definitions.

use serde::{Deserialize, Serialize};

/// The order variant, fixed at submission time.
///
/// The variant selects which forward catalog applies: limit orders skip
/// the market-price lookup because the price comes from the order itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderVariant {
    /// Execute at the current market price.
    #[default]
    Market,

    /// Execute only at the given limit price or better.
    Limit,
}

impl OrderVariant {
    /// Returns the variant name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderVariant::Market => "MARKET",
            OrderVariant::Limit => "LIMIT",
        }
    }
}

impl std::fmt::Display for OrderVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A saga step identifier as reported by the backend.
///
/// Forward steps and compensation steps share one id space; which of them
/// are meaningful at any moment is decided by the active catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepId {
    // Forward flow
    CreateOrder,
    VerifyTradingPermission,
    VerifyAccountStatus,
    ValidateStock,
    GetMarketPrice,
    CalculateRequiredFunds,
    ReserveFunds,
    UpdateOrderValidated,
    SubmitOrder,
    UpdateOrderExecuted,
    UpdatePortfolio,
    SettleTransaction,
    UpdateOrderCompleted,
    CompleteSaga,

    // Compensation flow
    ReverseSettlement,
    RemovePositions,
    CancelBrokerOrder,
    ReleaseFunds,
    CancelOrder,
}

impl StepId {
    /// Returns the human-readable name shown in the progress view.
    pub const fn display_name(&self) -> &'static str {
        match self {
            StepId::CreateOrder => "Create Order",
            StepId::VerifyTradingPermission => "Verify Permission",
            StepId::VerifyAccountStatus => "Verify Account",
            StepId::ValidateStock => "Validate Stock",
            StepId::GetMarketPrice => "Get Price",
            StepId::CalculateRequiredFunds => "Calculate Funds",
            StepId::ReserveFunds => "Reserve Funds",
            StepId::UpdateOrderValidated => "Validate Order",
            StepId::SubmitOrder => "Execute Order",
            StepId::UpdateOrderExecuted => "Update Order",
            StepId::UpdatePortfolio => "Update Portfolio",
            StepId::SettleTransaction => "Settle Transaction",
            StepId::UpdateOrderCompleted => "Complete Order",
            StepId::CompleteSaga => "Complete",
            StepId::ReverseSettlement => "Reverse Settlement",
            StepId::RemovePositions => "Remove Positions",
            StepId::CancelBrokerOrder => "Cancel Broker Order",
            StepId::ReleaseFunds => "Release Reserved Funds",
            StepId::CancelOrder => "Cancel Order",
        }
    }
}

/// An immutable step entry within one catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition {
    /// The step identifier.
    pub id: StepId,
    /// Human-readable name for display.
    pub display_name: &'static str,
    /// Position within the owning catalog, starting at zero.
    pub ordinal: usize,
}
