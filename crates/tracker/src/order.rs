//! Order submission request.

use catalog::OrderVariant;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// How long an order stays working before it expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Valid for the current trading day.
    #[default]
    Day,
    /// Valid until explicitly cancelled.
    GoodTilCancelled,
}

/// The payload sent to the submission service, one per user-initiated
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Trading account the order executes against.
    pub account_id: String,
    /// Instrument symbol.
    #[serde(rename = "stockSymbol")]
    pub symbol: String,
    /// Order variant; fixes which step catalog applies.
    #[serde(rename = "orderType")]
    pub variant: OrderVariant,
    /// Number of shares.
    pub quantity: u32,
    /// Required for limit orders, absent for market orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<f64>,
    /// Order lifetime.
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// Creates a market order request.
    pub fn market(account_id: impl Into<String>, symbol: impl Into<String>, quantity: u32) -> Self {
        Self {
            account_id: account_id.into(),
            symbol: symbol.into(),
            variant: OrderVariant::Market,
            quantity,
            limit_price: None,
            time_in_force: TimeInForce::Day,
        }
    }

    /// Creates a limit order request at the given price.
    pub fn limit(
        account_id: impl Into<String>,
        symbol: impl Into<String>,
        quantity: u32,
        limit_price: f64,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            symbol: symbol.into(),
            variant: OrderVariant::Limit,
            quantity,
            limit_price: Some(limit_price),
            time_in_force: TimeInForce::Day,
        }
    }

    /// Sets the time in force.
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Validates the request before submission.
    pub fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(TrackerError::InvalidOrder(
                "quantity must be greater than zero".to_string(),
            ));
        }
        match (self.variant, self.limit_price) {
            (OrderVariant::Limit, None) => Err(TrackerError::InvalidOrder(
                "limit orders require a limit price".to_string(),
            )),
            (OrderVariant::Limit, Some(price)) if price <= 0.0 => Err(TrackerError::InvalidOrder(
                "limit price must be positive".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
