use crate::enums::OrderSide;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One immutable executed-trade record.
///
/// An `Order` is created exactly once per successful execution and is never
/// mutated or deleted afterwards. `total_value` is the value recorded at
/// execution time (price × units); consumers must not recompute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub account_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub units: u64,
    pub price: Decimal,
    pub total_value: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl Order {
    /// Builds an execution record, deriving `total_value` from the fill price
    /// and unit count. Rejects zero units and non-positive prices so that an
    /// `Order` can only ever describe a real fill.
    pub fn new(
        account_id: impl Into<String>,
        symbol: impl Into<String>,
        side: OrderSide,
        units: u64,
        price: Decimal,
        executed_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if units == 0 {
            return Err(CoreError::InvalidInput(
                "units".to_string(),
                "must be a positive integer".to_string(),
            ));
        }
        if price <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "price".to_string(),
                format!("must be positive, got {}", price),
            ));
        }

        Ok(Self {
            order_id: Uuid::new_v4(),
            account_id: account_id.into(),
            symbol: symbol.into(),
            side,
            units,
            price,
            total_value: price * Decimal::from(units),
            executed_at,
        })
    }

    /// The cash movement this order caused: negative for a buy, positive
    /// for a sell.
    pub fn cash_delta(&self) -> Decimal {
        self.total_value * Decimal::from(self.side.cash_sign())
    }

    /// The position movement this order caused, in units.
    pub fn units_delta(&self) -> i64 {
        -self.side.cash_sign() * self.units as i64
    }
}

/// A single timestamped point in a historical price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// What the caller gets back from a successful buy or sell: the value of the
/// fill and the cash left in the account afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub total_value: Decimal,
    pub remaining_cash: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_derives_total_value_from_price_and_units() {
        let order = Order::new(
            "acct-1",
            "ACME",
            OrderSide::Buy,
            10,
            dec!(50),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(order.total_value, dec!(500));
        assert_eq!(order.cash_delta(), dec!(-500));
        assert_eq!(order.units_delta(), 10);
    }

    #[test]
    fn sell_order_moves_cash_in_and_units_out() {
        let order = Order::new(
            "acct-1",
            "ACME",
            OrderSide::Sell,
            4,
            dec!(60),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(order.cash_delta(), dec!(240));
        assert_eq!(order.units_delta(), -4);
    }

    #[test]
    fn zero_units_is_rejected() {
        let result = Order::new("acct-1", "ACME", OrderSide::Buy, 0, dec!(50), Utc::now());
        assert!(matches!(result, Err(CoreError::InvalidInput(_, _))));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let result = Order::new("acct-1", "ACME", OrderSide::Buy, 1, dec!(0), Utc::now());
        assert!(matches!(result, Err(CoreError::InvalidInput(_, _))));
    }
}
