use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side of the order
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    /// The sign of the cash movement for this side: negative for a buy
    /// (cash leaves the account), positive for a sell.
    pub fn cash_sign(&self) -> i64 {
        match self {
            OrderSide::Buy => -1,
            OrderSide::Sell => 1,
        }
    }
}
