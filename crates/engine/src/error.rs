use market_data::MarketDataError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Cannot trade {0} units; units must be a positive integer")]
    InvalidUnits(i64),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("No price available for the requested symbol")]
    PriceUnavailable(#[source] MarketDataError),

    #[error("Not enough money to buy. Required: {required}, Available: {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Not enough units to sell. Requested: {requested}, Owned: {owned}")]
    InsufficientHoldings { requested: u64, owned: u64 },

    #[error("No price history available for the requested symbol")]
    HistoryUnavailable(#[source] MarketDataError),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("An unexpected engine state was encountered: {0}")]
    Internal(String),
}
