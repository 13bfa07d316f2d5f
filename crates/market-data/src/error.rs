use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("The market-data request timed out")]
    Timeout,

    #[error("The market-data request failed: {0}")]
    Http(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("Provider quoted a non-positive price for {symbol}: {price}")]
    NonPositivePrice { symbol: String, price: String },
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MarketDataError::Timeout
        } else if err.is_decode() {
            MarketDataError::Deserialization(err.to_string())
        } else {
            MarketDataError::Http(err.to_string())
        }
    }
}
