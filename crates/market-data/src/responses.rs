use chrono::{DateTime, Utc};
use core_types::PricePoint;
use rust_decimal::Decimal;
use serde::Deserialize;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// The response from a successful `GET /quote/{symbol}` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub symbol: String,
    pub price: Decimal,
}

/// The response from a successful `GET /history/{symbol}` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub symbol: String,
    pub timeframe: String,
    pub points: Vec<HistoryPoint>,
}

/// A single bar of the historical series, as the provider encodes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl From<HistoryPoint> for PricePoint {
    fn from(point: HistoryPoint) -> Self {
        PricePoint {
            timestamp: point.timestamp,
            price: point.price,
        }
    }
}

/// Represents an error body from the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorResponse {
    pub code: i16,
    pub msg: String,
}
