//! Mock market-data gateway for tests and offline runs.

use crate::error::MarketDataError;
use crate::MarketDataGateway;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use core_types::PricePoint;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

/// A `MarketDataGateway` backed by a price table instead of a provider.
///
/// Prices can be changed between calls, and the whole gateway can be switched
/// into a failing mode to exercise unavailable-provider paths.
#[derive(Debug, Default)]
pub struct MockGateway {
    prices: RwLock<HashMap<String, Decimal>>,
    failing: RwLock<bool>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a gateway quoting one fixed price for a single symbol.
    pub fn with_price(symbol: &str, price: Decimal) -> Self {
        let gateway = Self::new();
        gateway.set_price(symbol, price);
        gateway
    }

    /// Sets (or changes) the quoted price for a symbol.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        let mut prices = self.prices.write().unwrap();
        prices.insert(symbol.to_string(), price);
    }

    /// When set, every call fails with a timeout until cleared.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.write().unwrap() = failing;
    }

    fn check_available(&self) -> Result<(), MarketDataError> {
        if *self.failing.read().unwrap() {
            return Err(MarketDataError::Timeout);
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataGateway for MockGateway {
    async fn spot_price(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        self.check_available()?;
        let prices = self.prices.read().unwrap();
        prices
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))
    }

    async fn price_series(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        self.check_available()?;
        if timeframe.is_empty() {
            return Err(MarketDataError::InvalidTimeframe(timeframe.to_string()));
        }

        let price = self.spot_price(symbol).await?;
        let now = Utc::now();

        // A flat three-point series is enough for callers that only assert
        // on shape and ordering.
        Ok((0..3)
            .rev()
            .map(|days_back| PricePoint {
                timestamp: now - Duration::days(days_back),
                price,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn quotes_the_configured_price() {
        let gateway = MockGateway::with_price("ACME", dec!(50));
        assert_eq!(gateway.spot_price("ACME").await.unwrap(), dec!(50));
    }

    #[tokio::test]
    async fn unknown_symbol_is_an_error() {
        let gateway = MockGateway::new();
        assert!(matches!(
            gateway.spot_price("NOPE").await,
            Err(MarketDataError::UnknownSymbol(_))
        ));
    }

    #[tokio::test]
    async fn failing_mode_times_out_every_call() {
        let gateway = MockGateway::with_price("ACME", dec!(50));
        gateway.set_failing(true);
        assert!(matches!(
            gateway.spot_price("ACME").await,
            Err(MarketDataError::Timeout)
        ));
        assert!(matches!(
            gateway.price_series("ACME", "1d").await,
            Err(MarketDataError::Timeout)
        ));
    }

    #[tokio::test]
    async fn series_is_ordered_oldest_first() {
        let gateway = MockGateway::with_price("ACME", dec!(50));
        let series = gateway.price_series("ACME", "1d").await.unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
