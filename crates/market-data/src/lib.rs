use async_trait::async_trait;
use core_types::PricePoint;
use rust_decimal::Decimal;

mod catalog;
pub mod error;
mod http;
pub mod mock;
pub mod responses;

// --- Public API ---
pub use catalog::SymbolCatalog;
pub use error::MarketDataError;
pub use http::HttpGateway;
pub use mock::MockGateway;

/// The generic, abstract interface to the market-data provider.
///
/// This trait is the contract the execution engine codes against, allowing
/// the underlying implementation (live HTTP or mock) to be swapped out.
/// Every call may fail; callers treat a failure as "no price for this
/// request", never as a reason to guess one.
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Resolves a symbol to its current price. The returned price is always
    /// positive; a provider quoting zero or less is reported as an error.
    async fn spot_price(&self, symbol: &str) -> Result<Decimal, MarketDataError>;

    /// Fetches the historical price series for a symbol over a timeframe
    /// such as "1d" or "1mo", ordered oldest first.
    async fn price_series(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}
