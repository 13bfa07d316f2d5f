use crate::error::MarketDataError;
use crate::responses::{HistoryResponse, ProviderErrorResponse, QuoteResponse};
use crate::MarketDataGateway;
use async_trait::async_trait;
use configuration::MarketDataSettings;
use core_types::PricePoint;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A concrete implementation of the `MarketDataGateway` over the provider's
/// HTTP API.
///
/// Every request carries the configured deadline; an expired deadline is
/// reported as `MarketDataError::Timeout` rather than hanging the caller.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(settings: &MarketDataSettings) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| MarketDataError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        symbol: &str,
        timeframe: Option<&str>,
    ) -> Result<T, MarketDataError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        // The provider distinguishes a symbol it has never heard of from a
        // malformed timeframe; map both onto our own taxonomy and fold the
        // rest into a generic HTTP failure.
        let text = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ProviderErrorResponse>(&text) {
            Ok(body) => format!("{} (code {}): {}", status, body.code, body.msg),
            Err(_) => format!("{}: {}", status, text),
        };
        match status {
            StatusCode::NOT_FOUND => Err(MarketDataError::UnknownSymbol(symbol.to_string())),
            StatusCode::BAD_REQUEST => match timeframe {
                Some(tf) => Err(MarketDataError::InvalidTimeframe(tf.to_string())),
                None => Err(MarketDataError::Http(detail)),
            },
            _ => Err(MarketDataError::Http(detail)),
        }
    }
}

#[async_trait]
impl MarketDataGateway for HttpGateway {
    async fn spot_price(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        let url = format!("{}/quote/{}", self.base_url, symbol);
        let quote: QuoteResponse = self.get_json(&url, symbol, None).await?;

        if quote.price <= Decimal::ZERO {
            return Err(MarketDataError::NonPositivePrice {
                symbol: symbol.to_string(),
                price: quote.price.to_string(),
            });
        }

        tracing::debug!(symbol, price = %quote.price, "Fetched spot price");
        Ok(quote.price)
    }

    async fn price_series(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let url = format!(
            "{}/history/{}?timeframe={}",
            self.base_url, symbol, timeframe
        );
        let history: HistoryResponse = self.get_json(&url, symbol, Some(timeframe)).await?;

        tracing::debug!(
            symbol,
            timeframe,
            points = history.points.len(),
            "Fetched price series"
        );
        Ok(history.points.into_iter().map(Into::into).collect())
    }
}
