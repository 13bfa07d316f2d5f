//! # Execution Engine
//!
//! The order-execution core. Given a buy or sell request it validates
//! funds/holdings, prices the trade, applies the balance and position change
//! as one guarded atomic write, and records the fill in the order ledger.
//!
//! ## Architectural Principles
//!
//! - **One atomic section per trade:** the funds/holdings check and the
//!   balance write happen inside a single guarded `apply_trade`, against one
//!   consistent snapshot and one fetched price. Two concurrent buys on the
//!   same account can never both pass a check against cash only one of them
//!   will still have.
//! - **Ledger after state, or neither:** the fill record is appended only
//!   after the balance write succeeds; if the append fails, the engine
//!   applies the inverse delta so neither effect survives.

use account_store::{AccountStore, Rejection, StoreError, TradeGuard};
use chrono::Utc;
use configuration::EngineSettings;
use core_types::{Order, OrderSide, PricePoint, TradeReceipt};
use ledger::OrderLedger;
use market_data::{MarketDataError, MarketDataGateway, SymbolCatalog};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

pub mod error;

pub use error::EngineError;

/// The account ledger and order-execution core.
pub struct ExecutionEngine {
    gateway: Arc<dyn MarketDataGateway>,
    store: Arc<dyn AccountStore>,
    ledger: Arc<dyn OrderLedger>,
    catalog: SymbolCatalog,
    settings: EngineSettings,
}

impl ExecutionEngine {
    pub fn new(
        gateway: Arc<dyn MarketDataGateway>,
        store: Arc<dyn AccountStore>,
        ledger: Arc<dyn OrderLedger>,
        catalog: SymbolCatalog,
        settings: EngineSettings,
    ) -> Self {
        Self {
            gateway,
            store,
            ledger,
            catalog,
            settings,
        }
    }

    /// Buys `units` of `symbol` for the account at the current market price.
    ///
    /// Fails without any state change on invalid units, an unknown symbol,
    /// an unavailable price, or insufficient cash.
    pub async fn buy(
        &self,
        account_id: &str,
        symbol: &str,
        units: i64,
    ) -> Result<TradeReceipt, EngineError> {
        let units = validate_units(units)?;
        if !self.catalog.contains(symbol) {
            return Err(EngineError::UnknownSymbol(symbol.to_string()));
        }

        let price = self.fetch_price(symbol).await?;
        self.execute(account_id, symbol, OrderSide::Buy, units, price)
            .await
    }

    /// Sells `units` of `symbol` from the account at the current market price.
    ///
    /// Holdings are pre-checked before the price lookup so an obviously
    /// doomed request never costs a gateway round-trip; the authoritative
    /// check is still the guard at apply time.
    pub async fn sell(
        &self,
        account_id: &str,
        symbol: &str,
        units: i64,
    ) -> Result<TradeReceipt, EngineError> {
        let units = validate_units(units)?;

        let owned = self
            .store
            .units(account_id, symbol)
            .await
            .map_err(storage_failure)?;
        if units > owned {
            return Err(EngineError::InsufficientHoldings {
                requested: units,
                owned,
            });
        }

        let price = self.fetch_price(symbol).await?;
        self.execute(account_id, symbol, OrderSide::Sell, units, price)
            .await
    }

    /// Read-only snapshot of the account's symbol→units mapping. An account
    /// with no holdings yields an empty map, not an error.
    pub async fn positions(&self, account_id: &str) -> Result<HashMap<String, u64>, EngineError> {
        self.store
            .positions(account_id)
            .await
            .map_err(storage_failure)
    }

    /// Historical price series passthrough. Touches no account state.
    pub async fn history(
        &self,
        symbol: &str,
        timeframe: &str,
    ) -> Result<Vec<PricePoint>, EngineError> {
        if !self.catalog.contains(symbol) {
            return Err(EngineError::UnknownSymbol(symbol.to_string()));
        }

        self.gateway
            .price_series(symbol, timeframe)
            .await
            .map_err(|err| match err {
                MarketDataError::UnknownSymbol(s) => EngineError::UnknownSymbol(s),
                MarketDataError::InvalidTimeframe(tf) => EngineError::InvalidTimeframe(tf),
                other => EngineError::HistoryUnavailable(other),
            })
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, EngineError> {
        let price = self
            .gateway
            .spot_price(symbol)
            .await
            .map_err(EngineError::PriceUnavailable)?;
        if price <= Decimal::ZERO {
            return Err(EngineError::PriceUnavailable(
                MarketDataError::NonPositivePrice {
                    symbol: symbol.to_string(),
                    price: price.to_string(),
                },
            ));
        }
        Ok(price)
    }

    /// The shared execution path: one guarded atomic state write, then the
    /// ledger append, with the write undone if the append fails.
    async fn execute(
        &self,
        account_id: &str,
        symbol: &str,
        side: OrderSide,
        units: u64,
        price: Decimal,
    ) -> Result<TradeReceipt, EngineError> {
        // The order record is built first and its deltas drive the state
        // write, so the ledger entry and the store mutation can never
        // disagree about what the trade did.
        let order = Order::new(account_id, symbol, side, units, price, Utc::now())
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        let outcome = self.apply_with_retry(&order).await?;

        if let Err(append_err) = self.ledger.append(order.clone()).await {
            // Strict atomicity: a fill that was never recorded must not have
            // happened. Undo the state write with an unchecked guard (the
            // inverse of an admitted trade may transiently cross a floor).
            let rollback = self
                .store
                .apply_trade(
                    account_id,
                    symbol,
                    -order.cash_delta(),
                    -order.units_delta(),
                    TradeGuard::unchecked(),
                )
                .await;
            if let Err(rollback_err) = rollback {
                tracing::error!(
                    account_id,
                    symbol,
                    error = %rollback_err,
                    "Failed to roll back a trade after a ledger outage; store and ledger have diverged"
                );
            }
            return Err(EngineError::StorageFailure(append_err.to_string()));
        }

        tracing::info!(
            account_id,
            symbol,
            side = ?side,
            units,
            price = %price,
            total = %order.total_value,
            remaining_cash = %outcome.cash,
            "Executed order"
        );

        Ok(TradeReceipt {
            total_value: order.total_value,
            remaining_cash: outcome.cash,
        })
    }

    /// Applies the order's deltas, retrying transient write conflicts a
    /// bounded number of times. Business-rule rejections are terminal and
    /// never retried.
    async fn apply_with_retry(
        &self,
        order: &Order,
    ) -> Result<account_store::TradeOutcome, EngineError> {
        let mut attempts = 0;
        loop {
            match self
                .store
                .apply_trade(
                    &order.account_id,
                    &order.symbol,
                    order.cash_delta(),
                    order.units_delta(),
                    TradeGuard::non_negative(),
                )
                .await
            {
                Ok(outcome) => return Ok(outcome),
                Err(StoreError::Conflict) => {
                    attempts += 1;
                    if attempts > self.settings.max_conflict_retries {
                        return Err(EngineError::StorageFailure(format!(
                            "write conflict persisted through {} retries",
                            self.settings.max_conflict_retries
                        )));
                    }
                    tracing::debug!(
                        account_id = %order.account_id,
                        attempts,
                        "Retrying conflicted trade write"
                    );
                }
                Err(StoreError::Rejected(Rejection::Cash { available })) => {
                    return Err(EngineError::InsufficientFunds {
                        required: order.total_value,
                        available,
                    });
                }
                Err(StoreError::Rejected(Rejection::Units { owned })) => {
                    return Err(EngineError::InsufficientHoldings {
                        requested: order.units,
                        owned,
                    });
                }
                Err(StoreError::Storage(message)) => {
                    return Err(EngineError::StorageFailure(message));
                }
            }
        }
    }
}

fn validate_units(units: i64) -> Result<u64, EngineError> {
    if units <= 0 {
        return Err(EngineError::InvalidUnits(units));
    }
    Ok(units as u64)
}

fn storage_failure(err: StoreError) -> EngineError {
    EngineError::StorageFailure(err.to_string())
}
