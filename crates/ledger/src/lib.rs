//! # Order Ledger
//!
//! The append-only log of executed orders, one record per fill. The ledger
//! is the audit source of truth: replaying an account's records in order
//! reconstructs its cash and position deltas exactly. No update or delete
//! operation exists, by contract.

use async_trait::async_trait;
use core_types::Order;
use std::sync::RwLock;
use uuid::Uuid;

pub mod error;

pub use error::LedgerError;

/// Append-only storage for executed orders.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Appends one executed order and returns its id. Fails only on a
    /// storage outage, which the caller must treat as fatal to the trade.
    async fn append(&self, order: Order) -> Result<Uuid, LedgerError>;

    /// All orders for an account, oldest first.
    async fn list_by_account(&self, account_id: &str) -> Result<Vec<Order>, LedgerError>;
}

/// The in-process ledger: a single append-only vector. Orders arrive already
/// timestamped; append order is execution order because each trade appends
/// before its account lock is released to the next trade.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    orders: RwLock<Vec<Order>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|orders| orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderLedger for MemoryLedger {
    async fn append(&self, order: Order) -> Result<Uuid, LedgerError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        let order_id = order.order_id;
        tracing::debug!(
            account_id = %order.account_id,
            symbol = %order.symbol,
            side = ?order.side,
            units = order.units,
            %order_id,
            "Recorded order"
        );
        orders.push(order);
        Ok(order_id)
    }

    async fn list_by_account(&self, account_id: &str) -> Result<Vec<Order>, LedgerError> {
        let orders = self
            .orders
            .read()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        Ok(orders
            .iter()
            .filter(|order| order.account_id == account_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::OrderSide;
    use rust_decimal_macros::dec;

    fn order(account_id: &str, units: u64) -> Order {
        Order::new(account_id, "ACME", OrderSide::Buy, units, dec!(50), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn lists_only_the_requested_account_in_append_order() {
        let ledger = MemoryLedger::new();
        let first = ledger.append(order("acct-1", 1)).await.unwrap();
        ledger.append(order("acct-2", 2)).await.unwrap();
        let third = ledger.append(order("acct-1", 3)).await.unwrap();

        let listed = ledger.list_by_account("acct-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].order_id, first);
        assert_eq!(listed[1].order_id, third);
    }

    #[tokio::test]
    async fn unknown_account_lists_empty() {
        let ledger = MemoryLedger::new();
        assert!(ledger.list_by_account("nobody").await.unwrap().is_empty());
        assert!(ledger.is_empty());
    }
}
