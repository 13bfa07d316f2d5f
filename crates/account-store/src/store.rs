use crate::error::{Rejection, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// The predicate checked atomically with a trade write.
///
/// A trade is admitted only if the *post-trade* cash and unit count stay at
/// or above these floors. The default floors of zero are exactly the ledger
/// invariants: cash never negative, holdings never negative.
#[derive(Debug, Clone, Copy)]
pub struct TradeGuard {
    pub min_cash: Decimal,
    pub min_units: i64,
}

impl TradeGuard {
    /// The standard guard: the trade must not drive cash or holdings
    /// below zero.
    pub fn non_negative() -> Self {
        Self {
            min_cash: Decimal::ZERO,
            min_units: 0,
        }
    }

    /// A guard that admits any post-state. Used only for compensating
    /// writes that undo a previously admitted trade.
    pub fn unchecked() -> Self {
        Self {
            min_cash: Decimal::MIN,
            min_units: i64::MIN,
        }
    }
}

impl Default for TradeGuard {
    fn default() -> Self {
        Self::non_negative()
    }
}

/// The post-trade state of the touched account slice, returned so callers
/// never need a follow-up read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeOutcome {
    pub cash: Decimal,
    pub units: u64,
}

/// Durable holder of per-account cash and unit holdings.
///
/// `apply_trade` collapses "read balance, check, write" into one atomic step;
/// implementations must evaluate the guard and apply the deltas under the
/// same lock or transaction. Reads may serve a slightly stale snapshot.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn cash(&self, account_id: &str) -> Result<Decimal, StoreError>;

    async fn units(&self, account_id: &str, symbol: &str) -> Result<u64, StoreError>;

    /// Snapshot of the full symbol→units mapping. Empty for an account with
    /// no holdings; never an error.
    async fn positions(&self, account_id: &str) -> Result<HashMap<String, u64>, StoreError>;

    /// Applies `cash_delta` and `units_delta` to one account's state if and
    /// only if the guard admits the post-state. Rejection leaves the account
    /// untouched.
    async fn apply_trade(
        &self,
        account_id: &str,
        symbol: &str,
        cash_delta: Decimal,
        units_delta: i64,
        guard: TradeGuard,
    ) -> Result<TradeOutcome, StoreError>;
}

#[derive(Debug)]
struct AccountState {
    cash: Decimal,
    positions: HashMap<String, u64>,
}

impl AccountState {
    fn units(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }
}

/// The in-process `AccountStore`.
///
/// Accounts are created implicitly on first write with the configured opening
/// balance. Each account sits behind its own mutex, so trades on different
/// accounts never serialize against each other; the outer map lock is held
/// only long enough to locate the entry.
#[derive(Debug)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, Arc<Mutex<AccountState>>>>,
    opening_cash: Decimal,
}

impl MemoryStore {
    pub fn new(opening_cash: Decimal) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            opening_cash,
        }
    }

    /// Returns the entry for an account, materializing it with the opening
    /// balance on first reference.
    fn entry(&self, account_id: &str) -> Result<Arc<Mutex<AccountState>>, StoreError> {
        {
            let accounts = self
                .accounts
                .read()
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            if let Some(entry) = accounts.get(account_id) {
                return Ok(Arc::clone(entry));
            }
        }

        let mut accounts = self
            .accounts
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        let entry = accounts
            .entry(account_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(AccountState {
                    cash: self.opening_cash,
                    positions: HashMap::new(),
                }))
            });
        Ok(Arc::clone(entry))
    }

    /// Looks up an account without materializing it.
    fn peek(&self, account_id: &str) -> Result<Option<Arc<Mutex<AccountState>>>, StoreError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(accounts.get(account_id).map(Arc::clone))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn cash(&self, account_id: &str) -> Result<Decimal, StoreError> {
        match self.peek(account_id)? {
            Some(entry) => {
                let state = entry.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
                Ok(state.cash)
            }
            // Not yet materialized: the projection an implicit creation
            // would produce.
            None => Ok(self.opening_cash),
        }
    }

    async fn units(&self, account_id: &str, symbol: &str) -> Result<u64, StoreError> {
        match self.peek(account_id)? {
            Some(entry) => {
                let state = entry.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
                Ok(state.units(symbol))
            }
            None => Ok(0),
        }
    }

    async fn positions(&self, account_id: &str) -> Result<HashMap<String, u64>, StoreError> {
        match self.peek(account_id)? {
            Some(entry) => {
                let state = entry.lock().map_err(|e| StoreError::Storage(e.to_string()))?;
                Ok(state.positions.clone())
            }
            None => Ok(HashMap::new()),
        }
    }

    async fn apply_trade(
        &self,
        account_id: &str,
        symbol: &str,
        cash_delta: Decimal,
        units_delta: i64,
        guard: TradeGuard,
    ) -> Result<TradeOutcome, StoreError> {
        let entry = self.entry(account_id)?;
        let mut state = entry.lock().map_err(|e| StoreError::Storage(e.to_string()))?;

        // Guard and write under the same lock: nothing can change the
        // account between the check and the mutation.
        let post_cash = state.cash + cash_delta;
        if post_cash < guard.min_cash {
            return Err(StoreError::Rejected(Rejection::Cash {
                available: state.cash,
            }));
        }

        let owned = state.units(symbol);
        let post_units = owned as i64 + units_delta;
        if post_units < guard.min_units {
            return Err(StoreError::Rejected(Rejection::Units { owned }));
        }

        state.cash = post_cash;
        if post_units <= 0 {
            // Flat positions are dropped rather than kept at zero.
            state.positions.remove(symbol);
        } else {
            state
                .positions
                .insert(symbol.to_string(), post_units as u64);
        }

        tracing::trace!(
            account_id,
            symbol,
            %cash_delta,
            units_delta,
            cash = %state.cash,
            "Applied trade"
        );

        Ok(TradeOutcome {
            cash: state.cash,
            units: post_units.max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn store() -> MemoryStore {
        MemoryStore::new(dec!(1000))
    }

    #[tokio::test]
    async fn first_reference_materializes_the_opening_balance() {
        let store = store();
        assert_eq!(store.cash("acct-1").await.unwrap(), dec!(1000));
        assert!(store.positions("acct-1").await.unwrap().is_empty());

        let outcome = store
            .apply_trade("acct-1", "ACME", dec!(-500), 10, TradeGuard::non_negative())
            .await
            .unwrap();
        assert_eq!(outcome.cash, dec!(500));
        assert_eq!(outcome.units, 10);
    }

    #[tokio::test]
    async fn overdraft_is_rejected_without_mutation() {
        let store = store();
        let err = store
            .apply_trade("acct-1", "ACME", dec!(-1500), 10, TradeGuard::non_negative())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected(Rejection::Cash { available }) if available == dec!(1000)
        ));
        assert_eq!(store.cash("acct-1").await.unwrap(), dec!(1000));
        assert_eq!(store.units("acct-1", "ACME").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn overselling_is_rejected_without_mutation() {
        let store = store();
        store
            .apply_trade("acct-1", "ACME", dec!(-500), 10, TradeGuard::non_negative())
            .await
            .unwrap();

        let err = store
            .apply_trade("acct-1", "ACME", dec!(900), -15, TradeGuard::non_negative())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rejected(Rejection::Units { owned: 10 })
        ));
        assert_eq!(store.cash("acct-1").await.unwrap(), dec!(500));
        assert_eq!(store.units("acct-1", "ACME").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn selling_the_whole_position_drops_it_from_the_snapshot() {
        let store = store();
        store
            .apply_trade("acct-1", "ACME", dec!(-500), 10, TradeGuard::non_negative())
            .await
            .unwrap();
        store
            .apply_trade("acct-1", "ACME", dec!(600), -10, TradeGuard::non_negative())
            .await
            .unwrap();

        assert!(store.positions("acct-1").await.unwrap().is_empty());
        assert_eq!(store.cash("acct-1").await.unwrap(), dec!(1100));
    }

    #[tokio::test]
    async fn accounts_are_isolated_from_each_other() {
        let store = store();
        store
            .apply_trade("acct-1", "ACME", dec!(-1000), 20, TradeGuard::non_negative())
            .await
            .unwrap();

        assert_eq!(store.cash("acct-2").await.unwrap(), dec!(1000));
        assert_eq!(store.units("acct-2", "ACME").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unchecked_guard_admits_a_compensating_negative_state_fix() {
        let store = store();
        store
            .apply_trade("acct-1", "ACME", dec!(-1000), 20, TradeGuard::non_negative())
            .await
            .unwrap();

        // Undoing a sell that already credited cash may transiently need to
        // debit below the guard floor; the unchecked guard admits it.
        let outcome = store
            .apply_trade("acct-1", "ACME", dec!(-100), 2, TradeGuard::unchecked())
            .await
            .unwrap();
        assert_eq!(outcome.cash, dec!(-100));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_guarded_debits_never_overdraw() {
        let store = Arc::new(store());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .apply_trade("acct-1", "ACME", dec!(-1000), 1, TradeGuard::non_negative())
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        // Exactly one debit of the full balance can be admitted.
        assert_eq!(successes, 1);
        assert_eq!(store.cash("acct-1").await.unwrap(), dec!(0));
    }
}
