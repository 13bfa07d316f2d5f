//! # Account Store
//!
//! The durable holder of each account's cash balance and per-symbol unit
//! holdings. Its one non-trivial obligation is `apply_trade`: the guard
//! predicate and the balance write are evaluated as a single indivisible
//! step, which removes the check-then-act race a separate
//! read-validate-write sequence would have.
//!
//! ## Public API
//!
//! - `AccountStore`: the storage contract the engine codes against.
//! - `MemoryStore`: the in-process implementation, one mutex per account.
//! - `TradeGuard` / `TradeOutcome` / `Rejection`: the guarded-write vocabulary.
//! - `StoreError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod store;

// Re-export the key components to provide a clean, public-facing API.
pub use error::{Rejection, StoreError};
pub use store::{AccountStore, MemoryStore, TradeGuard, TradeOutcome};
