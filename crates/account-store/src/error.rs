use rust_decimal::Decimal;
use thiserror::Error;

/// Why a guarded write was refused. Carries the observed values so callers
/// can report exact shortfalls without a second read.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The post-trade cash balance would fall below the guard's floor.
    Cash { available: Decimal },
    /// The post-trade unit count would fall below the guard's floor.
    Units { owned: u64 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Trade rejected by guard: {0:?}")]
    Rejected(Rejection),

    /// The write lost a race against a concurrent writer. Safe to retry.
    /// The in-memory store never emits this; optimistic backends do.
    #[error("Conflicting concurrent write, retry")]
    Conflict,

    #[error("Account store failure: {0}")]
    Storage(String),
}
