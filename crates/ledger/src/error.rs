use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// The backing log could not be written. Fatal to the enclosing trade:
    /// the caller must roll back the balance change it just applied.
    #[error("Order ledger failure: {0}")]
    Storage(String),
}
