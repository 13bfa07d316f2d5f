use async_trait::async_trait;
use configuration::AuthSettings;
use std::collections::HashMap;

pub mod error;

pub use error::IdentityError;

/// Maps an opaque access token to the account it belongs to.
///
/// The serving layer resolves every request through this trait before any
/// account state is touched; a failed resolution never reaches the engine.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the account id for a token, or `Unauthenticated` if the token
    /// is unknown, empty, or revoked.
    async fn resolve(&self, token: &str) -> Result<String, IdentityError>;
}

/// A static token table loaded from configuration.
#[derive(Debug, Default)]
pub struct TokenTable {
    accounts_by_token: HashMap<String, String>,
}

impl TokenTable {
    pub fn new(settings: &AuthSettings) -> Self {
        let accounts_by_token = settings
            .tokens
            .iter()
            .map(|entry| (entry.token.clone(), entry.account_id.clone()))
            .collect();
        Self { accounts_by_token }
    }

    /// Convenience constructor for tests and embedded setups.
    pub fn with_token(token: &str, account_id: &str) -> Self {
        let mut accounts_by_token = HashMap::new();
        accounts_by_token.insert(token.to_string(), account_id.to_string());
        Self { accounts_by_token }
    }
}

#[async_trait]
impl IdentityResolver for TokenTable {
    async fn resolve(&self, token: &str) -> Result<String, IdentityError> {
        if token.is_empty() {
            return Err(IdentityError::Unauthenticated);
        }
        match self.accounts_by_token.get(token) {
            Some(account_id) => Ok(account_id.clone()),
            None => {
                tracing::debug!("Rejected unknown access token");
                Err(IdentityError::Unauthenticated)
            }
        }
    }
}
