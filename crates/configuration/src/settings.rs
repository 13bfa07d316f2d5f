use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub market_data: MarketDataSettings,
    #[serde(default)]
    pub account: AccountSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    pub auth: AuthSettings,
    pub catalog: CatalogSettings,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}

/// Connection parameters for the upstream market-data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataSettings {
    /// Base URL of the quote/history provider, without a trailing slash.
    pub base_url: String,
    /// Per-request deadline. Expiry surfaces to callers as an unavailable
    /// price or history, never as a hung request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    2_000
}

/// Parameters for accounts this service provisions implicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSettings {
    /// Cash balance granted to an account the first time it is referenced.
    #[serde(default = "default_opening_cash")]
    pub opening_cash: Decimal,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            opening_cash: default_opening_cash(),
        }
    }
}

fn default_opening_cash() -> Decimal {
    dec!(10000)
}

/// Tunables for the order-execution engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// How many times a conflicted store write is retried before the request
    /// fails. Business-rule rejections are never retried.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

fn default_max_conflict_retries() -> u32 {
    3
}

/// The static token table used to resolve callers to accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub tokens: Vec<TokenEntry>,
}

/// One access token and the account it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub account_id: String,
}

/// The set of instrument symbols this deployment trades.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub symbols: Vec<String>,
}
