use account_store::MemoryStore;
use clap::Parser;
use engine::ExecutionEngine;
use identity::TokenTable;
use ledger::MemoryLedger;
use market_data::{HttpGateway, SymbolCatalog};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use web_server::AppState;

/// A multi-account paper brokerage: account ledger, order execution, and a
/// small HTTP API in front of them.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "meridian.toml")]
    config: PathBuf,

    /// Override the listen address from the configuration, e.g. 0.0.0.0:9000.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if one exists.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = configuration::load_settings(&cli.config)?;

    let addr = match cli.listen {
        Some(addr) => addr,
        None => format!("{}:{}", settings.server.host, settings.server.port).parse()?,
    };

    let catalog = SymbolCatalog::new(settings.catalog.symbols.clone());
    let gateway = Arc::new(HttpGateway::new(&settings.market_data)?);
    let store = Arc::new(MemoryStore::new(settings.account.opening_cash));
    let order_ledger = Arc::new(MemoryLedger::new());
    let identity = Arc::new(TokenTable::new(&settings.auth));

    let engine = Arc::new(ExecutionEngine::new(
        gateway,
        store,
        order_ledger,
        catalog.clone(),
        settings.engine.clone(),
    ));

    tracing::info!(
        symbols = catalog.len(),
        accounts = settings.auth.tokens.len(),
        "Meridian starting"
    );

    let state = Arc::new(AppState {
        engine,
        identity,
        catalog,
    });

    web_server::run_server(addr, state).await
}
