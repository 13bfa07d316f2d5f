use axum::{
    routing::{get, post},
    Router,
};
use engine::ExecutionEngine;
use identity::IdentityResolver;
use market_data::SymbolCatalog;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ExecutionEngine>,
    pub identity: Arc<dyn IdentityResolver>,
    pub catalog: SymbolCatalog,
}

/// Builds the application router. Split out of `run_server` so tests can
/// drive the routes without binding a socket.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/portfolio/buy", post(handlers::buy))
        .route("/portfolio/sell", post(handlers::sell))
        .route("/portfolio/owned", post(handlers::owned))
        .route("/portfolio/symbols", get(handlers::symbols))
        .route("/portfolio/stockhistory", get(handlers::stock_history))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
