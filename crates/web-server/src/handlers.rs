use crate::{error::AppError, AppState};
use axum::{
    extract::{Form, Query, State},
    Json,
};
use core_types::PricePoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The body of a buy or sell request.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub token: String,
    pub symbol: String,
    /// Bound as a signed integer on purpose: a negative count must reach the
    /// engine's validation and come back as a clean rejection, not as a
    /// deserialization failure.
    pub units: i64,
}

#[derive(Debug, Deserialize)]
pub struct OwnedRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct StockHistoryRequest {
    pub token: String,
    pub symbol: String,
    pub timeframe: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedResponse {
    pub message: String,
    pub total_cost: String,
    pub remaining_cash: String,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse<T> {
    pub count: usize,
    pub results: T,
}

/// # POST /portfolio/buy
pub async fn buy(
    State(state): State<Arc<AppState>>,
    Form(req): Form<OrderRequest>,
) -> Result<Json<OrderPlacedResponse>, AppError> {
    let account_id = state.identity.resolve(&req.token).await?;
    let receipt = state.engine.buy(&account_id, &req.symbol, req.units).await?;

    Ok(Json(OrderPlacedResponse {
        message: "Successfully ordered stocks".to_string(),
        total_cost: receipt.total_value.to_string(),
        remaining_cash: receipt.remaining_cash.to_string(),
    }))
}

/// # POST /portfolio/sell
pub async fn sell(
    State(state): State<Arc<AppState>>,
    Form(req): Form<OrderRequest>,
) -> Result<Json<OrderPlacedResponse>, AppError> {
    let account_id = state.identity.resolve(&req.token).await?;
    let receipt = state
        .engine
        .sell(&account_id, &req.symbol, req.units)
        .await?;

    Ok(Json(OrderPlacedResponse {
        message: "Successfully sold stocks".to_string(),
        total_cost: receipt.total_value.to_string(),
        remaining_cash: receipt.remaining_cash.to_string(),
    }))
}

/// # POST /portfolio/owned
/// The caller's full symbol→units mapping; an account with no holdings gets
/// an empty object.
pub async fn owned(
    State(state): State<Arc<AppState>>,
    Form(req): Form<OwnedRequest>,
) -> Result<Json<HashMap<String, u64>>, AppError> {
    let account_id = state.identity.resolve(&req.token).await?;
    let positions = state.engine.positions(&account_id).await?;
    Ok(Json(positions))
}

/// # GET /portfolio/symbols
/// Catalog passthrough; deliberately unauthenticated, the listing is public.
pub async fn symbols(State(state): State<Arc<AppState>>) -> Json<ListingResponse<Vec<String>>> {
    let results = state.catalog.symbols().to_vec();
    Json(ListingResponse {
        count: results.len(),
        results,
    })
}

/// # GET /portfolio/stockhistory
pub async fn stock_history(
    State(state): State<Arc<AppState>>,
    Query(req): Query<StockHistoryRequest>,
) -> Result<Json<ListingResponse<Vec<PricePoint>>>, AppError> {
    state.identity.resolve(&req.token).await?;
    let results = state.engine.history(&req.symbol, &req.timeframe).await?;

    Ok(Json(ListingResponse {
        count: results.len(),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_router;
    use account_store::{AccountStore, MemoryStore};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use configuration::EngineSettings;
    use engine::ExecutionEngine;
    use identity::TokenTable;
    use ledger::MemoryLedger;
    use market_data::{MockGateway, SymbolCatalog};
    use rust_decimal_macros::dec;
    use tower::util::ServiceExt;

    fn state() -> (Arc<AppState>, Arc<MemoryStore>) {
        let gateway = Arc::new(MockGateway::with_price("ACME", dec!(50)));
        let store = Arc::new(MemoryStore::new(dec!(1000)));
        let catalog = SymbolCatalog::new(vec!["ACME".to_string()]);
        let engine = Arc::new(ExecutionEngine::new(
            gateway,
            store.clone(),
            Arc::new(MemoryLedger::new()),
            catalog.clone(),
            EngineSettings::default(),
        ));
        let state = Arc::new(AppState {
            engine,
            identity: Arc::new(TokenTable::with_token("secret", "acct-1")),
            catalog,
        });
        (state, store)
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn buy_executes_and_debits_the_account() {
        let (state, store) = state();
        let app = build_router(state);

        let response = app
            .oneshot(form_post(
                "/portfolio/buy",
                "token=secret&symbol=ACME&units=10",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.cash("acct-1").await.unwrap(), dec!(500));
        assert_eq!(store.units("acct-1", "ACME").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn a_bad_token_is_unauthorized_and_touches_nothing() {
        let (state, store) = state();
        let app = build_router(state);

        let response = app
            .oneshot(form_post(
                "/portfolio/buy",
                "token=wrong&symbol=ACME&units=10",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(store.cash("acct-1").await.unwrap(), dec!(1000));
    }

    #[tokio::test]
    async fn negative_units_come_back_as_bad_request() {
        let (state, _) = state();
        let app = build_router(state);

        let response = app
            .oneshot(form_post(
                "/portfolio/sell",
                "token=secret&symbol=ACME&units=-5",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overdraft_is_unprocessable() {
        let (state, _) = state();
        let app = build_router(state);

        let response = app
            .oneshot(form_post(
                "/portfolio/buy",
                "token=secret&symbol=ACME&units=100",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn symbols_listing_needs_no_token() {
        let (state, _) = state();
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/portfolio/symbols")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stock_history_requires_a_valid_token() {
        let (state, _) = state();
        let app = build_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/portfolio/stockhistory?token=wrong&symbol=ACME&timeframe=1d")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let app = build_router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/portfolio/stockhistory?token=secret&symbol=ACME&timeframe=1d")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
