use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::EngineError;
use identity::IdentityError;
use serde_json::json;
use thiserror::Error;
use tracing;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AppError {
    /// Every error kind gets a distinct, documented outcome: bad input is
    /// the caller's fault (4xx), an unreachable provider is upstream's
    /// (502), and anything storage-shaped is ours (500).
    fn status(&self) -> StatusCode {
        match self {
            AppError::Identity(IdentityError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            AppError::Engine(err) => match err {
                EngineError::InvalidUnits(_)
                | EngineError::UnknownSymbol(_)
                | EngineError::InvalidTimeframe(_) => StatusCode::BAD_REQUEST,
                EngineError::InsufficientFunds { .. }
                | EngineError::InsufficientHoldings { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                EngineError::PriceUnavailable(_) | EngineError::HistoryUnavailable(_) => {
                    StatusCode::BAD_GATEWAY
                }
                EngineError::StorageFailure(_) | EngineError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Request failed on an internal error.");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}
