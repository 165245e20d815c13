use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::domain::SettlementError> for AppError {
    fn from(err: crate::domain::SettlementError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<crate::quotes::QuoteError> for AppError {
    fn from(err: crate::quotes::QuoteError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::portfolio::TradeError> for AppError {
    fn from(err: crate::portfolio::TradeError) -> Self {
        use crate::portfolio::TradeError;
        match err {
            TradeError::PositionNotFound(symbol) => {
                AppError::NotFound(format!("no position held in {}", symbol))
            }
            TradeError::UnknownSymbol(symbol) => {
                AppError::NotFound(format!("unknown symbol: {}", symbol))
            }
            err @ TradeError::InvalidBuyQuantity(_) => AppError::BadRequest(err.to_string()),
            TradeError::Settlement(err) => AppError::BadRequest(err.to_string()),
            TradeError::Quote(err) => AppError::Internal(err.to_string()),
            TradeError::Db(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
