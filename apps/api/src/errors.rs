use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The upstream generateContent call itself failed.
    #[error("Model error: {0}")]
    Model(String),

    /// The model replied, but the reply could not be parsed in the
    /// configured output shape. Distinct from `Model` so callers can
    /// tell a bad reply apart from a failed call.
    #[error("Malformed model response")]
    MalformedResponse,

    /// The reply parsed, but a record was missing a required field.
    #[error("Invalid loan record: {0}")]
    InvalidRecord(String),

    /// The model replied with zero usable records.
    #[error("No results: {0}")]
    NoResults(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Model(msg) => {
                tracing::error!("Model error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MODEL_ERROR",
                    msg.clone(),
                )
            }
            AppError::MalformedResponse => {
                tracing::error!("Interpreter could not parse the model response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_RESPONSE",
                    "The model returned a malformed response".to_string(),
                )
            }
            AppError::InvalidRecord(msg) => {
                tracing::error!("Model response failed record validation: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVALID_RECORD",
                    msg.clone(),
                )
            }
            AppError::NoResults(msg) => (StatusCode::NOT_FOUND, "NO_RESULTS", msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
