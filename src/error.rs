use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for a price lookup. `Validation` renders as HTTP 400,
/// everything else as HTTP 500 with provider detail. Soft misses (card not
/// found, no pricing data) are not errors; they travel as normal results.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0}")]
    Validation(String),

    #[error("{provider} lookup failed: {message}")]
    Upstream { provider: String, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl LookupError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LookupError::Validation(msg.into())
    }

    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        LookupError::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        match self {
            LookupError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            LookupError::Upstream { provider, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("price lookup via {provider} failed"),
                    "details": message,
                })),
            )
                .into_response(),
            LookupError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal error",
                    "details": format!("{e:#}"),
                })),
            )
                .into_response(),
        }
    }
}
