// error.rs — HTTP error taxonomy.
//
// Validation → 400. Upstream provider errors pass through with the
// provider's status and message. Everything else (persistence, transport
// after retries) → 500 with a generic body; the detail goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::provider::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("model provider returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Api { status, message } => Self::Upstream { status, message },
            ProviderError::Transport(err) => Self::Internal(err.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::Upstream { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            ),
            Self::Internal(err) => {
                error!(err = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process request".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
