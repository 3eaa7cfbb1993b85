//! HTTP error shaping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::core::breakdown::BreakdownError;

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Breakdown(#[from] BreakdownError),
}

pub type AppResult<T> = Result<T, AppError>;

/// Returned to clients when synthesis has no usable credentials. The
/// underlying error is logged, not sent.
pub const CREDENTIALS_HINT: &str = "Set GOOGLE_CREDENTIALS_JSON or GOOGLE_APPLICATION_CREDENTIALS \
     to a service account key, or GOOGLE_TTS_API_KEY, then restart the server";

/// JSON error body: `{"error": "...", "details": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::BadRequest(message)
            | AppError::Breakdown(BreakdownError::InvalidInput(message)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message.clone(),
                    details: None,
                },
            ),
            AppError::Breakdown(e) if e.is_credentials() => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Speech synthesis credentials not configured".to_string(),
                    details: Some(CREDENTIALS_HINT.to_string()),
                },
            ),
            AppError::Breakdown(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Failed to process word".to_string(),
                    details: Some(e.to_string()),
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.parts();
        if status.is_server_error() {
            error!(error = %self, "Error processing word");
        } else {
            warn!(error = %self, "Rejected request");
        }
        (status, Json(body)).into_response()
    }
}
