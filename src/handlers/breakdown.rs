use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;
use tracing::info;

use crate::core::breakdown::Breakdown;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// `POST /api/syllable-breakdown` with body `{"word": "..."}`
pub async fn syllable_breakdown(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Breakdown>> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let word = body
        .get("word")
        .and_then(Value::as_str)
        .filter(|w| !w.is_empty())
        .ok_or_else(|| AppError::BadRequest("Word is required and must be a string".to_string()))?;

    info!(word, "Processing word");
    let breakdown = state.breakdown.compute_breakdown(word).await?;
    Ok(Json(breakdown))
}
