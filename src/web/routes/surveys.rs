use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::services::survey_service;
use crate::AppState;

/// Public survey submission: a JSON object keyed by question id.
pub async fn submit_response_handler(
    Path(survey_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(answers) = body.as_object() else {
        return Err(AppError::validation("answers must be a JSON object"));
    };
    survey_service::submit_response(&state.pool, &survey_id, answers).await?;
    Ok(Json(json!({ "submitted": true })))
}
