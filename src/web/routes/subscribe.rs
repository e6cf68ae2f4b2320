use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Json},
};
use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::services::subscriber_service;
use crate::web::routes::registration::ManageResultTemplate;
use crate::AppState;

pub async fn subscribe_handler(
    State(state): State<AppState>,
    Json(input): Json<subscriber_service::SubscribeInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    subscriber_service::subscribe(&state.pool, &input).await?;
    Ok(Json(json!({ "subscribed": true })))
}

/// Unsubscribe link from the newsletter footer.
pub async fn unsubscribe_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let removed = match subscriber_service::unsubscribe(&state.pool, &token).await {
        Ok(removed) => removed,
        Err(e) => {
            warn!("Unsubscribe failed for token {}: {}", token, e);
            false
        }
    };

    let template = if removed {
        ManageResultTemplate {
            heading: "Unsubscribed".to_string(),
            message: "You will no longer receive our newsletter.".to_string(),
        }
    } else {
        ManageResultTemplate {
            heading: "Link not recognised".to_string(),
            message: "This unsubscribe link is not valid or was already used.".to_string(),
        }
    };
    Html(template.render().unwrap())
}
