use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::database::subscribers_repo;
use crate::error::AppError;
use crate::services::subscriber_service;
use crate::AppState;

pub struct SubscriberRowView {
    pub email: String,
    pub name: String,
    pub subscribed_label: String,
}

#[derive(Template)]
#[template(path = "admin_subscribers.html")]
pub struct AdminSubscribersTemplate {
    pub subscribers: Vec<SubscriberRowView>,
}

pub async fn list_subscribers_handler(State(state): State<AppState>) -> impl IntoResponse {
    let rows = match subscribers_repo::list_subscribers(&state.pool).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Subscribers listing failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let subscribers = rows
        .into_iter()
        .map(|row| SubscriberRowView {
            email: row.email,
            name: row.name.unwrap_or_default(),
            subscribed_label: row.subscribed_at.chars().take(10).collect(),
        })
        .collect();

    let template = AdminSubscribersTemplate { subscribers };
    Html(template.render().unwrap()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct BulkEmailInput {
    pub subject: String,
    pub body_html: String,
}

/// Bulk newsletter send. Waits for the loop so the admin gets real counts
/// back, but individual failures only show up in email_logs.
pub async fn bulk_email_handler(
    State(state): State<AppState>,
    Json(input): Json<BulkEmailInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let report = subscriber_service::send_newsletter(
        &state.pool,
        &state.config,
        &input.subject,
        &input.body_html,
    )
    .await?;

    Ok(Json(json!({
        "attempted": report.attempted,
        "sent": report.sent,
        "failed": report.failed,
    })))
}
