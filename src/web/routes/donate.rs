use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::services::donation_service;
use crate::AppState;

#[derive(Template)]
#[template(path = "donate.html")]
pub struct DonateTemplate {
    /// "" | success | cancelled
    pub outcome: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct DonateQuery {
    pub outcome: Option<String>,
}

pub async fn donate_page_handler(Query(query): Query<DonateQuery>) -> Html<String> {
    let template = DonateTemplate {
        outcome: query.outcome.unwrap_or_default(),
    };
    Html(template.render().unwrap())
}

/// Creates the hosted checkout session; the browser follows the returned URL.
pub async fn checkout_handler(
    State(state): State<AppState>,
    Json(input): Json<donation_service::CheckoutInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let url = donation_service::create_checkout_session(&state.config, &input).await?;
    Ok(Json(json!({ "url": url })))
}

#[derive(Debug, Deserialize, Default)]
pub struct WebhookQuery {
    pub token: Option<String>,
}

/// Inbound payment notifications. Guarded by a shared-secret query token
/// configured on the Stripe endpoint; without one configured the endpoint is
/// disabled outright.
pub async fn stripe_webhook_handler(
    Query(query): Query<WebhookQuery>,
    State(state): State<AppState>,
    Json(event): Json<donation_service::StripeEvent>,
) -> axum::response::Response {
    let Some(expected) = state.config.stripe_webhook_token.as_deref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if query.token.as_deref() != Some(expected) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match donation_service::record_stripe_event(&state.pool, &event).await {
        Ok(()) => Json(json!({ "received": true })).into_response(),
        Err(e) => {
            warn!("Stripe webhook processing failed: {}", e);
            e.into_response()
        }
    }
}
