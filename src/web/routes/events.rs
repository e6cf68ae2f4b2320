use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::warn;

use crate::services::event_service::{self, EventCardView, EventDetailView};
use crate::AppState;

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub events: Vec<EventCardView>,
}

#[derive(Template)]
#[template(path = "event.html")]
pub struct EventTemplate {
    pub event: EventDetailView,
}

pub async fn events_handler(State(state): State<AppState>) -> impl IntoResponse {
    let events = match event_service::list_public_events(&state.pool).await {
        Ok(events) => events,
        Err(e) => {
            warn!("Events listing failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let template = EventsTemplate { events };
    Html(template.render().unwrap()).into_response()
}

pub async fn event_detail_handler(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let event = match event_service::load_public_event(&state.pool, &event_id).await {
        Ok(event) => event,
        Err(e) => {
            warn!("Event detail load failed for {}: {}", event_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let Some(event) = event else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let template = EventTemplate { event };
    Html(template.render().unwrap()).into_response()
}
