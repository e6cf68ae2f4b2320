use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::database::{
    events_repo, registration_children_repo, registrations_repo,
};
use crate::error::AppError;
use crate::services::{
    event_service, export_service, mailer_service, registration_service,
};
use crate::AppState;

pub struct AdminEventRowView {
    pub event_id: String,
    pub title: String,
    pub date_label: String,
    pub status: String,
    pub registration_status: String,
    pub total_slots: i64,
    pub waitlist_slots: i64,
}

#[derive(Template)]
#[template(path = "admin_events.html")]
pub struct AdminEventsTemplate {
    pub events: Vec<AdminEventRowView>,
}

pub async fn list_events_handler(State(state): State<AppState>) -> impl IntoResponse {
    let rows = match events_repo::list_all_events(&state.pool).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Admin events listing failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let events = rows
        .into_iter()
        .map(|row| {
            let (date_label, _) = event_service::format_schedule_labels(&row.starts_at);
            AdminEventRowView {
                event_id: row.id,
                title: row.title,
                date_label,
                status: row.status,
                registration_status: row.registration_status,
                total_slots: row.total_slots,
                waitlist_slots: row.waitlist_slots,
            }
        })
        .collect();

    let template = AdminEventsTemplate { events };
    Html(template.render().unwrap()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct EventForm {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub venue: Option<String>,
    pub total_slots: i64,
    pub waitlist_slots: i64,
    pub registration_status: String,
    /// Raw JSON array of custom field definitions, empty for none.
    pub custom_fields: Option<String>,
}

fn validate_event_form(form: &EventForm) -> Result<(), &'static str> {
    if form.title.trim().is_empty() {
        return Err("title is required");
    }
    if form.starts_at.trim().is_empty() {
        return Err("start time is required");
    }
    if form.total_slots < 0 || form.waitlist_slots < 0 {
        return Err("slot counts cannot be negative");
    }
    if !matches!(form.registration_status.as_str(), "open" | "closed" | "auto") {
        return Err("registration status must be open, closed or auto");
    }
    if let Some(raw) = form.custom_fields.as_deref() {
        if !raw.trim().is_empty()
            && serde_json::from_str::<Vec<crate::models::CustomField>>(raw).is_err()
        {
            return Err("custom fields must be a JSON array of field definitions");
        }
    }
    Ok(())
}

fn custom_fields_value(form: &EventForm) -> Option<&str> {
    form.custom_fields
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    Form(form): Form<EventForm>,
) -> impl IntoResponse {
    if let Err(msg) = validate_event_form(&form) {
        warn!("Event create rejected: {}", msg);
        return StatusCode::BAD_REQUEST.into_response();
    }

    let id = Uuid::new_v4().to_string();
    let result = events_repo::insert_event(
        &state.pool,
        events_repo::NewEvent {
            id: &id,
            title: form.title.trim(),
            description: form.description.as_deref(),
            starts_at: form.starts_at.trim(),
            ends_at: form.ends_at.as_deref(),
            venue: form.venue.as_deref(),
            total_slots: form.total_slots,
            waitlist_slots: form.waitlist_slots,
            registration_status: &form.registration_status,
            custom_fields: custom_fields_value(&form),
        },
    )
    .await;

    if let Err(e) = result {
        warn!("Event create failed: {}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Redirect::to("/admin/events").into_response()
}

pub async fn update_event_handler(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<EventForm>,
) -> impl IntoResponse {
    if let Err(msg) = validate_event_form(&form) {
        warn!("Event update rejected for {}: {}", event_id, msg);
        return StatusCode::BAD_REQUEST.into_response();
    }

    let result = events_repo::update_event(
        &state.pool,
        events_repo::NewEvent {
            id: &event_id,
            title: form.title.trim(),
            description: form.description.as_deref(),
            starts_at: form.starts_at.trim(),
            ends_at: form.ends_at.as_deref(),
            venue: form.venue.as_deref(),
            total_slots: form.total_slots,
            waitlist_slots: form.waitlist_slots,
            registration_status: &form.registration_status,
            custom_fields: custom_fields_value(&form),
        },
    )
    .await;

    match result {
        Ok(0) => StatusCode::NOT_FOUND.into_response(),
        Ok(_) => Redirect::to("/admin/events").into_response(),
        Err(e) => {
            warn!("Event update failed for {}: {}", event_id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventStatusForm {
    /// draft | published | cancelled
    pub status: String,
}

pub async fn set_event_status_handler(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<EventStatusForm>,
) -> impl IntoResponse {
    if !matches!(form.status.as_str(), "draft" | "published" | "cancelled") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match events_repo::set_event_status(&state.pool, &event_id, &form.status).await {
        Ok(0) => StatusCode::NOT_FOUND.into_response(),
        Ok(_) => Redirect::to("/admin/events").into_response(),
        Err(e) => {
            warn!("Event status change failed for {}: {}", event_id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub struct AdminRegistrationRowView {
    pub registration_id: String,
    pub guardian_name: String,
    pub email: String,
    pub phone: String,
    pub status: String,
    pub attendance_confirmed: bool,
    pub created_label: String,
    pub children_label: String,
}

#[derive(Template)]
#[template(path = "admin_registrations.html")]
pub struct AdminRegistrationsTemplate {
    pub event_id: String,
    pub event_title: String,
    pub registrations: Vec<AdminRegistrationRowView>,
}

pub async fn list_registrations_handler(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let mut conn = match state.pool.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("Pool acquire failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let event = match events_repo::load_event_by_id(&mut conn, &event_id).await {
        Ok(Some(event)) => event,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Event load failed for {}: {}", event_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    drop(conn);

    let rows = match registrations_repo::list_for_event(&state.pool, &event_id).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Registrations listing failed for {}: {}", event_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let children = registration_children_repo::list_for_event(&state.pool, &event_id)
        .await
        .unwrap_or_default();

    let mut children_by_registration: HashMap<&str, Vec<String>> = HashMap::new();
    for child in &children {
        let label = match child.age {
            Some(age) => format!("{} ({})", child.name, age),
            None => child.name.clone(),
        };
        children_by_registration
            .entry(child.registration_id.as_str())
            .or_default()
            .push(label);
    }

    let registrations = rows
        .iter()
        .map(|reg| {
            let (created_label, _) = event_service::format_schedule_labels(&reg.created_at);
            AdminRegistrationRowView {
                registration_id: reg.id.clone(),
                guardian_name: reg.guardian_name.clone(),
                email: reg.email.clone(),
                phone: reg.phone.clone().unwrap_or_default(),
                status: reg.status.clone(),
                attendance_confirmed: reg.attendance_confirmed == 1,
                created_label,
                children_label: children_by_registration
                    .get(reg.id.as_str())
                    .map(|names| names.join("; "))
                    .unwrap_or_default(),
            }
        })
        .collect();

    let template = AdminRegistrationsTemplate {
        event_id,
        event_title: event.title,
        registrations,
    };
    Html(template.render().unwrap()).into_response()
}

/// Admin cancellation; a freed confirmed slot auto-promotes the oldest
/// waitlisted entry, same as the registrant-facing link.
pub async fn cancel_registration_handler(
    Path(registration_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let outcome = match registration_service::cancel_by_id(&state.pool, &registration_id).await {
        Ok(outcome) => outcome,
        Err(AppError::NotFound) => return StatusCode::NOT_FOUND.into_response(),
        Err(AppError::Conflict(msg)) => {
            warn!("Admin cancel rejected for {}: {}", registration_id, msg);
            return StatusCode::CONFLICT.into_response();
        }
        Err(e) => {
            warn!("Admin cancel failed for {}: {}", registration_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Some(promoted) = &outcome.promoted {
        let (subject, html) = mailer_service::promotion_email(
            &state.config,
            &outcome.event.title,
            &promoted.manage_token,
        );
        let mail = mailer_service::OutgoingEmail {
            to: promoted.email.clone(),
            subject,
            html,
            kind: "promotion",
        };
        let pool = state.pool.clone();
        let config = state.config.clone();
        tokio::spawn(async move {
            mailer_service::send(&pool, &config, mail).await;
        });
    }

    Redirect::to(&format!(
        "/admin/events/{}/registrations",
        outcome.event.id
    ))
    .into_response()
}

/// Manual promotion of a chosen waitlisted registration.
pub async fn promote_registration_handler(
    Path(registration_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let promoted = match registration_service::promote_by_id(&state.pool, &registration_id).await {
        Ok(promoted) => promoted,
        Err(AppError::NotFound) => return StatusCode::NOT_FOUND.into_response(),
        Err(AppError::Conflict(msg)) => {
            warn!("Promotion rejected for {}: {}", registration_id, msg);
            return StatusCode::CONFLICT.into_response();
        }
        Err(e) => {
            warn!("Promotion failed for {}: {}", registration_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut conn = match state.pool.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("Pool acquire failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let event_title = events_repo::load_event_by_id(&mut conn, &promoted.event_id)
        .await
        .ok()
        .flatten()
        .map(|e| e.title)
        .unwrap_or_default();
    drop(conn);

    let (subject, html) =
        mailer_service::promotion_email(&state.config, &event_title, &promoted.manage_token);
    let mail = mailer_service::OutgoingEmail {
        to: promoted.email.clone(),
        subject,
        html,
        kind: "promotion",
    };
    let pool = state.pool.clone();
    let config = state.config.clone();
    tokio::spawn(async move {
        mailer_service::send(&pool, &config, mail).await;
    });

    Redirect::to(&format!(
        "/admin/events/{}/registrations",
        promoted.event_id
    ))
    .into_response()
}

pub async fn registrations_csv_handler(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let csv = match export_service::registrations_csv(&state.pool, &event_id).await {
        Ok(csv) => csv,
        Err(e) => {
            warn!("Registrations CSV export failed for {}: {}", event_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"registrations-{}.csv\"", event_id),
            ),
        ],
        csv,
    )
        .into_response()
}
