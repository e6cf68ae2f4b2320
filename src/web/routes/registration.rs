use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Json},
};
use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::services::{mailer_service, registration_service};
use crate::AppState;

#[derive(Template)]
#[template(path = "manage_result.html")]
pub struct ManageResultTemplate {
    pub heading: String,
    pub message: String,
}

/// Public registration submission. Accepts JSON from the event page form and
/// replies with the assigned status; the confirmation email goes out after
/// the response, best effort.
pub async fn create_registration_handler(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    Json(input): Json<registration_service::RegistrationInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = registration_service::register(&state.pool, &event_id, &input).await?;

    let (subject, html) = mailer_service::registration_email(
        &state.config,
        &outcome.event_title,
        outcome.status,
        &outcome.manage_token,
    );
    let mail = mailer_service::OutgoingEmail {
        to: outcome.email.clone(),
        subject,
        html,
        kind: "registration",
    };
    let pool = state.pool.clone();
    let config = state.config.clone();
    tokio::spawn(async move {
        mailer_service::send(&pool, &config, mail).await;
    });

    Ok(Json(json!({
        "status": outcome.status,
        "registration_id": outcome.registration_id,
    })))
}

/// Emailed cancel link. Renders a small outcome page rather than JSON since
/// people open it straight from their inbox.
pub async fn cancel_registration_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let outcome = match registration_service::cancel_by_token(&state.pool, &token).await {
        Ok(outcome) => outcome,
        Err(AppError::NotFound) => {
            return render_result("Link not recognised", "This cancellation link is not valid.")
        }
        Err(AppError::Conflict(_)) => {
            return render_result(
                "Already cancelled",
                "This registration was already cancelled.",
            )
        }
        Err(e) => {
            warn!("Cancellation failed for token {}: {}", token, e);
            return render_result(
                "Something went wrong",
                "We could not cancel your registration. Please try again later.",
            );
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

    render_result(
        "Registration cancelled",
        &format!(
            "Your registration for {} has been cancelled.",
            outcome.event.title
        ),
    )
}

/// Emailed attendance confirmation link.
pub async fn confirm_attendance_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match registration_service::confirm_attendance_by_token(&state.pool, &token).await {
        Ok(_) => render_result(
            "Attendance confirmed",
            "Thanks for confirming, see you there!",
        ),
        Err(AppError::NotFound) => {
            render_result("Link not recognised", "This confirmation link is not valid.")
        }
        Err(AppError::Conflict(_)) => render_result(
            "Registration cancelled",
            "This registration was cancelled, so attendance cannot be confirmed.",
        ),
        Err(e) => {
            warn!("Attendance confirmation failed for token {}: {}", token, e);
            render_result(
                "Something went wrong",
                "We could not confirm your attendance. Please try again later.",
            )
        }
    }
}

fn render_result(heading: &str, message: &str) -> axum::response::Response {
    let template = ManageResultTemplate {
        heading: heading.to_string(),
        message: message.to_string(),
    };
    Html(template.render().unwrap()).into_response()
}
