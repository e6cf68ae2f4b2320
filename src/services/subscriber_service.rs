use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::Config;
use crate::database::subscribers_repo;
use crate::error::AppError;
use crate::services::mailer_service;

#[derive(Debug, Deserialize)]
pub struct SubscribeInput {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn subscribe(pool: &SqlitePool, input: &SubscribeInput) -> Result<(), AppError> {
    let email = input.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("a valid email address is required"));
    }
    let name = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    subscribers_repo::upsert_subscriber(
        pool,
        &Uuid::new_v4().to_string(),
        &email,
        name,
        &Uuid::new_v4().to_string(),
    )
    .await?;
    Ok(())
}

/// Returns false when the token matched nothing (already unsubscribed, or
/// never subscribed).
pub async fn unsubscribe(pool: &SqlitePool, token: &str) -> Result<bool, AppError> {
    let removed = subscribers_repo::delete_by_token(pool, token).await?;
    Ok(removed > 0)
}

pub struct BulkEmailReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends a newsletter to every subscriber, one call per recipient so each
/// gets their own unsubscribe link. Best effort throughout; per-recipient
/// outcomes land in `email_logs`.
pub async fn send_newsletter(
    pool: &SqlitePool,
    config: &Config,
    subject: &str,
    body_html: &str,
) -> Result<BulkEmailReport, AppError> {
    if subject.trim().is_empty() {
        return Err(AppError::validation("subject is required"));
    }
    if body_html.trim().is_empty() {
        return Err(AppError::validation("body is required"));
    }

    let subscribers = subscribers_repo::list_subscribers(pool).await?;
    let mut report = BulkEmailReport {
        attempted: subscribers.len(),
        sent: 0,
        failed: 0,
    };

    for subscriber in &subscribers {
        let html = mailer_service::newsletter_html(config, body_html, &subscriber.unsubscribe_token);
        let ok = mailer_service::send(
            pool,
            config,
            mailer_service::OutgoingEmail {
                to: subscriber.email.clone(),
                subject: subject.to_string(),
                html,
                kind: "newsletter",
            },
        )
        .await;
        if ok {
            report.sent += 1;
        } else {
            report.failed += 1;
        }
    }

    Ok(report)
}
