use serde_json::json;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::database::email_logs_repo;
use crate::models::registrations::STATUS_CONFIRMED;

pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    /// registration | promotion | newsletter
    pub kind: &'static str,
}

/// Best-effort delivery through the transactional email API. Every attempt is
/// recorded in `email_logs`; failures are swallowed so they never break the
/// request that triggered the email. Returns whether the send succeeded.
pub async fn send(pool: &SqlitePool, config: &Config, mail: OutgoingEmail) -> bool {
    let result = post_email(config, &mail).await;

    let (status, error) = match &result {
        Ok(()) => ("sent", None),
        Err(e) => {
            warn!("Email to {} failed: {}", mail.to, e);
            ("failed", Some(e.as_str()))
        }
    };

    let log = email_logs_repo::NewEmailLog {
        id: &Uuid::new_v4().to_string(),
        recipient: &mail.to,
        subject: &mail.subject,
        kind: mail.kind,
        status,
        error,
    };
    if let Err(e) = email_logs_repo::insert_log(pool, log).await {
        warn!("Could not write email log row: {}", e);
    }

    result.is_ok()
}

async fn post_email(config: &Config, mail: &OutgoingEmail) -> Result<(), String> {
    if config.email_api_key.is_empty() {
        return Err("EMAIL_API_KEY not configured".to_string());
    }

    let client = reqwest::Client::new();
    let resp = client
        .post(&config.email_api_url)
        .bearer_auth(&config.email_api_key)
        .json(&json!({
            "from": config.email_from,
            "to": [mail.to],
            "subject": mail.subject,
            "html": mail.html,
        }))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !resp.status().is_success() {
        return Err(format!("provider returned {}", resp.status()));
    }
    Ok(())
}

/// Confirmation/waitlist notice sent right after a registration is accepted.
pub fn registration_email(
    config: &Config,
    event_title: &str,
    status: &str,
    manage_token: &str,
) -> (String, String) {
    let cancel_url = config.absolute_url(&format!("/registrations/{}/cancel", manage_token));
    let confirm_url = config.absolute_url(&format!("/registrations/{}/confirm", manage_token));
    let title = html_escape(event_title);

    if status == STATUS_CONFIRMED {
        let subject = format!("You're registered: {}", event_title);
        let html = format!(
            "<h1>See you at {title}!</h1>\
             <p>Your place is confirmed.</p>\
             <p><a href=\"{confirm_url}\">Confirm attendance</a> &middot; \
             <a href=\"{cancel_url}\">Cancel your registration</a></p>"
        );
        (subject, html)
    } else {
        let subject = format!("You're on the waiting list: {}", event_title);
        let html = format!(
            "<h1>{title}</h1>\
             <p>The event is currently full, so you are on the waiting list. \
             We'll email you if a place frees up.</p>\
             <p><a href=\"{cancel_url}\">Leave the waiting list</a></p>"
        );
        (subject, html)
    }
}

/// Sent when a waitlisted registration is moved into a freed slot.
pub fn promotion_email(config: &Config, event_title: &str, manage_token: &str) -> (String, String) {
    let cancel_url = config.absolute_url(&format!("/registrations/{}/cancel", manage_token));
    let confirm_url = config.absolute_url(&format!("/registrations/{}/confirm", manage_token));
    let title = html_escape(event_title);
    let subject = format!("A place opened up: {}", event_title);
    let html = format!(
        "<h1>Good news!</h1>\
         <p>A place for {title} has opened up and your registration is now confirmed.</p>\
         <p><a href=\"{confirm_url}\">Confirm attendance</a> &middot; \
         <a href=\"{cancel_url}\">Cancel</a></p>"
    );
    (subject, html)
}

/// Wraps newsletter body HTML with the per-subscriber unsubscribe footer.
pub fn newsletter_html(config: &Config, body_html: &str, unsubscribe_token: &str) -> String {
    let unsubscribe_url = config.absolute_url(&format!("/unsubscribe/{}", unsubscribe_token));
    format!(
        "{body_html}\
         <hr><p style=\"font-size:12px;color:#666\">\
         <a href=\"{unsubscribe_url}\">Unsubscribe</a></p>"
    )
}

pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut cfg = Config::from_env();
        cfg.site_url = "https://example.org.uk".to_string();
        cfg
    }

    #[test]
    fn registration_email_links_carry_the_token() {
        let cfg = test_config();
        let (subject, html) = registration_email(&cfg, "Sports Day", "confirmed", "tok-123");
        assert!(subject.contains("Sports Day"));
        assert!(html.contains("https://example.org.uk/registrations/tok-123/cancel"));
        assert!(html.contains("https://example.org.uk/registrations/tok-123/confirm"));
    }

    #[test]
    fn waitlist_email_has_no_confirm_link() {
        let cfg = test_config();
        let (_, html) = registration_email(&cfg, "Sports Day", "waitlisted", "tok-123");
        assert!(html.contains("/registrations/tok-123/cancel"));
        assert!(!html.contains("/registrations/tok-123/confirm"));
    }

    #[test]
    fn event_titles_are_escaped_in_bodies() {
        let cfg = test_config();
        let (_, html) = registration_email(&cfg, "Fish & <Chips>", "confirmed", "t");
        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn newsletter_footer_links_unsubscribe() {
        let cfg = test_config();
        let html = newsletter_html(&cfg, "<p>Hello</p>", "u-1");
        assert!(html.starts_with("<p>Hello</p>"));
        assert!(html.contains("https://example.org.uk/unsubscribe/u-1"));
    }
}
