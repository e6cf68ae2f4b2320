use std::{env, fmt::Display, str::FromStr};

use tracing::info;

/// Runtime configuration, read once at startup from the environment
/// (a local `.env` file is loaded first by `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL used in emailed links, e.g. "https://example.org.uk".
    pub site_url: String,
    pub admin_password: String,
    pub email_api_url: String,
    pub email_api_key: String,
    pub email_from: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: try_load("HOST", "127.0.0.1"),
            port: try_load("PORT", "3000"),
            site_url: try_load("SITE_URL", "http://127.0.0.1:3000"),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            email_api_url: try_load("EMAIL_API_URL", "https://api.resend.com/emails"),
            email_api_key: env::var("EMAIL_API_KEY").unwrap_or_default(),
            email_from: try_load("EMAIL_FROM", "noreply@localhost"),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
            stripe_webhook_token: env::var("STRIPE_WEBHOOK_TOKEN").ok(),
        }
    }

    /// Absolute URL for a site-relative path.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), path)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{} not set, using default: {}", key, default);
            default.to_string()
        })
        .parse()
        .unwrap_or_else(|e| panic!("Invalid {} value: {}", key, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_url_joins_without_double_slash() {
        let mut cfg = Config::from_env();
        cfg.site_url = "https://example.org.uk/".to_string();
        assert_eq!(
            cfg.absolute_url("/registrations/x/cancel"),
            "https://example.org.uk/registrations/x/cancel"
        );
    }
}
