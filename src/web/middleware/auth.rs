use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::database::admin_sessions_repo;
use crate::AppState;

pub const SESSION_COOKIE: &str = "admin_session";

/// Gate for everything under /admin: the session cookie must match a row in
/// admin_sessions. Anything else bounces to the login page.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(session_token_from_cookies);

    if let Some(token) = token {
        if let Ok(true) = admin_sessions_repo::session_exists(&state.pool, token).await {
            return next.run(request).await;
        }
    }

    Redirect::to("/admin/login").into_response()
}

pub fn session_token_from_cookies(cookies: &str) -> Option<&str> {
    cookies
        .split("; ")
        .find_map(|c| c.strip_prefix("admin_session="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_extracted_from_cookie_header() {
        assert_eq!(
            session_token_from_cookies("theme=dark; admin_session=abc123"),
            Some("abc123")
        );
        assert_eq!(session_token_from_cookies("theme=dark"), None);
    }
}
