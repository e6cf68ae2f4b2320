use askama::Template;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use cookie::Cookie;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::database::admin_sessions_repo;
use crate::web::middleware::auth::{session_token_from_cookies, SESSION_COOKIE};
use crate::AppState;

#[derive(Template)]
#[template(path = "admin_login.html")]
pub struct LoginTemplate {
    pub failed: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginQuery {
    pub failed: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    password: String,
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let template = LoginTemplate {
        failed: query.failed.is_some(),
    };
    Html(template.render().unwrap())
}

pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    // An empty ADMIN_PASSWORD means the back-office is locked, not open.
    if state.config.admin_password.is_empty()
        || form.password != state.config.admin_password
    {
        return Redirect::to("/admin/login?failed=1").into_response();
    }

    if let Err(e) = admin_sessions_repo::purge_expired(&state.pool).await {
        warn!("Could not purge expired admin sessions: {}", e);
    }

    let token = Uuid::new_v4().to_string();
    if let Err(e) = admin_sessions_repo::insert_session(&state.pool, &token).await {
        warn!("Could not store admin session: {}", e);
        return Redirect::to("/admin/login?failed=1").into_response();
    }

    let mut session_cookie = Cookie::new(SESSION_COOKIE, token);
    session_cookie.set_path("/");
    session_cookie.set_http_only(true);
    session_cookie.set_same_site(cookie::SameSite::Lax);

    let mut response = Redirect::to("/admin").into_response();
    response.headers_mut().append(
        header::SET_COOKIE,
        session_cookie.to_string().parse().unwrap(),
    );
    response
}

pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(session_token_from_cookies);

    if let Some(token) = token {
        if let Err(e) = admin_sessions_repo::delete_session(&state.pool, token).await {
            warn!("Could not delete admin session: {}", e);
        }
    }

    let mut expired = Cookie::new(SESSION_COOKIE, "");
    expired.set_path("/");
    expired.make_removal();

    let mut response = Redirect::to("/admin/login").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, expired.to_string().parse().unwrap());
    response
}
