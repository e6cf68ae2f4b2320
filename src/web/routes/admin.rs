use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;
use tracing::warn;

use crate::database::{email_logs_repo, pages_repo};
use crate::models::{EmailLogRow, PageRow};
use crate::services::dashboard_service::{self, DashboardView};
use crate::AppState;

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
pub struct DashboardTemplate {
    pub dashboard: DashboardView,
    pub email_logs: Vec<EmailLogRow>,
}

pub async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    let dashboard = match dashboard_service::build_dashboard(&state.pool).await {
        Ok(d) => d,
        Err(e) => {
            warn!("Dashboard build failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let email_logs = email_logs_repo::list_recent(&state.pool, 20)
        .await
        .unwrap_or_default();

    let template = DashboardTemplate {
        dashboard,
        email_logs,
    };
    Html(template.render().unwrap()).into_response()
}

#[derive(Template)]
#[template(path = "admin_pages.html")]
pub struct AdminPagesTemplate {
    pub pages: Vec<PageRow>,
}

pub async fn pages_handler(State(state): State<AppState>) -> impl IntoResponse {
    let pages = match pages_repo::list_pages(&state.pool).await {
        Ok(pages) => pages,
        Err(e) => {
            warn!("Pages listing failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let template = AdminPagesTemplate { pages };
    Html(template.render().unwrap()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub slug: String,
    pub title: String,
    pub body_html: String,
}

pub async fn save_page_handler(
    State(state): State<AppState>,
    Form(form): Form<PageForm>,
) -> impl IntoResponse {
    let slug = form.slug.trim().to_lowercase();
    if slug.is_empty() || form.title.trim().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    if let Err(e) = pages_repo::upsert_page(&state.pool, &slug, form.title.trim(), &form.body_html).await
    {
        warn!("Page save failed for {}: {}", slug, e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Redirect::to("/admin/pages").into_response()
}
