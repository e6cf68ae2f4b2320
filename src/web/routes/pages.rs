use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use tracing::warn;

use crate::database::pages_repo;
use crate::models::PageRow;
use crate::AppState;

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub page: PageRow,
}

pub async fn page_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let page = match pages_repo::load_page(&state.pool, &slug).await {
        Ok(p) => p,
        Err(e) => {
            warn!("Page load failed for {}: {}", slug, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let Some(page) = page else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let template = PageTemplate { page };
    Html(template.render().unwrap()).into_response()
}
