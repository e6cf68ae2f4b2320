use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::database::surveys_repo;
use crate::models::SurveyQuestion;
use crate::services::survey_service::{self, SurveyAnalyticsView};
use crate::AppState;

pub struct AdminSurveyRowView {
    pub survey_id: String,
    pub title: String,
    pub open: bool,
    pub question_count: usize,
    pub response_count: i64,
    pub created_label: String,
}

#[derive(Template)]
#[template(path = "admin_surveys.html")]
pub struct AdminSurveysTemplate {
    pub surveys: Vec<AdminSurveyRowView>,
}

pub async fn list_surveys_handler(State(state): State<AppState>) -> impl IntoResponse {
    let rows = match surveys_repo::list_surveys(&state.pool).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Surveys listing failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut surveys = Vec::with_capacity(rows.len());
    for row in &rows {
        let response_count = surveys_repo::count_responses(&state.pool, &row.id)
            .await
            .unwrap_or(0);
        surveys.push(AdminSurveyRowView {
            survey_id: row.id.clone(),
            title: row.title.clone(),
            open: row.open == 1,
            question_count: survey_service::parse_questions(row).len(),
            response_count,
            created_label: row.created_at.chars().take(10).collect(),
        });
    }

    let template = AdminSurveysTemplate { surveys };
    Html(template.render().unwrap()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SurveyForm {
    pub title: String,
    /// JSON array of question definitions.
    pub questions: String,
    pub open: Option<String>,
}

fn validate_survey_form(form: &SurveyForm) -> Result<(), &'static str> {
    if form.title.trim().is_empty() {
        return Err("title is required");
    }
    if serde_json::from_str::<Vec<SurveyQuestion>>(&form.questions).is_err() {
        return Err("questions must be a JSON array of question definitions");
    }
    Ok(())
}

pub async fn create_survey_handler(
    State(state): State<AppState>,
    Form(form): Form<SurveyForm>,
) -> impl IntoResponse {
    if let Err(msg) = validate_survey_form(&form) {
        warn!("Survey create rejected: {}", msg);
        return StatusCode::BAD_REQUEST.into_response();
    }

    let result = surveys_repo::insert_survey(
        &state.pool,
        &Uuid::new_v4().to_string(),
        form.title.trim(),
        &form.questions,
        form.open.is_some(),
    )
    .await;

    if let Err(e) = result {
        warn!("Survey create failed: {}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Redirect::to("/admin/surveys").into_response()
}

pub async fn update_survey_handler(
    Path(survey_id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<SurveyForm>,
) -> impl IntoResponse {
    if let Err(msg) = validate_survey_form(&form) {
        warn!("Survey update rejected for {}: {}", survey_id, msg);
        return StatusCode::BAD_REQUEST.into_response();
    }

    let result = surveys_repo::update_survey(
        &state.pool,
        &survey_id,
        form.title.trim(),
        &form.questions,
        form.open.is_some(),
    )
    .await;

    match result {
        Ok(0) => StatusCode::NOT_FOUND.into_response(),
        Ok(_) => Redirect::to("/admin/surveys").into_response(),
        Err(e) => {
            warn!("Survey update failed for {}: {}", survey_id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Template)]
#[template(path = "admin_survey_analytics.html")]
pub struct SurveyAnalyticsTemplate {
    pub analytics: SurveyAnalyticsView,
}

pub async fn survey_analytics_handler(
    Path(survey_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let analytics = match survey_service::build_survey_analytics(&state.pool, &survey_id).await {
        Ok(Some(analytics)) => analytics,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!("Survey analytics failed for {}: {}", survey_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let template = SurveyAnalyticsTemplate { analytics };
    Html(template.render().unwrap()).into_response()
}
