use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::warn;

use crate::services::donation_service::{self, format_pounds};
use crate::services::export_service;
use crate::AppState;

pub struct DonationRowView {
    pub donor_name: String,
    pub donor_email: String,
    pub amount_label: String,
    pub gift_aid: bool,
    pub created_label: String,
}

#[derive(Template)]
#[template(path = "admin_donations.html")]
pub struct AdminDonationsTemplate {
    pub donation_count: i64,
    pub total_label: String,
    pub gift_aid_label: String,
    pub uplift_label: String,
    pub donations: Vec<DonationRowView>,
}

pub async fn list_donations_handler(State(state): State<AppState>) -> impl IntoResponse {
    let overview = match donation_service::build_donations_overview(&state.pool).await {
        Ok(overview) => overview,
        Err(e) => {
            warn!("Donations overview failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let donations = overview
        .rows
        .iter()
        .map(|row| DonationRowView {
            donor_name: row.donor_name.clone(),
            donor_email: row.donor_email.clone(),
            amount_label: format_pounds(row.amount_pence),
            gift_aid: row.gift_aid == 1,
            created_label: row.created_at.chars().take(10).collect(),
        })
        .collect();

    let template = AdminDonationsTemplate {
        donation_count: overview.donation_count,
        total_label: overview.total_label,
        gift_aid_label: overview.gift_aid_label,
        uplift_label: overview.uplift_label,
        donations,
    };
    Html(template.render().unwrap()).into_response()
}

pub async fn donations_csv_handler(State(state): State<AppState>) -> Response {
    let csv = match export_service::donations_csv(&state.pool).await {
        Ok(csv) => csv,
        Err(e) => {
            warn!("Donations CSV export failed: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"donations.csv\"".to_string(),
            ),
        ],
        csv,
    )
        .into_response()
}
