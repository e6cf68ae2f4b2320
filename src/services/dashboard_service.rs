use sqlx::SqlitePool;

use crate::database::{
    donations_repo, email_logs_repo, events_repo, registrations_repo, subscribers_repo,
    surveys_repo,
};
use crate::services::donation_service;

pub struct DashboardView {
    pub published_events: i64,
    pub active_registrations: i64,
    pub donation_count: i64,
    pub donation_total_label: String,
    pub gift_aid_uplift_label: String,
    pub subscriber_count: i64,
    pub survey_count: i64,
    pub failed_emails: i64,
}

pub async fn build_dashboard(pool: &SqlitePool) -> sqlx::Result<DashboardView> {
    let totals = donations_repo::load_donation_totals(pool).await?;
    Ok(DashboardView {
        published_events: events_repo::count_published_events(pool).await?,
        active_registrations: registrations_repo::count_active(pool).await?,
        donation_count: totals.donation_count,
        donation_total_label: donation_service::format_pounds(totals.total_pence),
        gift_aid_uplift_label: donation_service::format_pounds(
            donation_service::gift_aid_uplift_pence(totals.gift_aid_pence),
        ),
        subscriber_count: subscribers_repo::count_subscribers(pool).await?,
        survey_count: surveys_repo::list_surveys(pool).await?.len() as i64,
        failed_emails: email_logs_repo::count_failed(pool).await?,
    })
}
