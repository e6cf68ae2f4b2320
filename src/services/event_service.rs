use sqlx::SqlitePool;
use tracing::warn;

use crate::database::{self, events_repo, registrations_repo};
use crate::models::registrations::{STATUS_CONFIRMED, STATUS_WAITLISTED};
use crate::models::{CustomField, EventRow};
use crate::services::registration_service;

pub struct EventCardView {
    pub event_id: String,
    pub title: String,
    pub date_label: String,
    pub time_label: String,
    pub venue_label: String,
    pub total_slots: i64,
    pub confirmed_count: i64,
    pub spots_remaining: i64,
    pub is_full: bool,
    pub capacity_pct: i64,
    pub registration_open: bool,
}

pub struct EventDetailView {
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub date_label: String,
    pub time_label: String,
    pub venue_label: String,
    pub total_slots: i64,
    pub waitlist_slots: i64,
    pub confirmed_count: i64,
    pub waitlisted_count: i64,
    pub spots_remaining: i64,
    pub waitlist_remaining: i64,
    pub is_full: bool,
    pub capacity_pct: i64,
    pub registration_open: bool,
    pub custom_fields: Vec<CustomField>,
}

pub async fn list_public_events(pool: &SqlitePool) -> sqlx::Result<Vec<EventCardView>> {
    let rows = events_repo::list_published_events(pool).await?;
    let mut conn = pool.acquire().await?;
    let now = database::now_utc(&mut conn).await?;

    let mut cards = Vec::with_capacity(rows.len());
    for row in rows {
        let confirmed =
            registrations_repo::count_by_status(&mut conn, &row.id, STATUS_CONFIRMED).await?;
        cards.push(build_card(row, confirmed, &now));
    }
    Ok(cards)
}

pub async fn load_public_event(
    pool: &SqlitePool,
    event_id: &str,
) -> sqlx::Result<Option<EventDetailView>> {
    let Some(row) = events_repo::load_published_event(pool, event_id).await? else {
        return Ok(None);
    };
    let mut conn = pool.acquire().await?;
    let now = database::now_utc(&mut conn).await?;
    let confirmed =
        registrations_repo::count_by_status(&mut conn, &row.id, STATUS_CONFIRMED).await?;
    let waitlisted =
        registrations_repo::count_by_status(&mut conn, &row.id, STATUS_WAITLISTED).await?;
    Ok(Some(build_detail(row, confirmed, waitlisted, &now)))
}

fn build_card(row: EventRow, confirmed: i64, now: &str) -> EventCardView {
    let (date_label, time_label) = format_schedule_labels(&row.starts_at);
    let spots_remaining = (row.total_slots - confirmed).max(0);
    EventCardView {
        event_id: row.id.clone(),
        title: row.title.clone(),
        date_label,
        time_label,
        venue_label: row.venue.clone().unwrap_or_default(),
        total_slots: row.total_slots,
        confirmed_count: confirmed,
        spots_remaining,
        is_full: spots_remaining == 0,
        capacity_pct: compute_capacity_pct(confirmed, row.total_slots),
        registration_open: registration_service::registration_open(&row, now),
    }
}

fn build_detail(row: EventRow, confirmed: i64, waitlisted: i64, now: &str) -> EventDetailView {
    let (date_label, time_label) = format_schedule_labels(&row.starts_at);
    let spots_remaining = (row.total_slots - confirmed).max(0);
    let waitlist_remaining = (row.waitlist_slots - waitlisted).max(0);
    let custom_fields = parse_custom_fields(row.custom_fields.as_deref());
    EventDetailView {
        event_id: row.id.clone(),
        title: row.title.clone(),
        description: row.description.clone().unwrap_or_default(),
        date_label,
        time_label,
        venue_label: row.venue.clone().unwrap_or_default(),
        total_slots: row.total_slots,
        waitlist_slots: row.waitlist_slots,
        confirmed_count: confirmed,
        waitlisted_count: waitlisted,
        spots_remaining,
        waitlist_remaining,
        is_full: spots_remaining == 0,
        capacity_pct: compute_capacity_pct(confirmed, row.total_slots),
        registration_open: registration_service::registration_open(&row, now),
        custom_fields,
    }
}

pub fn parse_custom_fields(raw: Option<&str>) -> Vec<CustomField> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Unparseable custom_fields JSON: {}", e);
            Vec::new()
        }
    }
}

/// "2026-06-01T14:30:00.000Z" -> ("2026-06-01", "14:30").
/// Timestamps are plain TEXT; labels stay dependency-free.
pub fn format_schedule_labels(raw: &str) -> (String, String) {
    match raw.split_once('T') {
        Some((date, time)) => (date.to_string(), time.chars().take(5).collect()),
        None => (raw.to_string(), String::new()),
    }
}

fn compute_capacity_pct(confirmed: i64, total_slots: i64) -> i64 {
    if total_slots <= 0 {
        return 100;
    }
    (confirmed * 100 / total_slots).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_labels_split_date_and_time() {
        let (date, time) = format_schedule_labels("2026-06-01T14:30:00.000Z");
        assert_eq!(date, "2026-06-01");
        assert_eq!(time, "14:30");
    }

    #[test]
    fn schedule_labels_pass_through_odd_input() {
        let (date, time) = format_schedule_labels("soon");
        assert_eq!(date, "soon");
        assert_eq!(time, "");
    }

    #[test]
    fn capacity_pct_handles_zero_slots() {
        assert_eq!(compute_capacity_pct(0, 0), 100);
        assert_eq!(compute_capacity_pct(1, 4), 25);
        assert_eq!(compute_capacity_pct(9, 4), 100);
    }

    #[test]
    fn custom_fields_parse_leniently() {
        assert!(parse_custom_fields(None).is_empty());
        assert!(parse_custom_fields(Some("not json")).is_empty());
        let fields = parse_custom_fields(Some(
            r#"[{"id":"t","label":"T-shirt size","kind":"single_choice","options":["S","M"]}]"#,
        ));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].options, vec!["S", "M"]);
    }
}
