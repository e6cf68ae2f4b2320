use sqlx::{SqliteConnection, SqlitePool};

use crate::models::EventRow;

const SQL_INSERT_EVENT: &str = r#"
INSERT INTO events (
  id,
  title,
  description,
  starts_at,
  ends_at,
  venue,
  total_slots,
  waitlist_slots,
  registration_status,
  status,
  custom_fields
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'draft', ?)
"#;

const SQL_UPDATE_EVENT: &str = r#"
UPDATE events SET
  title = ?,
  description = ?,
  starts_at = ?,
  ends_at = ?,
  venue = ?,
  total_slots = ?,
  waitlist_slots = ?,
  registration_status = ?,
  custom_fields = ?,
  updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
WHERE id = ?
"#;

const SQL_SET_STATUS: &str = r#"
UPDATE events SET
  status = ?,
  updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
WHERE id = ?
"#;

const SQL_LOAD_BY_ID: &str = "SELECT * FROM events WHERE id = ? LIMIT 1";

const SQL_LOAD_PUBLISHED_BY_ID: &str =
    "SELECT * FROM events WHERE id = ? AND status = 'published' LIMIT 1";

const SQL_LIST_PUBLISHED: &str =
    "SELECT * FROM events WHERE status = 'published' ORDER BY starts_at ASC";

const SQL_LIST_ALL: &str = "SELECT * FROM events ORDER BY starts_at DESC";

const SQL_COUNT_PUBLISHED: &str =
    "SELECT COUNT(*) FROM events WHERE status = 'published'";

pub struct NewEvent<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub starts_at: &'a str,
    pub ends_at: Option<&'a str>,
    pub venue: Option<&'a str>,
    pub total_slots: i64,
    pub waitlist_slots: i64,
    pub registration_status: &'a str, // open|closed|auto
    pub custom_fields: Option<&'a str>,
}

pub async fn insert_event(pool: &SqlitePool, ev: NewEvent<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_EVENT)
        .bind(ev.id)
        .bind(ev.title)
        .bind(ev.description)
        .bind(ev.starts_at)
        .bind(ev.ends_at)
        .bind(ev.venue)
        .bind(ev.total_slots)
        .bind(ev.waitlist_slots)
        .bind(ev.registration_status)
        .bind(ev.custom_fields)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_event(pool: &SqlitePool, ev: NewEvent<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_EVENT)
        .bind(ev.title)
        .bind(ev.description)
        .bind(ev.starts_at)
        .bind(ev.ends_at)
        .bind(ev.venue)
        .bind(ev.total_slots)
        .bind(ev.waitlist_slots)
        .bind(ev.registration_status)
        .bind(ev.custom_fields)
        .bind(ev.id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn set_event_status(pool: &SqlitePool, id: &str, status: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_STATUS)
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_event_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> sqlx::Result<Option<EventRow>> {
    sqlx::query_as::<_, EventRow>(SQL_LOAD_BY_ID)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn load_published_event(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<EventRow>> {
    sqlx::query_as::<_, EventRow>(SQL_LOAD_PUBLISHED_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_published_events(pool: &SqlitePool) -> sqlx::Result<Vec<EventRow>> {
    sqlx::query_as::<_, EventRow>(SQL_LIST_PUBLISHED)
        .fetch_all(pool)
        .await
}

pub async fn list_all_events(pool: &SqlitePool) -> sqlx::Result<Vec<EventRow>> {
    sqlx::query_as::<_, EventRow>(SQL_LIST_ALL).fetch_all(pool).await
}

pub async fn count_published_events(pool: &SqlitePool) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_PUBLISHED).fetch_one(pool).await?;
    Ok(count)
}
