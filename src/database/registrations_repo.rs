use sqlx::{SqliteConnection, SqlitePool};

use crate::models::RegistrationRow;

const SQL_COUNT_BY_STATUS: &str = r#"
SELECT COUNT(*) FROM registrations WHERE event_id = ? AND status = ?
"#;

const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO registrations (
  id,
  event_id,
  guardian_name,
  email,
  phone,
  status,
  custom_answers,
  manage_token
) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

const SQL_LOAD_BY_ID: &str = "SELECT * FROM registrations WHERE id = ? LIMIT 1";

const SQL_LOAD_BY_MANAGE_TOKEN: &str =
    "SELECT * FROM registrations WHERE manage_token = ? LIMIT 1";

const SQL_SET_STATUS: &str = "UPDATE registrations SET status = ? WHERE id = ?";

const SQL_MARK_CANCELLED: &str = r#"
UPDATE registrations SET
  status = 'cancelled',
  cancelled_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
WHERE id = ?
"#;

const SQL_SET_ATTENDANCE_CONFIRMED: &str =
    "UPDATE registrations SET attendance_confirmed = 1 WHERE id = ?";

// FIFO promotion candidate: earliest surviving waitlist entry.
const SQL_OLDEST_WAITLISTED: &str = r#"
SELECT * FROM registrations
WHERE event_id = ? AND status = 'waitlisted'
ORDER BY created_at ASC, id ASC
LIMIT 1
"#;

const SQL_LIST_FOR_EVENT: &str = r#"
SELECT * FROM registrations
WHERE event_id = ?
ORDER BY
  CASE status WHEN 'confirmed' THEN 0 WHEN 'waitlisted' THEN 1 ELSE 2 END,
  created_at ASC
"#;

const SQL_COUNT_ACTIVE: &str =
    "SELECT COUNT(*) FROM registrations WHERE status IN ('confirmed','waitlisted')";

pub struct NewRegistration<'a> {
    pub id: &'a str,
    pub event_id: &'a str,
    pub guardian_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub status: &'a str, // confirmed|waitlisted
    pub custom_answers: Option<&'a str>,
    pub manage_token: &'a str,
}

pub async fn count_by_status(
    conn: &mut SqliteConnection,
    event_id: &str,
    status: &str,
) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_BY_STATUS)
        .bind(event_id)
        .bind(status)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

pub async fn insert_registration(
    conn: &mut SqliteConnection,
    reg: NewRegistration<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(reg.id)
        .bind(reg.event_id)
        .bind(reg.guardian_name)
        .bind(reg.email)
        .bind(reg.phone)
        .bind(reg.status)
        .bind(reg.custom_answers)
        .bind(reg.manage_token)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_registration_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> sqlx::Result<Option<RegistrationRow>> {
    sqlx::query_as::<_, RegistrationRow>(SQL_LOAD_BY_ID)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn load_by_manage_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> sqlx::Result<Option<RegistrationRow>> {
    sqlx::query_as::<_, RegistrationRow>(SQL_LOAD_BY_MANAGE_TOKEN)
        .bind(token)
        .fetch_optional(conn)
        .await
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_STATUS)
        .bind(status)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn mark_cancelled(conn: &mut SqliteConnection, id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_CANCELLED).bind(id).execute(conn).await?;
    Ok(res.rows_affected())
}

pub async fn set_attendance_confirmed(
    conn: &mut SqliteConnection,
    id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_ATTENDANCE_CONFIRMED)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn oldest_waitlisted(
    conn: &mut SqliteConnection,
    event_id: &str,
) -> sqlx::Result<Option<RegistrationRow>> {
    sqlx::query_as::<_, RegistrationRow>(SQL_OLDEST_WAITLISTED)
        .bind(event_id)
        .fetch_optional(conn)
        .await
}

pub async fn list_for_event(
    pool: &SqlitePool,
    event_id: &str,
) -> sqlx::Result<Vec<RegistrationRow>> {
    sqlx::query_as::<_, RegistrationRow>(SQL_LIST_FOR_EVENT)
        .bind(event_id)
        .fetch_all(pool)
        .await
}

pub async fn count_active(pool: &SqlitePool) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_ACTIVE).fetch_one(pool).await?;
    Ok(count)
}
