use sqlx::{SqliteConnection, SqlitePool};

use crate::models::RegistrationChildRow;

const SQL_INSERT_CHILD: &str = r#"
INSERT INTO registration_children (
  id,
  registration_id,
  name,
  age,
  notes
) VALUES (?, ?, ?, ?, ?)
"#;

const SQL_LIST_FOR_REGISTRATION: &str = r#"
SELECT * FROM registration_children WHERE registration_id = ? ORDER BY name ASC
"#;

// Children across a whole event, for the admin table and the CSV export.
const SQL_LIST_FOR_EVENT: &str = r#"
SELECT c.*
FROM registration_children c
JOIN registrations r ON r.id = c.registration_id
WHERE r.event_id = ?
ORDER BY c.registration_id, c.name ASC
"#;

pub struct NewChild<'a> {
    pub id: &'a str,
    pub registration_id: &'a str,
    pub name: &'a str,
    pub age: Option<i64>,
    pub notes: Option<&'a str>,
}

pub async fn insert_child(conn: &mut SqliteConnection, child: NewChild<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_CHILD)
        .bind(child.id)
        .bind(child.registration_id)
        .bind(child.name)
        .bind(child.age)
        .bind(child.notes)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_for_registration(
    pool: &SqlitePool,
    registration_id: &str,
) -> sqlx::Result<Vec<RegistrationChildRow>> {
    sqlx::query_as::<_, RegistrationChildRow>(SQL_LIST_FOR_REGISTRATION)
        .bind(registration_id)
        .fetch_all(pool)
        .await
}

pub async fn list_for_event(
    pool: &SqlitePool,
    event_id: &str,
) -> sqlx::Result<Vec<RegistrationChildRow>> {
    sqlx::query_as::<_, RegistrationChildRow>(SQL_LIST_FOR_EVENT)
        .bind(event_id)
        .fetch_all(pool)
        .await
}
