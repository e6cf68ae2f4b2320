use sqlx::SqlitePool;

use crate::models::EmailLogRow;

const SQL_INSERT_LOG: &str = r#"
INSERT INTO email_logs (
  id,
  recipient,
  subject,
  kind,
  status,
  error
) VALUES (?, ?, ?, ?, ?, ?)
"#;

const SQL_LIST_RECENT: &str =
    "SELECT * FROM email_logs ORDER BY created_at DESC LIMIT ?";

const SQL_COUNT_FAILED: &str = "SELECT COUNT(*) FROM email_logs WHERE status = 'failed'";

pub struct NewEmailLog<'a> {
    pub id: &'a str,
    pub recipient: &'a str,
    pub subject: &'a str,
    pub kind: &'a str,
    pub status: &'a str, // sent|failed
    pub error: Option<&'a str>,
}

pub async fn insert_log(pool: &SqlitePool, log: NewEmailLog<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_LOG)
        .bind(log.id)
        .bind(log.recipient)
        .bind(log.subject)
        .bind(log.kind)
        .bind(log.status)
        .bind(log.error)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_recent(pool: &SqlitePool, limit: i64) -> sqlx::Result<Vec<EmailLogRow>> {
    sqlx::query_as::<_, EmailLogRow>(SQL_LIST_RECENT)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn count_failed(pool: &SqlitePool) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_FAILED).fetch_one(pool).await?;
    Ok(count)
}
