use sqlx::SqlitePool;

use crate::models::SubscriberRow;

// Re-subscribing must not rotate the unsubscribe token already sent out in
// old newsletters, so the conflict branch only refreshes the name.
const SQL_UPSERT_SUBSCRIBER: &str = r#"
INSERT INTO subscribers (id, email, name, unsubscribe_token)
VALUES (?, ?, ?, ?)
ON CONFLICT(email) DO UPDATE SET name = COALESCE(excluded.name, subscribers.name)
"#;

const SQL_DELETE_BY_TOKEN: &str = "DELETE FROM subscribers WHERE unsubscribe_token = ?";

const SQL_LIST_ALL: &str = "SELECT * FROM subscribers ORDER BY subscribed_at DESC";

const SQL_COUNT_ALL: &str = "SELECT COUNT(*) FROM subscribers";

pub async fn upsert_subscriber(
    pool: &SqlitePool,
    id: &str,
    email: &str,
    name: Option<&str>,
    unsubscribe_token: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_SUBSCRIBER)
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(unsubscribe_token)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_by_token(pool: &SqlitePool, token: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_BY_TOKEN).bind(token).execute(pool).await?;
    Ok(res.rows_affected())
}

pub async fn list_subscribers(pool: &SqlitePool) -> sqlx::Result<Vec<SubscriberRow>> {
    sqlx::query_as::<_, SubscriberRow>(SQL_LIST_ALL).fetch_all(pool).await
}

pub async fn count_subscribers(pool: &SqlitePool) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_ALL).fetch_one(pool).await?;
    Ok(count)
}
