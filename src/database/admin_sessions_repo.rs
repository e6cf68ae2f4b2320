use sqlx::SqlitePool;

const SQL_INSERT_SESSION: &str = "INSERT INTO admin_sessions (token) VALUES (?)";

// Sessions expire after a week; expired rows are swept on the next login.
const SQL_SESSION_EXISTS: &str = r#"
SELECT COUNT(*) FROM admin_sessions
WHERE token = ?
  AND created_at >= strftime('%Y-%m-%dT%H:%M:%fZ','now','-7 days')
LIMIT 1
"#;

const SQL_DELETE_SESSION: &str = "DELETE FROM admin_sessions WHERE token = ?";

const SQL_PURGE_EXPIRED: &str = r#"
DELETE FROM admin_sessions
WHERE created_at < strftime('%Y-%m-%dT%H:%M:%fZ','now','-7 days')
"#;

pub async fn insert_session(pool: &SqlitePool, token: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_SESSION).bind(token).execute(pool).await?;
    Ok(res.rows_affected())
}

pub async fn session_exists(pool: &SqlitePool, token: &str) -> sqlx::Result<bool> {
    let (count,): (i64,) = sqlx::query_as(SQL_SESSION_EXISTS)
        .bind(token)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_SESSION).bind(token).execute(pool).await?;
    Ok(res.rows_affected())
}

pub async fn purge_expired(pool: &SqlitePool) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_PURGE_EXPIRED).execute(pool).await?;
    Ok(res.rows_affected())
}
