use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use cic_website::database::{self, admin_sessions_repo};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    database::init_schema(&pool).await.expect("schema");
    pool
}

async fn insert_aged_session(pool: &SqlitePool, token: &str, age: &str) {
    sqlx::query(
        "INSERT INTO admin_sessions (token, created_at) \
         VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ','now',?))",
    )
    .bind(token)
    .bind(age)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn fresh_sessions_are_recognised() {
    let pool = test_pool().await;
    admin_sessions_repo::insert_session(&pool, "tok-1").await.unwrap();

    assert!(admin_sessions_repo::session_exists(&pool, "tok-1").await.unwrap());
    assert!(!admin_sessions_repo::session_exists(&pool, "tok-2").await.unwrap());

    admin_sessions_repo::delete_session(&pool, "tok-1").await.unwrap();
    assert!(!admin_sessions_repo::session_exists(&pool, "tok-1").await.unwrap());
}

#[tokio::test]
async fn week_old_sessions_no_longer_authenticate() {
    let pool = test_pool().await;
    insert_aged_session(&pool, "stale", "-8 days").await;
    insert_aged_session(&pool, "recent", "-6 days").await;

    assert!(!admin_sessions_repo::session_exists(&pool, "stale").await.unwrap());
    assert!(admin_sessions_repo::session_exists(&pool, "recent").await.unwrap());
}

#[tokio::test]
async fn purge_removes_only_expired_rows() {
    let pool = test_pool().await;
    insert_aged_session(&pool, "stale", "-30 days").await;
    admin_sessions_repo::insert_session(&pool, "fresh").await.unwrap();

    let removed = admin_sessions_repo::purge_expired(&pool).await.unwrap();
    assert_eq!(removed, 1);

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
    assert!(admin_sessions_repo::session_exists(&pool, "fresh").await.unwrap());
}
