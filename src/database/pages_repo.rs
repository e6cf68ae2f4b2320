use sqlx::SqlitePool;

use crate::models::PageRow;

const SQL_LOAD_BY_SLUG: &str = "SELECT * FROM pages WHERE slug = ? LIMIT 1";

const SQL_LIST_ALL: &str = "SELECT * FROM pages ORDER BY slug ASC";

const SQL_UPSERT_PAGE: &str = r#"
INSERT INTO pages (slug, title, body_html)
VALUES (?, ?, ?)
ON CONFLICT(slug) DO UPDATE SET
  title = excluded.title,
  body_html = excluded.body_html,
  updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
"#;

pub async fn load_page(pool: &SqlitePool, slug: &str) -> sqlx::Result<Option<PageRow>> {
    sqlx::query_as::<_, PageRow>(SQL_LOAD_BY_SLUG)
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn list_pages(pool: &SqlitePool) -> sqlx::Result<Vec<PageRow>> {
    sqlx::query_as::<_, PageRow>(SQL_LIST_ALL).fetch_all(pool).await
}

pub async fn upsert_page(
    pool: &SqlitePool,
    slug: &str,
    title: &str,
    body_html: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_PAGE)
        .bind(slug)
        .bind(title)
        .bind(body_html)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
