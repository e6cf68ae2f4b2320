use sqlx::SqlitePool;

use crate::models::{SurveyResponseRow, SurveyRow};

const SQL_INSERT_SURVEY: &str = r#"
INSERT INTO surveys (id, title, questions, open) VALUES (?, ?, ?, ?)
"#;

const SQL_UPDATE_SURVEY: &str = r#"
UPDATE surveys SET title = ?, questions = ?, open = ? WHERE id = ?
"#;

const SQL_LOAD_BY_ID: &str = "SELECT * FROM surveys WHERE id = ? LIMIT 1";

const SQL_LIST_ALL: &str = "SELECT * FROM surveys ORDER BY created_at DESC";

const SQL_INSERT_RESPONSE: &str = r#"
INSERT INTO survey_responses (id, survey_id, answers) VALUES (?, ?, ?)
"#;

const SQL_LIST_RESPONSES: &str = r#"
SELECT * FROM survey_responses WHERE survey_id = ? ORDER BY submitted_at ASC
"#;

const SQL_COUNT_RESPONSES: &str =
    "SELECT COUNT(*) FROM survey_responses WHERE survey_id = ?";

pub async fn insert_survey(
    pool: &SqlitePool,
    id: &str,
    title: &str,
    questions_json: &str,
    open: bool,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_SURVEY)
        .bind(id)
        .bind(title)
        .bind(questions_json)
        .bind(open as i64)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_survey(
    pool: &SqlitePool,
    id: &str,
    title: &str,
    questions_json: &str,
    open: bool,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_SURVEY)
        .bind(title)
        .bind(questions_json)
        .bind(open as i64)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_survey(pool: &SqlitePool, id: &str) -> sqlx::Result<Option<SurveyRow>> {
    sqlx::query_as::<_, SurveyRow>(SQL_LOAD_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_surveys(pool: &SqlitePool) -> sqlx::Result<Vec<SurveyRow>> {
    sqlx::query_as::<_, SurveyRow>(SQL_LIST_ALL).fetch_all(pool).await
}

pub async fn insert_response(
    pool: &SqlitePool,
    id: &str,
    survey_id: &str,
    answers_json: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_RESPONSE)
        .bind(id)
        .bind(survey_id)
        .bind(answers_json)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_responses(
    pool: &SqlitePool,
    survey_id: &str,
) -> sqlx::Result<Vec<SurveyResponseRow>> {
    sqlx::query_as::<_, SurveyResponseRow>(SQL_LIST_RESPONSES)
        .bind(survey_id)
        .fetch_all(pool)
        .await
}

pub async fn count_responses(pool: &SqlitePool, survey_id: &str) -> sqlx::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(SQL_COUNT_RESPONSES)
        .bind(survey_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
