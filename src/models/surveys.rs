use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SurveyRow {
    pub id: String,
    pub title: String,
    /// JSON array of `SurveyQuestion`.
    pub questions: String,
    pub open: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SurveyResponseRow {
    pub id: String,
    pub survey_id: String,
    /// JSON object keyed by question id; values are strings or string arrays.
    pub answers: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub id: String,
    pub prompt: String,
    /// text | single_choice | multi_choice
    pub kind: String,
    #[serde(default)]
    pub options: Vec<String>,
}
