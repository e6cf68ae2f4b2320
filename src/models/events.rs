use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// RFC 3339 UTC, stored as TEXT (lexicographic order == chronological).
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub venue: Option<String>,
    pub total_slots: i64,
    pub waitlist_slots: i64,
    /// open | closed | auto
    pub registration_status: String,
    /// draft | published | cancelled
    pub status: String,
    /// JSON array of `CustomField`, or NULL for none.
    pub custom_fields: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Extra per-event question shown on the registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    pub label: String,
    /// text | single_choice
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}
