#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailLogRow {
    pub id: String,
    pub recipient: String,
    pub subject: String,
    /// registration | promotion | newsletter | ...
    pub kind: String,
    /// sent | failed
    pub status: String,
    pub error: Option<String>,
    pub created_at: String,
}
