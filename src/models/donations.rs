#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DonorRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub gift_aid: i64,
    pub created_at: String,
}

