#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubscriberRow {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub unsubscribe_token: String,
    pub subscribed_at: String,
}
