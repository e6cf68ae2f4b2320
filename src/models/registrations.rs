pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_WAITLISTED: &str = "waitlisted";
pub const STATUS_CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationRow {
    pub id: String,
    pub event_id: String,
    pub guardian_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// confirmed | waitlisted | cancelled
    pub status: String,
    pub attendance_confirmed: i64,
    /// JSON object keyed by custom field id.
    pub custom_answers: Option<String>,
    /// Capability token for the emailed cancel/confirm links.
    pub manage_token: String,
    pub created_at: String,
    pub cancelled_at: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationChildRow {
    pub id: String,
    pub registration_id: String,
    pub name: String,
    pub age: Option<i64>,
    pub notes: Option<String>,
}
