// Legal and informational content (about, privacy, terms) edited in the
// back-office and rendered on the public site.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PageRow {
    pub slug: String,
    pub title: String,
    pub body_html: String,
    pub updated_at: String,
}
