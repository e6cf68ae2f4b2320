use sqlx::SqlitePool;

use crate::models::DonorRow;

const SQL_FIND_DONOR_BY_EMAIL: &str = "SELECT * FROM donors WHERE email = ? LIMIT 1";

const SQL_INSERT_DONOR: &str = r#"
INSERT INTO donors (id, name, email, gift_aid) VALUES (?, ?, ?, ?)
"#;

const SQL_INSERT_DONATION: &str = r#"
INSERT INTO donations (
  id,
  donor_id,
  amount_pence,
  currency,
  gift_aid,
  stripe_session_id
) VALUES (?, ?, ?, ?, ?, ?)
"#;

const SQL_INSERT_SUBSCRIPTION: &str = r#"
INSERT INTO donation_subscriptions (
  id,
  donor_id,
  amount_pence,
  interval,
  stripe_subscription_id,
  status
) VALUES (?, ?, ?, ?, ?, 'active')
"#;

// Report rows join the donor so the admin table and CSV need one query.
const SQL_LIST_REPORT: &str = r#"
SELECT
  d.id,
  o.name AS donor_name,
  o.email AS donor_email,
  d.amount_pence,
  d.currency,
  d.gift_aid,
  d.created_at
FROM donations d
JOIN donors o ON o.id = d.donor_id
ORDER BY d.created_at DESC
"#;

const SQL_TOTALS: &str = r#"
SELECT
  COUNT(*) AS donation_count,
  COALESCE(SUM(amount_pence), 0) AS total_pence,
  COALESCE(SUM(CASE WHEN gift_aid = 1 THEN amount_pence ELSE 0 END), 0) AS gift_aid_pence
FROM donations
"#;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DonationReportRow {
    pub id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount_pence: i64,
    pub currency: String,
    pub gift_aid: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct DonationTotalsRow {
    pub donation_count: i64,
    pub total_pence: i64,
    pub gift_aid_pence: i64,
}

pub struct NewDonor<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub gift_aid: bool,
}

pub struct NewDonation<'a> {
    pub id: &'a str,
    pub donor_id: &'a str,
    pub amount_pence: i64,
    pub currency: &'a str,
    pub gift_aid: bool,
    pub stripe_session_id: Option<&'a str>,
}

pub struct NewSubscription<'a> {
    pub id: &'a str,
    pub donor_id: &'a str,
    pub amount_pence: i64,
    pub interval: &'a str, // month|year
    pub stripe_subscription_id: Option<&'a str>,
}

pub async fn find_donor_by_email(
    pool: &SqlitePool,
    email: &str,
) -> sqlx::Result<Option<DonorRow>> {
    sqlx::query_as::<_, DonorRow>(SQL_FIND_DONOR_BY_EMAIL)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn insert_donor(pool: &SqlitePool, donor: NewDonor<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_DONOR)
        .bind(donor.id)
        .bind(donor.name)
        .bind(donor.email)
        .bind(donor.gift_aid as i64)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn insert_donation(pool: &SqlitePool, donation: NewDonation<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_DONATION)
        .bind(donation.id)
        .bind(donation.donor_id)
        .bind(donation.amount_pence)
        .bind(donation.currency)
        .bind(donation.gift_aid as i64)
        .bind(donation.stripe_session_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn insert_subscription(
    pool: &SqlitePool,
    sub: NewSubscription<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_SUBSCRIPTION)
        .bind(sub.id)
        .bind(sub.donor_id)
        .bind(sub.amount_pence)
        .bind(sub.interval)
        .bind(sub.stripe_subscription_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_donation_report(pool: &SqlitePool) -> sqlx::Result<Vec<DonationReportRow>> {
    sqlx::query_as::<_, DonationReportRow>(SQL_LIST_REPORT)
        .fetch_all(pool)
        .await
}

pub async fn load_donation_totals(pool: &SqlitePool) -> sqlx::Result<DonationTotalsRow> {
    sqlx::query_as::<_, DonationTotalsRow>(SQL_TOTALS)
        .fetch_one(pool)
        .await
}
