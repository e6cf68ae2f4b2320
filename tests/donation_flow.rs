use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use cic_website::database::{self, donations_repo};
use cic_website::services::donation_service::{self, StripeEvent};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    database::init_schema(&pool).await.expect("schema");
    pool
}

fn completed_session(body: &str) -> StripeEvent {
    let raw = format!(
        r#"{{ "type": "checkout.session.completed", "data": {{ "object": {} }} }}"#,
        body
    );
    serde_json::from_str(&raw).expect("webhook payload")
}

async fn donor_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM donors")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn one_off_sessions_become_donor_and_donation_rows() {
    let pool = test_pool().await;
    let event = completed_session(
        r#"{
            "id": "cs_1",
            "mode": "payment",
            "amount_total": 2500,
            "currency": "gbp",
            "customer_details": { "email": "don@example.org", "name": "Don" },
            "metadata": { "donor_name": "Don Smith", "gift_aid": "1" }
        }"#,
    );
    donation_service::record_stripe_event(&pool, &event)
        .await
        .unwrap();

    let report = donations_repo::list_donation_report(&pool).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].donor_name, "Don Smith");
    assert_eq!(report[0].donor_email, "don@example.org");
    assert_eq!(report[0].amount_pence, 2500);
    assert_eq!(report[0].gift_aid, 1);

    let totals = donations_repo::load_donation_totals(&pool).await.unwrap();
    assert_eq!(totals.donation_count, 1);
    assert_eq!(totals.gift_aid_pence, 2500);
}

#[tokio::test]
async fn yearly_subscriptions_keep_their_interval() {
    let pool = test_pool().await;
    let event = completed_session(
        r#"{
            "id": "cs_2",
            "mode": "subscription",
            "amount_total": 1200,
            "currency": "gbp",
            "subscription": "sub_1",
            "customer_details": { "email": "ann@example.org", "name": "Ann" },
            "metadata": { "donor_name": "Ann", "gift_aid": "0", "interval": "year" }
        }"#,
    );
    donation_service::record_stripe_event(&pool, &event)
        .await
        .unwrap();

    let (interval, amount, stripe_id): (String, i64, Option<String>) = sqlx::query_as(
        "SELECT interval, amount_pence, stripe_subscription_id FROM donation_subscriptions",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(interval, "year");
    assert_eq!(amount, 1200);
    assert_eq!(stripe_id.as_deref(), Some("sub_1"));

    // Subscriptions never show up in the one-off donation totals.
    let totals = donations_repo::load_donation_totals(&pool).await.unwrap();
    assert_eq!(totals.donation_count, 0);
}

#[tokio::test]
async fn subscriptions_without_interval_metadata_default_to_monthly() {
    let pool = test_pool().await;
    let event = completed_session(
        r#"{
            "id": "cs_3",
            "mode": "subscription",
            "amount_total": 500,
            "customer_details": { "email": "bob@example.org" }
        }"#,
    );
    donation_service::record_stripe_event(&pool, &event)
        .await
        .unwrap();

    let (interval,): (String,) =
        sqlx::query_as("SELECT interval FROM donation_subscriptions")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(interval, "month");
}

#[tokio::test]
async fn repeat_donors_are_matched_by_email() {
    let pool = test_pool().await;
    for id in ["cs_4", "cs_5"] {
        let event = completed_session(&format!(
            r#"{{
                "id": "{}",
                "mode": "payment",
                "amount_total": 1000,
                "currency": "gbp",
                "customer_details": {{ "email": "don@example.org", "name": "Don" }}
            }}"#,
            id
        ));
        donation_service::record_stripe_event(&pool, &event)
            .await
            .unwrap();
    }

    assert_eq!(donor_count(&pool).await, 1);
    let totals = donations_repo::load_donation_totals(&pool).await.unwrap();
    assert_eq!(totals.donation_count, 2);
    assert_eq!(totals.total_pence, 2000);
}

#[tokio::test]
async fn other_event_types_are_ignored() {
    let pool = test_pool().await;
    let event: StripeEvent = serde_json::from_str(
        r#"{
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_1", "mode": "payment" } }
        }"#,
    )
    .unwrap();
    donation_service::record_stripe_event(&pool, &event)
        .await
        .unwrap();

    assert_eq!(donor_count(&pool).await, 0);
}
