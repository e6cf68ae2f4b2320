use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::database::donations_repo;
use crate::error::AppError;

const STRIPE_CHECKOUT_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    pub amount_pence: i64,
    /// None for a one-off donation, "month"/"year" for a recurring one.
    #[serde(default)]
    pub interval: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub gift_aid: bool,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: Option<String>,
}

/// Creates a hosted Stripe Checkout session and returns its redirect URL.
/// Payment collection happens entirely on the hosted page; we never see card
/// details.
pub async fn create_checkout_session(
    config: &Config,
    input: &CheckoutInput,
) -> Result<String, AppError> {
    if input.amount_pence < 100 {
        return Err(AppError::validation("minimum donation is £1"));
    }
    let email = input.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("a valid email address is required"));
    }
    if let Some(interval) = input.interval.as_deref() {
        if interval != "month" && interval != "year" {
            return Err(AppError::validation("interval must be 'month' or 'year'"));
        }
    }
    let Some(secret_key) = config.stripe_secret_key.as_deref() else {
        return Err(AppError::Conflict("donations are not configured".to_string()));
    };

    let params = checkout_params(config, input, email);

    let client = reqwest::Client::new();
    let resp = client
        .post(STRIPE_CHECKOUT_URL)
        .basic_auth(secret_key, None::<&str>)
        .form(&params)
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(AppError::Internal(format!(
            "stripe returned {}",
            resp.status()
        )));
    }

    let session: CheckoutSession = resp.json().await?;
    session
        .url
        .ok_or_else(|| AppError::Internal("checkout session has no url".to_string()))
}

// The webhook payload never echoes the recurring interval back, so it rides
// in the session metadata alongside the donor details.
fn checkout_params(
    config: &Config,
    input: &CheckoutInput,
    email: &str,
) -> Vec<(&'static str, String)> {
    let mode = if input.interval.is_some() {
        "subscription"
    } else {
        "payment"
    };

    let mut params: Vec<(&'static str, String)> = vec![
        ("mode", mode.to_string()),
        (
            "success_url",
            config.absolute_url("/donate?outcome=success"),
        ),
        (
            "cancel_url",
            config.absolute_url("/donate?outcome=cancelled"),
        ),
        ("customer_email", email.to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        (
            "line_items[0][price_data][currency]",
            "gbp".to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            "Donation".to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            input.amount_pence.to_string(),
        ),
        ("metadata[donor_name]", input.name.trim().to_string()),
        ("metadata[gift_aid]", (input.gift_aid as i64).to_string()),
    ];
    if let Some(interval) = input.interval.as_deref() {
        params.push((
            "line_items[0][price_data][recurring][interval]",
            interval.to_string(),
        ));
        params.push(("metadata[interval]", interval.to_string()));
    }
    params
}

// Stripe webhook payload, reduced to the fields we record.
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: CheckoutSessionObject,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub mode: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub subscription: Option<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionMetadata {
    pub donor_name: Option<String>,
    pub gift_aid: Option<String>,
    /// month | year, set at checkout creation for subscription sessions.
    pub interval: Option<String>,
}

/// Records a completed checkout session as donor + donation (or donation
/// subscription). Other event types are ignored.
pub async fn record_stripe_event(pool: &SqlitePool, event: &StripeEvent) -> Result<(), AppError> {
    if event.kind != "checkout.session.completed" {
        info!("Ignoring stripe event type {}", event.kind);
        return Ok(());
    }
    let session = &event.data.object;

    let email = session
        .customer_details
        .as_ref()
        .and_then(|d| d.email.as_deref())
        .ok_or_else(|| AppError::validation("checkout session has no customer email"))?;
    let name = session
        .metadata
        .donor_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| session.customer_details.as_ref().and_then(|d| d.name.as_deref()))
        .unwrap_or("Anonymous");
    let gift_aid = session.metadata.gift_aid.as_deref() == Some("1");
    let amount = session
        .amount_total
        .ok_or_else(|| AppError::validation("checkout session has no amount"))?;

    let donor_id = match donations_repo::find_donor_by_email(pool, email).await? {
        Some(donor) => donor.id,
        None => {
            let id = Uuid::new_v4().to_string();
            donations_repo::insert_donor(
                pool,
                donations_repo::NewDonor {
                    id: &id,
                    name,
                    email,
                    gift_aid,
                },
            )
            .await?;
            id
        }
    };

    if session.mode == "subscription" {
        let interval = session.metadata.interval.as_deref().unwrap_or("month");
        donations_repo::insert_subscription(
            pool,
            donations_repo::NewSubscription {
                id: &Uuid::new_v4().to_string(),
                donor_id: &donor_id,
                amount_pence: amount,
                interval,
                stripe_subscription_id: session.subscription.as_deref(),
            },
        )
        .await?;
    } else {
        donations_repo::insert_donation(
            pool,
            donations_repo::NewDonation {
                id: &Uuid::new_v4().to_string(),
                donor_id: &donor_id,
                amount_pence: amount,
                currency: session.currency.as_deref().unwrap_or("gbp"),
                gift_aid,
                stripe_session_id: Some(&session.id),
            },
        )
        .await?;
    }
    Ok(())
}

pub struct DonationsOverview {
    pub rows: Vec<donations_repo::DonationReportRow>,
    pub donation_count: i64,
    pub total_label: String,
    pub gift_aid_label: String,
    pub uplift_label: String,
}

pub async fn build_donations_overview(pool: &SqlitePool) -> sqlx::Result<DonationsOverview> {
    let rows = donations_repo::list_donation_report(pool).await?;
    let totals = donations_repo::load_donation_totals(pool).await?;
    Ok(DonationsOverview {
        rows,
        donation_count: totals.donation_count,
        total_label: format_pounds(totals.total_pence),
        gift_aid_label: format_pounds(totals.gift_aid_pence),
        uplift_label: format_pounds(gift_aid_uplift_pence(totals.gift_aid_pence)),
    })
}

/// Gift Aid reclaim on eligible donations: +25% of the donated amount.
pub fn gift_aid_uplift_pence(eligible_pence: i64) -> i64 {
    eligible_pence / 4
}

pub fn format_pounds(pence: i64) -> String {
    format!("£{}.{:02}", pence / 100, pence % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gift_aid_is_a_quarter_of_eligible_amount() {
        assert_eq!(gift_aid_uplift_pence(0), 0);
        assert_eq!(gift_aid_uplift_pence(10_000), 2_500);
        // Sub-penny remainders are dropped, never rounded up.
        assert_eq!(gift_aid_uplift_pence(103), 25);
    }

    #[test]
    fn pence_format_pads_minor_units() {
        assert_eq!(format_pounds(0), "£0.00");
        assert_eq!(format_pounds(105), "£1.05");
        assert_eq!(format_pounds(123_450), "£1234.50");
    }

    #[test]
    fn recurring_checkouts_carry_the_interval_in_metadata() {
        let cfg = Config::from_env();
        let input = CheckoutInput {
            amount_pence: 500,
            interval: Some("year".to_string()),
            name: "Don".to_string(),
            email: "don@example.org".to_string(),
            gift_aid: false,
        };
        let params = checkout_params(&cfg, &input, "don@example.org");
        assert!(params.contains(&("mode", "subscription".to_string())));
        assert!(params.contains(&(
            "line_items[0][price_data][recurring][interval]",
            "year".to_string()
        )));
        assert!(params.contains(&("metadata[interval]", "year".to_string())));

        let one_off = CheckoutInput {
            interval: None,
            ..input
        };
        let params = checkout_params(&cfg, &one_off, "don@example.org");
        assert!(params.contains(&("mode", "payment".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "metadata[interval]"));
    }

    #[test]
    fn webhook_payload_parses_with_minimal_fields() {
        let raw = r#"{
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "mode": "payment",
                "amount_total": 2500,
                "currency": "gbp",
                "customer_details": { "email": "don@example.org", "name": "Don" }
            }}
        }"#;
        let event: StripeEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, "checkout.session.completed");
        assert_eq!(event.data.object.amount_total, Some(2500));
        assert!(event.data.object.metadata.gift_aid.is_none());
    }
}
