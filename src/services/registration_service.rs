use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{
    self, events_repo, registration_children_repo, registrations_repo,
};
use crate::error::AppError;
use crate::models::registrations::{STATUS_CANCELLED, STATUS_CONFIRMED, STATUS_WAITLISTED};
use crate::models::{CustomField, EventRow, RegistrationRow};

#[derive(Debug, Deserialize)]
pub struct RegistrationInput {
    pub guardian_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub children: Vec<ChildInput>,
    #[serde(default)]
    pub custom_answers: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChildInput {
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct RegistrationOutcome {
    pub registration_id: String,
    pub manage_token: String,
    /// confirmed | waitlisted
    pub status: &'static str,
    pub event_title: String,
    pub email: String,
}

pub struct CancelOutcome {
    pub registration: RegistrationRow,
    /// Waitlist entry promoted into the freed slot, if any.
    pub promoted: Option<RegistrationRow>,
    pub event: EventRow,
}

/// Core admission decision over the two capacity counters. Pure so the
/// boundary cases stay easy to pin down in tests.
pub fn decide_admission(
    total_slots: i64,
    waitlist_slots: i64,
    confirmed: i64,
    waitlisted: i64,
) -> Option<&'static str> {
    let spots_remaining = (total_slots - confirmed).max(0);
    let waitlist_remaining = (waitlist_slots - waitlisted).max(0);
    if spots_remaining > 0 {
        Some(STATUS_CONFIRMED)
    } else if waitlist_remaining > 0 {
        Some(STATUS_WAITLISTED)
    } else {
        None
    }
}

/// Whether the event currently accepts submissions. `auto` closes once the
/// start time has passed; timestamps are RFC 3339 so string order suffices.
pub fn registration_open(event: &EventRow, now: &str) -> bool {
    match event.registration_status.as_str() {
        "closed" => false,
        "open" => true,
        _ => now < event.starts_at.as_str(),
    }
}

/// Public registration submission. The availability counts are re-read and
/// the row inserted inside one transaction, so two submissions racing for the
/// last slot cannot both land as confirmed.
pub async fn register(
    pool: &SqlitePool,
    event_id: &str,
    input: &RegistrationInput,
) -> Result<RegistrationOutcome, AppError> {
    validate_input(input)?;

    let mut tx = pool.begin().await?;

    let Some(event) = events_repo::load_event_by_id(&mut tx, event_id).await? else {
        return Err(AppError::NotFound);
    };
    if event.status != "published" {
        return Err(AppError::NotFound);
    }

    let now = database::now_utc(&mut tx).await?;
    if !registration_open(&event, &now) {
        return Err(AppError::Conflict("registration is closed".to_string()));
    }

    validate_custom_answers(&event, &input.custom_answers)?;

    let confirmed = registrations_repo::count_by_status(&mut tx, event_id, STATUS_CONFIRMED).await?;
    let waitlisted =
        registrations_repo::count_by_status(&mut tx, event_id, STATUS_WAITLISTED).await?;

    let Some(status) =
        decide_admission(event.total_slots, event.waitlist_slots, confirmed, waitlisted)
    else {
        return Err(AppError::Conflict("fully booked".to_string()));
    };

    let registration_id = Uuid::new_v4().to_string();
    let manage_token = Uuid::new_v4().to_string();
    let custom_answers_json = if input.custom_answers.is_empty() {
        None
    } else {
        Some(serde_json::Value::Object(input.custom_answers.clone()).to_string())
    };

    registrations_repo::insert_registration(
        &mut tx,
        registrations_repo::NewRegistration {
            id: &registration_id,
            event_id,
            guardian_name: input.guardian_name.trim(),
            email: input.email.trim(),
            phone: input.phone.as_deref(),
            status,
            custom_answers: custom_answers_json.as_deref(),
            manage_token: &manage_token,
        },
    )
    .await?;

    for child in &input.children {
        registration_children_repo::insert_child(
            &mut tx,
            registration_children_repo::NewChild {
                id: &Uuid::new_v4().to_string(),
                registration_id: &registration_id,
                name: child.name.trim(),
                age: child.age,
                notes: child.notes.as_deref(),
            },
        )
        .await?;
    }

    tx.commit().await?;

    Ok(RegistrationOutcome {
        registration_id,
        manage_token,
        status,
        event_title: event.title,
        email: input.email.trim().to_string(),
    })
}

/// Cancellation via the emailed manage link. A freed confirmed slot is handed
/// to the oldest waitlisted registration within the same transaction.
pub async fn cancel_by_token(pool: &SqlitePool, token: &str) -> Result<CancelOutcome, AppError> {
    let mut tx = pool.begin().await?;
    let Some(reg) = registrations_repo::load_by_manage_token(&mut tx, token).await? else {
        return Err(AppError::NotFound);
    };
    let outcome = cancel_in_tx(&mut tx, reg).await?;
    tx.commit().await?;
    Ok(outcome)
}

/// Admin cancellation by registration id, same promotion semantics.
pub async fn cancel_by_id(pool: &SqlitePool, id: &str) -> Result<CancelOutcome, AppError> {
    let mut tx = pool.begin().await?;
    let Some(reg) = registrations_repo::load_registration_by_id(&mut tx, id).await? else {
        return Err(AppError::NotFound);
    };
    let outcome = cancel_in_tx(&mut tx, reg).await?;
    tx.commit().await?;
    Ok(outcome)
}

async fn cancel_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    reg: RegistrationRow,
) -> Result<CancelOutcome, AppError> {
    if reg.status == STATUS_CANCELLED {
        return Err(AppError::Conflict("already cancelled".to_string()));
    }
    let was_confirmed = reg.status == STATUS_CONFIRMED;

    registrations_repo::mark_cancelled(&mut *tx, &reg.id).await?;

    let mut promoted = None;
    if was_confirmed {
        // The cancellation freed exactly one confirmed slot.
        if let Some(next) = registrations_repo::oldest_waitlisted(&mut *tx, &reg.event_id).await? {
            registrations_repo::set_status(&mut *tx, &next.id, STATUS_CONFIRMED).await?;
            promoted = Some(RegistrationRow {
                status: STATUS_CONFIRMED.to_string(),
                ..next
            });
        }
    }

    let event = events_repo::load_event_by_id(&mut *tx, &reg.event_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(CancelOutcome {
        registration: reg,
        promoted,
        event,
    })
}

/// Attendance confirmation via the emailed manage link.
pub async fn confirm_attendance_by_token(
    pool: &SqlitePool,
    token: &str,
) -> Result<RegistrationRow, AppError> {
    let mut tx = pool.begin().await?;
    let Some(reg) = registrations_repo::load_by_manage_token(&mut tx, token).await? else {
        return Err(AppError::NotFound);
    };
    if reg.status == STATUS_CANCELLED {
        return Err(AppError::Conflict("registration was cancelled".to_string()));
    }
    registrations_repo::set_attendance_confirmed(&mut tx, &reg.id).await?;
    tx.commit().await?;
    Ok(reg)
}

/// Manual promotion of a specific waitlisted registration. Re-checks capacity
/// rather than trusting the admin screen the click came from.
pub async fn promote_by_id(pool: &SqlitePool, id: &str) -> Result<RegistrationRow, AppError> {
    let mut tx = pool.begin().await?;
    let Some(reg) = registrations_repo::load_registration_by_id(&mut tx, id).await? else {
        return Err(AppError::NotFound);
    };
    if reg.status != STATUS_WAITLISTED {
        return Err(AppError::Conflict("registration is not waitlisted".to_string()));
    }
    let Some(event) = events_repo::load_event_by_id(&mut tx, &reg.event_id).await? else {
        return Err(AppError::NotFound);
    };
    let confirmed =
        registrations_repo::count_by_status(&mut tx, &reg.event_id, STATUS_CONFIRMED).await?;
    if confirmed >= event.total_slots {
        return Err(AppError::Conflict("no confirmed slot free".to_string()));
    }
    registrations_repo::set_status(&mut tx, &reg.id, STATUS_CONFIRMED).await?;
    tx.commit().await?;
    Ok(RegistrationRow {
        status: STATUS_CONFIRMED.to_string(),
        ..reg
    })
}

fn validate_input(input: &RegistrationInput) -> Result<(), AppError> {
    if input.guardian_name.trim().is_empty() {
        return Err(AppError::validation("name is required"));
    }
    let email = input.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("a valid email address is required"));
    }
    for child in &input.children {
        if child.name.trim().is_empty() {
            return Err(AppError::validation("child name is required"));
        }
    }
    Ok(())
}

fn validate_custom_answers(
    event: &EventRow,
    answers: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), AppError> {
    let fields: Vec<CustomField> = event
        .custom_fields
        .as_deref()
        .map(|raw| serde_json::from_str(raw).unwrap_or_default())
        .unwrap_or_default();

    for key in answers.keys() {
        if !fields.iter().any(|f| f.id == *key) {
            return Err(AppError::validation(format!("unknown form field: {}", key)));
        }
    }
    for field in &fields {
        if field.required {
            let missing = match answers.get(&field.id) {
                Some(serde_json::Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
                None => true,
            };
            if missing {
                return Err(AppError::validation(format!(
                    "field '{}' is required",
                    field.label
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_fills_confirmed_before_waitlist() {
        assert_eq!(decide_admission(2, 1, 0, 0), Some(STATUS_CONFIRMED));
        assert_eq!(decide_admission(2, 1, 1, 0), Some(STATUS_CONFIRMED));
        assert_eq!(decide_admission(2, 1, 2, 0), Some(STATUS_WAITLISTED));
        assert_eq!(decide_admission(2, 1, 2, 1), None);
    }

    #[test]
    fn admission_tolerates_overfull_counts() {
        // Counts above the limits (e.g. after an admin shrank the event) must
        // not underflow into phantom capacity.
        assert_eq!(decide_admission(2, 1, 5, 0), Some(STATUS_WAITLISTED));
        assert_eq!(decide_admission(2, 1, 5, 3), None);
    }

    #[test]
    fn zero_waitlist_rejects_once_full() {
        assert_eq!(decide_admission(1, 0, 1, 0), None);
    }

    fn event_with(registration_status: &str, starts_at: &str) -> EventRow {
        EventRow {
            id: "e1".to_string(),
            title: "Summer picnic".to_string(),
            description: None,
            starts_at: starts_at.to_string(),
            ends_at: None,
            venue: None,
            total_slots: 10,
            waitlist_slots: 5,
            registration_status: registration_status.to_string(),
            status: "published".to_string(),
            custom_fields: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn auto_status_closes_after_start() {
        let ev = event_with("auto", "2026-06-01T10:00:00.000Z");
        assert!(registration_open(&ev, "2026-05-31T10:00:00.000Z"));
        assert!(!registration_open(&ev, "2026-06-01T10:00:00.001Z"));
    }

    #[test]
    fn explicit_status_wins_over_schedule() {
        let past = event_with("open", "2020-01-01T00:00:00.000Z");
        assert!(registration_open(&past, "2026-01-01T00:00:00.000Z"));
        let future = event_with("closed", "2030-01-01T00:00:00.000Z");
        assert!(!registration_open(&future, "2026-01-01T00:00:00.000Z"));
    }

    #[test]
    fn custom_answers_are_checked_against_field_defs() {
        let mut ev = event_with("open", "2030-01-01T00:00:00.000Z");
        ev.custom_fields = Some(
            r#"[{"id":"allergies","label":"Allergies","kind":"text","required":true}]"#.to_string(),
        );

        let mut answers = serde_json::Map::new();
        assert!(validate_custom_answers(&ev, &answers).is_err());

        answers.insert("allergies".to_string(), serde_json::json!("none"));
        assert!(validate_custom_answers(&ev, &answers).is_ok());

        answers.insert("bogus".to_string(), serde_json::json!("x"));
        assert!(validate_custom_answers(&ev, &answers).is_err());
    }
}
