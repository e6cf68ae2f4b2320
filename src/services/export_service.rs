use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::database::{donations_repo, registration_children_repo, registrations_repo};
use crate::error::AppError;

/// Registrations for one event as CSV, children folded into a single column
/// ("Alice (7); Bob (9)") so the sheet stays one row per registration.
pub async fn registrations_csv(pool: &SqlitePool, event_id: &str) -> Result<String, AppError> {
    let registrations = registrations_repo::list_for_event(pool, event_id).await?;
    let children = registration_children_repo::list_for_event(pool, event_id).await?;

    let mut children_by_registration: HashMap<&str, Vec<String>> = HashMap::new();
    for child in &children {
        let label = match child.age {
            Some(age) => format!("{} ({})", child.name, age),
            None => child.name.clone(),
        };
        children_by_registration
            .entry(child.registration_id.as_str())
            .or_default()
            .push(label);
    }

    let mut out = String::new();
    push_row(
        &mut out,
        &[
            "registration_id",
            "guardian_name",
            "email",
            "phone",
            "status",
            "attendance_confirmed",
            "created_at",
            "children",
        ],
    );
    for reg in &registrations {
        let children_label = children_by_registration
            .get(reg.id.as_str())
            .map(|names| names.join("; "))
            .unwrap_or_default();
        push_row(
            &mut out,
            &[
                &reg.id,
                &reg.guardian_name,
                &reg.email,
                reg.phone.as_deref().unwrap_or(""),
                &reg.status,
                if reg.attendance_confirmed == 1 { "yes" } else { "no" },
                &reg.created_at,
                &children_label,
            ],
        );
    }
    Ok(out)
}

pub async fn donations_csv(pool: &SqlitePool) -> Result<String, AppError> {
    let rows = donations_repo::list_donation_report(pool).await?;

    let mut out = String::new();
    push_row(
        &mut out,
        &[
            "donation_id",
            "donor_name",
            "donor_email",
            "amount_pence",
            "currency",
            "gift_aid",
            "created_at",
        ],
    );
    for row in &rows {
        push_row(
            &mut out,
            &[
                &row.id,
                &row.donor_name,
                &row.donor_email,
                &row.amount_pence.to_string(),
                &row.currency,
                if row.gift_aid == 1 { "yes" } else { "no" },
                &row.created_at,
            ],
        );
    }
    Ok(out)
}

fn push_row(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field));
    }
    out.push_str("\r\n");
}

// RFC 4180: quote fields containing separators or quotes, double the quotes.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape("hello"), "hello");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn separators_and_quotes_force_quoting() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn rows_end_with_crlf() {
        let mut out = String::new();
        push_row(&mut out, &["a", "b,c"]);
        assert_eq!(out, "a,\"b,c\"\r\n");
    }
}
