use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use cic_website::database::{self, events_repo, registration_children_repo, registrations_repo};
use cic_website::error::AppError;
use cic_website::models::registrations::{STATUS_CONFIRMED, STATUS_WAITLISTED};
use cic_website::services::registration_service::{self, ChildInput, RegistrationInput};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    database::init_schema(&pool).await.expect("schema");
    pool
}

async fn seed_event(
    pool: &SqlitePool,
    total_slots: i64,
    waitlist_slots: i64,
    registration_status: &str,
) -> String {
    let id = Uuid::new_v4().to_string();
    events_repo::insert_event(
        pool,
        events_repo::NewEvent {
            id: &id,
            title: "Family fun day",
            description: None,
            starts_at: "2099-06-01T10:00:00.000Z",
            ends_at: None,
            venue: Some("The community hall"),
            total_slots,
            waitlist_slots,
            registration_status,
            custom_fields: None,
        },
    )
    .await
    .unwrap();
    events_repo::set_event_status(pool, &id, "published")
        .await
        .unwrap();
    id
}

fn input(name: &str) -> RegistrationInput {
    RegistrationInput {
        guardian_name: name.to_string(),
        email: format!("{}@example.org", name),
        phone: None,
        children: vec![],
        custom_answers: serde_json::Map::new(),
    }
}

async fn counts(pool: &SqlitePool, event_id: &str) -> (i64, i64) {
    let mut conn = pool.acquire().await.unwrap();
    let confirmed = registrations_repo::count_by_status(&mut conn, event_id, STATUS_CONFIRMED)
        .await
        .unwrap();
    let waitlisted = registrations_repo::count_by_status(&mut conn, event_id, STATUS_WAITLISTED)
        .await
        .unwrap();
    (confirmed, waitlisted)
}

#[tokio::test]
async fn fills_confirmed_then_waitlist_then_rejects() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 2, 1, "open").await;

    let first = registration_service::register(&pool, &event_id, &input("amy"))
        .await
        .unwrap();
    let second = registration_service::register(&pool, &event_id, &input("ben"))
        .await
        .unwrap();
    let third = registration_service::register(&pool, &event_id, &input("cat"))
        .await
        .unwrap();

    assert_eq!(first.status, STATUS_CONFIRMED);
    assert_eq!(second.status, STATUS_CONFIRMED);
    assert_eq!(third.status, STATUS_WAITLISTED);

    let fourth = registration_service::register(&pool, &event_id, &input("dan")).await;
    match fourth {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "fully booked"),
        other => panic!("expected fully booked, got {:?}", other.map(|o| o.status)),
    }

    assert_eq!(counts(&pool, &event_id).await, (2, 1));
}

#[tokio::test]
async fn capacity_bounds_hold_over_many_attempts() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 2, 2, "open").await;

    for i in 0..10 {
        let _ = registration_service::register(&pool, &event_id, &input(&format!("p{}", i))).await;
        let (confirmed, waitlisted) = counts(&pool, &event_id).await;
        assert!(confirmed <= 2, "confirmed exceeded total_slots");
        assert!(waitlisted <= 2, "waitlisted exceeded waitlist_slots");
    }
    assert_eq!(counts(&pool, &event_id).await, (2, 2));
}

#[tokio::test]
async fn cancellation_promotes_oldest_waitlisted() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 2, 1, "open").await;

    let first = registration_service::register(&pool, &event_id, &input("amy"))
        .await
        .unwrap();
    registration_service::register(&pool, &event_id, &input("ben"))
        .await
        .unwrap();
    let third = registration_service::register(&pool, &event_id, &input("cat"))
        .await
        .unwrap();
    assert_eq!(third.status, STATUS_WAITLISTED);

    let outcome = registration_service::cancel_by_token(&pool, &first.manage_token)
        .await
        .unwrap();
    let promoted = outcome.promoted.expect("waitlisted entry should be promoted");
    assert_eq!(promoted.id, third.registration_id);
    assert_eq!(promoted.status, STATUS_CONFIRMED);

    // Capacity is full again, so the next submitter goes onto the now-empty
    // waitlist and the bounds still hold.
    let fifth = registration_service::register(&pool, &event_id, &input("eve"))
        .await
        .unwrap();
    assert_eq!(fifth.status, STATUS_WAITLISTED);
    assert_eq!(counts(&pool, &event_id).await, (2, 1));
}

#[tokio::test]
async fn cancelling_a_waitlisted_entry_promotes_nobody() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 1, 2, "open").await;

    registration_service::register(&pool, &event_id, &input("amy"))
        .await
        .unwrap();
    let second = registration_service::register(&pool, &event_id, &input("ben"))
        .await
        .unwrap();
    assert_eq!(second.status, STATUS_WAITLISTED);

    let outcome = registration_service::cancel_by_token(&pool, &second.manage_token)
        .await
        .unwrap();
    assert!(outcome.promoted.is_none());
    assert_eq!(counts(&pool, &event_id).await, (1, 0));
}

#[tokio::test]
async fn closed_event_rejects_submissions() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 5, 5, "closed").await;

    match registration_service::register(&pool, &event_id, &input("amy")).await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "registration is closed"),
        other => panic!("expected closed rejection, got {:?}", other.map(|o| o.status)),
    }
}

#[tokio::test]
async fn draft_events_are_invisible_to_the_public() {
    let pool = test_pool().await;
    let id = Uuid::new_v4().to_string();
    events_repo::insert_event(
        &pool,
        events_repo::NewEvent {
            id: &id,
            title: "Unannounced",
            description: None,
            starts_at: "2099-06-01T10:00:00.000Z",
            ends_at: None,
            venue: None,
            total_slots: 5,
            waitlist_slots: 0,
            registration_status: "open",
            custom_fields: None,
        },
    )
    .await
    .unwrap();

    match registration_service::register(&pool, &id, &input("amy")).await {
        Err(AppError::NotFound) => {}
        other => panic!("expected not found, got {:?}", other.map(|o| o.status)),
    }
}

#[tokio::test]
async fn children_are_stored_with_the_registration() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 5, 0, "open").await;

    let mut reg = input("amy");
    reg.children = vec![
        ChildInput {
            name: "Alice".to_string(),
            age: Some(7),
            notes: Some("peanut allergy".to_string()),
        },
        ChildInput {
            name: "Bob".to_string(),
            age: None,
            notes: None,
        },
    ];
    let outcome = registration_service::register(&pool, &event_id, &reg)
        .await
        .unwrap();

    let children =
        registration_children_repo::list_for_registration(&pool, &outcome.registration_id)
            .await
            .unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].name, "Alice");
    assert_eq!(children[0].age, Some(7));
}

#[tokio::test]
async fn manage_links_cover_cancel_and_confirm() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 5, 0, "open").await;
    let outcome = registration_service::register(&pool, &event_id, &input("amy"))
        .await
        .unwrap();

    let confirmed = registration_service::confirm_attendance_by_token(&pool, &outcome.manage_token)
        .await
        .unwrap();
    assert_eq!(confirmed.id, outcome.registration_id);

    registration_service::cancel_by_token(&pool, &outcome.manage_token)
        .await
        .unwrap();

    // Second cancel and post-cancel confirmation both refuse.
    assert!(matches!(
        registration_service::cancel_by_token(&pool, &outcome.manage_token).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        registration_service::confirm_attendance_by_token(&pool, &outcome.manage_token).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        registration_service::cancel_by_token(&pool, "no-such-token").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn manual_promotion_respects_capacity() {
    let pool = test_pool().await;
    let event_id = seed_event(&pool, 1, 2, "open").await;

    registration_service::register(&pool, &event_id, &input("amy"))
        .await
        .unwrap();
    let second = registration_service::register(&pool, &event_id, &input("ben"))
        .await
        .unwrap();
    assert_eq!(second.status, STATUS_WAITLISTED);

    // No confirmed slot free: manual promote must refuse.
    assert!(matches!(
        registration_service::promote_by_id(&pool, &second.registration_id).await,
        Err(AppError::Conflict(_))
    ));

    // Widen the event, then promotion goes through.
    events_repo::update_event(
        &pool,
        events_repo::NewEvent {
            id: &event_id,
            title: "Family fun day",
            description: None,
            starts_at: "2099-06-01T10:00:00.000Z",
            ends_at: None,
            venue: Some("The community hall"),
            total_slots: 2,
            waitlist_slots: 2,
            registration_status: "open",
            custom_fields: None,
        },
    )
    .await
    .unwrap();

    let promoted = registration_service::promote_by_id(&pool, &second.registration_id)
        .await
        .unwrap();
    assert_eq!(promoted.status, STATUS_CONFIRMED);
    assert_eq!(counts(&pool, &event_id).await, (2, 0));
}

#[tokio::test]
async fn required_custom_fields_are_enforced_at_submit() {
    let pool = test_pool().await;
    let id = Uuid::new_v4().to_string();
    events_repo::insert_event(
        &pool,
        events_repo::NewEvent {
            id: &id,
            title: "Craft morning",
            description: None,
            starts_at: "2099-06-01T10:00:00.000Z",
            ends_at: None,
            venue: None,
            total_slots: 5,
            waitlist_slots: 0,
            registration_status: "open",
            custom_fields: Some(
                r#"[{"id":"allergies","label":"Allergies","kind":"text","required":true}]"#,
            ),
        },
    )
    .await
    .unwrap();
    events_repo::set_event_status(&pool, &id, "published")
        .await
        .unwrap();

    assert!(matches!(
        registration_service::register(&pool, &id, &input("amy")).await,
        Err(AppError::Validation(_))
    ));

    let mut reg = input("amy");
    reg.custom_answers
        .insert("allergies".to_string(), serde_json::json!("none"));
    let outcome = registration_service::register(&pool, &id, &reg).await.unwrap();
    assert_eq!(outcome.status, STATUS_CONFIRMED);
}
