//! Integration tests for event, booking and result repositories using
//! in-memory SurrealDB.

use chrono::{Duration, TimeZone, Utc};
use screenbook_core::error::ScreeningError;
use screenbook_core::models::booking::{BookingStatus, CreateBooking};
use screenbook_core::models::event::{CreateEvent, EventDetails, EventFilter, EventStatus};
use screenbook_core::models::result::{CreateMedicalResult, ResultCategory};
use screenbook_core::repository::{
    BookingRepository, EventRepository, Pagination, ResultRepository,
};
use screenbook_db::repository::{
    SurrealBookingRepository, SurrealEventRepository, SurrealResultRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    screenbook_db::run_migrations(&db).await.unwrap();
    db
}

fn new_event(name: &str, address: &str, days_ahead: i64, slots: u32) -> CreateEvent {
    CreateEvent {
        name: name.into(),
        scheduled_at: Utc::now() + Duration::days(days_ahead),
        address: address.into(),
        total_slots: slots,
        status: EventStatus::Published,
        additional_info: None,
        created_by: Uuid::new_v4(),
    }
}

// ---------------------------------------------------------------------------
// Events & slot counters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_event_starts_with_all_slots_available() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);

    let event = repo
        .create(new_event("Diabetes Screening", "Dewan Komuniti", 7, 20))
        .await
        .unwrap();
    assert_eq!(event.total_slots, 20);
    assert_eq!(event.available_slots, 20);

    let fetched = repo.get_by_id(event.id).await.unwrap();
    assert_eq!(fetched.name, "Diabetes Screening");
    assert_eq!(fetched.status, EventStatus::Published);
}

#[tokio::test]
async fn reserve_stops_at_zero_and_release_stops_at_total() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);
    let event = repo.create(new_event("E", "A", 3, 2)).await.unwrap();

    let first = repo.try_reserve_slot(event.id).await.unwrap().unwrap();
    assert_eq!(first.available_slots, 1);
    let second = repo.try_reserve_slot(event.id).await.unwrap().unwrap();
    assert_eq!(second.available_slots, 0);
    assert!(repo.try_reserve_slot(event.id).await.unwrap().is_none());

    repo.release_slot(event.id).await.unwrap();
    repo.release_slot(event.id).await.unwrap();
    let clamped = repo.release_slot(event.id).await.unwrap();
    assert_eq!(clamped.available_slots, 2);
}

#[tokio::test]
async fn resize_keeps_booked_slots() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);
    let event = repo.create(new_event("E", "A", 3, 5)).await.unwrap();
    for _ in 0..3 {
        repo.try_reserve_slot(event.id).await.unwrap().unwrap();
    }

    let grown = repo.resize(event.id, 8).await.unwrap().unwrap();
    assert_eq!((grown.total_slots, grown.available_slots), (8, 5));

    let shrunk = repo.resize(event.id, 3).await.unwrap().unwrap();
    assert_eq!((shrunk.total_slots, shrunk.available_slots), (3, 0));

    assert!(repo.resize(event.id, 2).await.unwrap().is_none());
    let unchanged = repo.get_by_id(event.id).await.unwrap();
    assert_eq!((unchanged.total_slots, unchanged.available_slots), (3, 0));
}

#[tokio::test]
async fn dedup_key_matches_same_day_regardless_of_case() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);
    let mut input = new_event("Heart Check", "Klinik Desa", 0, 10);
    input.scheduled_at = Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap();
    let event = repo.create(input).await.unwrap();

    let key = screenbook_core::models::event::dedup_key(
        "HEART CHECK",
        Utc.with_ymd_and_hms(2030, 5, 1, 15, 0, 0).unwrap(),
        "klinik desa",
    );
    let found = repo.find_by_dedup_key(&key).await.unwrap().unwrap();
    assert_eq!(found.id, event.id);

    let details = EventDetails {
        name: "Heart Check (morning)".into(),
        scheduled_at: event.scheduled_at,
        address: event.address.clone(),
        status: EventStatus::Draft,
        additional_info: Some("Bring IC".into()),
    };
    let updated = repo.update_details(event.id, details).await.unwrap();
    assert_eq!(updated.status, EventStatus::Draft);
    assert!(repo.find_by_dedup_key(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn list_filters_and_orders_by_date() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);

    let later = repo
        .create(new_event("Later", "Hospital Ampang", 10, 5))
        .await
        .unwrap();
    let sooner = repo
        .create(new_event("Sooner", "Klinik Ampang Jaya", 2, 5))
        .await
        .unwrap();
    let mut draft = new_event("Draft", "Klinik Ampang", 5, 5);
    draft.status = EventStatus::Draft;
    repo.create(draft).await.unwrap();
    repo.create(new_event("Elsewhere", "Shah Alam", 4, 5))
        .await
        .unwrap();

    let published_in_ampang = repo
        .list(
            EventFilter {
                status: Some(EventStatus::Published),
                location: Some("AMPANG".into()),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(published_in_ampang.total, 2);
    let ids: Vec<_> = published_in_ampang.items.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);

    let window = repo
        .list(
            EventFilter {
                date_from: Some(Utc::now() + Duration::days(3)),
                date_to: Some(Utc::now() + Duration::days(6)),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(window.total, 2);
}

#[tokio::test]
async fn delete_removes_event() {
    let db = setup().await;
    let repo = SurrealEventRepository::new(db);
    let event = repo.create(new_event("E", "A", 1, 1)).await.unwrap();

    repo.delete(event.id).await.unwrap();
    let err = repo.get_by_id(event.id).await.unwrap_err();
    assert!(matches!(err, ScreeningError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

fn new_booking(reference: &str, participant_id: Uuid, event_id: Uuid) -> CreateBooking {
    CreateBooking {
        reference: reference.into(),
        participant_id,
        event_id,
        holds_slot: true,
    }
}

#[tokio::test]
async fn booking_lookup_by_reference_and_active_pair() {
    let db = setup().await;
    let repo = SurrealBookingRepository::new(db);
    let (participant, event) = (Uuid::new_v4(), Uuid::new_v4());

    let booking = repo
        .create(new_booking("ROSE-AAAAAA", participant, event))
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!(booking.cancelled_at.is_none());

    assert_eq!(booking.reference, "ROSE-AAAAAA");
    assert_eq!(
        repo.find_active(participant, event).await.unwrap().unwrap().id,
        booking.id
    );
    assert!(repo.find_active(Uuid::new_v4(), event).await.unwrap().is_none());
    assert_eq!(repo.count_by_event(event).await.unwrap(), 1);
    assert_eq!(repo.list_by_participant(participant).await.unwrap().len(), 1);
    assert_eq!(repo.list_by_event(event).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_reference_is_rejected() {
    let db = setup().await;
    let repo = SurrealBookingRepository::new(db);

    repo.create(new_booking("ROSE-DUP123", Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap();
    let err = repo
        .create(new_booking("ROSE-DUP123", Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScreeningError::Duplicate { .. }));
}

#[tokio::test]
async fn transition_is_compare_and_set() {
    let db = setup().await;
    let repo = SurrealBookingRepository::new(db);
    let (participant, event) = (Uuid::new_v4(), Uuid::new_v4());
    let booking = repo
        .create(new_booking("ROSE-CAS001", participant, event))
        .await
        .unwrap();

    let cancelled = repo
        .transition(booking.id, BookingStatus::Confirmed, BookingStatus::Cancelled)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());

    let again = repo
        .transition(booking.id, BookingStatus::Confirmed, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert!(again.is_none());
    assert!(repo.find_active(participant, event).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

fn new_result(booking_id: Uuid) -> CreateMedicalResult {
    CreateMedicalResult {
        booking_id,
        category: ResultCategory::AbnormalFollowUp,
        notes: Some("Elevated fasting glucose".into()),
        file_key: format!("results/{booking_id}/report.pdf"),
        uploaded_by: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn one_result_per_booking() {
    let db = setup().await;
    let repo = SurrealResultRepository::new(db);
    let booking_id = Uuid::new_v4();

    let result = repo.create(new_result(booking_id)).await.unwrap();
    assert_eq!(result.category, ResultCategory::AbnormalFollowUp);
    assert!(!result.sms_sent);

    let err = repo.create(new_result(booking_id)).await.unwrap_err();
    assert!(matches!(err, ScreeningError::Duplicate { .. }));

    let found = repo.find_by_booking(booking_id).await.unwrap().unwrap();
    assert_eq!(found.id, result.id);
    assert_eq!(repo.list(Pagination::default()).await.unwrap().total, 1);
}

#[tokio::test]
async fn sms_flag_is_set_once() {
    let db = setup().await;
    let repo = SurrealResultRepository::new(db);
    let result = repo.create(new_result(Uuid::new_v4())).await.unwrap();

    let sent = repo.mark_sms_sent(result.id).await.unwrap().unwrap();
    assert!(sent.sms_sent);
    assert!(sent.sms_sent_at.is_some());

    assert!(repo.mark_sms_sent(result.id).await.unwrap().is_none());
}
