use chrono::{NaiveDate, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use studio_core::conflict::{ensure_bookable, find_conflict};
use studio_core::errors::StudioError;
use studio_core::models::booking::{Booking, BookingStatus, ConflictCheckResponse, Slot};
use uuid::Uuid;

fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M").expect("valid time")
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

fn booking(name: &str, day: &str, start: &str, end: &str, status: BookingStatus) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        client_name: None,
        client_phone: None,
        event_name: name.to_string(),
        event_place: None,
        event_date: Some(date(day)),
        start_time: Some(time(start)),
        end_time: Some(time(end)),
        price_quote: 0,
        advance_paid: 0,
        payment_method: None,
        photos_committed: 0,
        status,
        assistant_name: None,
        description: None,
        created_at: Utc::now(),
    }
}

fn slot(day: &str, start: &str, end: &str) -> Slot {
    Slot {
        date: Some(date(day)),
        start: Some(time(start)),
        end: Some(time(end)),
    }
}

#[test]
fn test_overlapping_candidate_conflicts() {
    let existing = vec![booking(
        "Wedding",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Upcoming,
    )];

    let warning = find_conflict(&slot("2024-05-01", "11:00", "13:00"), &existing, None)
        .expect("expected a conflict");
    assert_eq!(warning.booking.id, existing[0].id);
    assert_eq!(warning.message(), "Slot already booked for \"Wedding\".");
}

#[test]
fn test_back_to_back_does_not_conflict() {
    let existing = vec![booking(
        "Wedding",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Upcoming,
    )];

    assert!(find_conflict(&slot("2024-05-01", "12:00", "13:00"), &existing, None).is_none());
    assert!(find_conflict(&slot("2024-05-01", "08:00", "10:00"), &existing, None).is_none());
}

#[rstest]
#[case("09:00", "10:30", true)]
#[case("10:00", "12:00", true)]
#[case("10:30", "11:30", true)]
#[case("09:00", "13:00", true)]
#[case("11:59", "14:00", true)]
#[case("06:00", "10:00", false)]
#[case("12:00", "18:00", false)]
#[case("13:00", "14:00", false)]
fn test_interval_overlap(#[case] start: &str, #[case] end: &str, #[case] expected: bool) {
    let existing = vec![booking(
        "Shoot",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Completed,
    )];

    assert_eq!(
        find_conflict(&slot("2024-05-01", start, end), &existing, None).is_some(),
        expected
    );
}

#[test]
fn test_different_date_never_conflicts() {
    let existing = vec![booking(
        "Wedding",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Upcoming,
    )];

    assert!(find_conflict(&slot("2024-05-02", "10:00", "12:00"), &existing, None).is_none());
}

#[test]
fn test_cancelled_booking_never_conflicts() {
    let existing = vec![booking(
        "Called off",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Cancelled,
    )];

    assert!(find_conflict(&slot("2024-05-01", "10:00", "12:00"), &existing, None).is_none());
}

#[test]
fn test_overlap_is_symmetric_when_editing() {
    let a = booking("A", "2024-05-01", "10:00", "12:00", BookingStatus::Upcoming);
    let b = booking("B", "2024-05-01", "11:00", "13:00", BookingStatus::Upcoming);
    let existing = vec![a.clone(), b.clone()];

    let editing_b = find_conflict(&b.slot(), &existing, Some(b.id)).expect("B overlaps A");
    assert_eq!(editing_b.booking.id, a.id);

    let editing_a = find_conflict(&a.slot(), &existing, Some(a.id)).expect("A overlaps B");
    assert_eq!(editing_a.booking.id, b.id);
}

#[test]
fn test_editing_never_conflicts_with_itself() {
    let a = booking("A", "2024-05-01", "10:00", "12:00", BookingStatus::Upcoming);
    let existing = vec![a.clone()];

    assert!(find_conflict(&a.slot(), &existing, Some(a.id)).is_none());
}

#[test]
fn test_first_conflict_in_list_order_wins() {
    let first = booking("First", "2024-05-01", "09:00", "11:00", BookingStatus::Upcoming);
    let second = booking("Second", "2024-05-01", "10:00", "12:00", BookingStatus::Upcoming);
    let existing = vec![first.clone(), second];

    let warning = find_conflict(&slot("2024-05-01", "10:30", "10:45"), &existing, None)
        .expect("expected a conflict");
    assert_eq!(warning.booking.id, first.id);
}

#[test]
fn test_incomplete_candidate_suppresses_check() {
    let existing = vec![booking(
        "Wedding",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Upcoming,
    )];
    let mut candidate = slot("2024-05-01", "10:00", "12:00");
    candidate.end = None;

    assert!(find_conflict(&candidate, &existing, None).is_none());
    assert!(find_conflict(&Slot::default(), &existing, None).is_none());
}

#[test]
fn test_bookings_without_times_never_conflict() {
    let mut undated = booking("Open", "2024-05-01", "10:00", "12:00", BookingStatus::Upcoming);
    undated.start_time = None;

    assert!(find_conflict(&slot("2024-05-01", "10:00", "12:00"), &[undated], None).is_none());
}

#[test]
fn test_assistant_allows_double_booking() {
    let existing = vec![booking(
        "Wedding",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Upcoming,
    )];
    let candidate = slot("2024-05-01", "11:00", "13:00");

    assert!(ensure_bookable(&candidate, true, &existing, None).is_ok());
    match ensure_bookable(&candidate, false, &existing, None) {
        Err(StudioError::Validation(message)) => {
            assert!(message.starts_with("Slot already booked for \"Wedding\"."))
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_conflict_check_response() {
    let existing = vec![booking(
        "Wedding",
        "2024-05-01",
        "10:00",
        "12:00",
        BookingStatus::Upcoming,
    )];

    let hit: ConflictCheckResponse =
        find_conflict(&slot("2024-05-01", "11:00", "13:00"), &existing, None).into();
    assert!(hit.conflict);
    assert_eq!(hit.conflicting_id, Some(existing[0].id));

    let miss: ConflictCheckResponse =
        find_conflict(&slot("2024-05-01", "12:00", "13:00"), &existing, None).into();
    assert_eq!(
        miss,
        ConflictCheckResponse {
            conflict: false,
            conflicting_id: None,
            message: None,
        }
    );
}
