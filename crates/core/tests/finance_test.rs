use chrono::{NaiveDate, Utc};
use fake::{Fake, faker::name::en::Name};
use pretty_assertions::assert_eq;
use studio_core::finance::{dashboard, payment_summary, pending_payments};
use studio_core::models::booking::{Booking, BookingStatus};
use uuid::Uuid;

fn booking(date: Option<NaiveDate>, quote: i64, advance: i64, status: BookingStatus) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        client_name: Some(Name().fake()),
        client_phone: Some("9876543210".to_string()),
        event_name: "Event".to_string(),
        event_place: None,
        event_date: date,
        start_time: None,
        end_time: None,
        price_quote: quote,
        advance_paid: advance,
        payment_method: None,
        photos_committed: 0,
        status,
        assistant_name: None,
        description: None,
        created_at: Utc::now(),
    }
}

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn test_pending_payments_sorted_by_balance() {
    let bookings = vec![
        booking(ymd(2024, 5, 1), 10000, 9000, BookingStatus::Upcoming),
        booking(ymd(2024, 5, 2), 50000, 10000, BookingStatus::Upcoming),
        booking(ymd(2024, 5, 3), 20000, 20000, BookingStatus::Completed),
        booking(ymd(2024, 5, 4), 0, 0, BookingStatus::Upcoming),
    ];

    let pending = pending_payments(&bookings);

    assert_eq!(
        pending.iter().map(|p| p.pending).collect::<Vec<_>>(),
        vec![40000, 1000]
    );
    assert_eq!(pending[0].booking_id, bookings[1].id);
}

#[test]
fn test_pending_payment_name_fallbacks() {
    let mut anonymous = booking(None, 1000, 0, BookingStatus::Upcoming);
    anonymous.client_name = None;
    anonymous.client_phone = None;
    anonymous.event_name = "Corporate Shoot".to_string();

    let pending = pending_payments(&[anonymous]);

    assert_eq!(pending[0].name, "Corporate Shoot");
    assert_eq!(pending[0].phone, "—");
}

#[test]
fn test_dashboard_summary() {
    let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
    let bookings = vec![
        booking(Some(today), 30000, 10000, BookingStatus::Upcoming),
        booking(ymd(2024, 5, 20), 20000, 20000, BookingStatus::Upcoming),
        booking(ymd(2024, 2, 1), 15000, 15000, BookingStatus::Completed),
        booking(ymd(2023, 5, 15), 5000, 5000, BookingStatus::Completed),
        booking(None, 1000, 0, BookingStatus::Cancelled),
    ];

    let summary = dashboard(&bookings, today);

    assert_eq!(summary.monthly_events, 2);
    assert_eq!(summary.upcoming_events, 2);
    assert_eq!(summary.today.len(), 1);
    assert_eq!(summary.today[0].id, bookings[0].id);
    assert_eq!(summary.revenue.total, 71000);
    assert_eq!(summary.revenue.yearly, 65000);
    assert_eq!(summary.revenue.monthly, 50000);
    assert_eq!(summary.pending_payments.len(), 2);
}

#[test]
fn test_payment_summary_totals() {
    let bookings = vec![
        booking(ymd(2024, 5, 1), 10000, 4000, BookingStatus::Upcoming),
        booking(ymd(2024, 5, 2), 8000, 8000, BookingStatus::Completed),
    ];

    let summary = payment_summary(&bookings);

    assert_eq!(summary.total_collected, 12000);
    assert_eq!(summary.total_pending, 6000);
    assert_eq!(summary.pending_payments.len(), 1);
}
