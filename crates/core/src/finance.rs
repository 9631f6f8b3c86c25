//! Dashboard and payment summaries over the booking list.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus};

const MISSING: &str = "—";

/// A booking with money still owed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub booking_id: Uuid,
    pub name: String,
    pub phone: String,
    pub event_date: Option<NaiveDate>,
    pub price_quote: i64,
    pub advance_paid: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total: i64,
    pub monthly: i64,
    pub yearly: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub monthly_events: usize,
    pub upcoming_events: usize,
    pub today: Vec<Booking>,
    pub revenue: RevenueSummary,
    pub pending_payments: Vec<PendingPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub total_collected: i64,
    pub total_pending: i64,
    pub pending_payments: Vec<PendingPayment>,
}

/// Bookings where the advance does not yet cover the quote, largest balance
/// first.
pub fn pending_payments(bookings: &[Booking]) -> Vec<PendingPayment> {
    let mut pending: Vec<PendingPayment> = bookings
        .iter()
        .filter(|b| b.price_quote > 0 && b.advance_paid < b.price_quote)
        .map(|b| PendingPayment {
            booking_id: b.id,
            name: non_blank(b.client_name.as_deref())
                .or_else(|| non_blank(Some(&b.event_name)))
                .unwrap_or(MISSING)
                .to_string(),
            phone: non_blank(b.client_phone.as_deref())
                .unwrap_or(MISSING)
                .to_string(),
            event_date: b.event_date,
            price_quote: b.price_quote,
            advance_paid: b.advance_paid,
            pending: b.balance_due(),
        })
        .collect();

    pending.sort_by(|a, b| b.pending.cmp(&a.pending));
    pending
}

pub fn dashboard(bookings: &[Booking], today: NaiveDate) -> DashboardSummary {
    let in_month = |date: NaiveDate| date.year() == today.year() && date.month() == today.month();

    let monthly_events = bookings
        .iter()
        .filter(|b| b.event_date.is_some_and(in_month))
        .count();
    let upcoming_events = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Upcoming)
        .count();
    let today_list = bookings
        .iter()
        .filter(|b| b.event_date == Some(today))
        .cloned()
        .collect();

    let revenue = bookings.iter().fold(RevenueSummary::default(), |mut acc, b| {
        acc.total += b.price_quote;
        if let Some(date) = b.event_date {
            if date.year() == today.year() {
                acc.yearly += b.price_quote;
                if date.month() == today.month() {
                    acc.monthly += b.price_quote;
                }
            }
        }
        acc
    });

    DashboardSummary {
        monthly_events,
        upcoming_events,
        today: today_list,
        revenue,
        pending_payments: pending_payments(bookings),
    }
}

pub fn payment_summary(bookings: &[Booking]) -> PaymentSummary {
    let pending_payments = pending_payments(bookings);
    PaymentSummary {
        total_collected: bookings.iter().map(|b| b.advance_paid).sum(),
        total_pending: pending_payments.iter().map(|p| p.pending).sum(),
        pending_payments,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
