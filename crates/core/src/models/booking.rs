use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StudioError, StudioResult};
use crate::time_format::option_hhmm;

pub const PAYMENT_METHODS: [&str; 5] = ["Cash", "GPay", "PhonePe", "Paytm", "Bank Transfer"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Upcoming,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Upcoming => "upcoming",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(BookingStatus::Upcoming),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(StudioError::Validation(format!(
                "Unknown booking status '{}'",
                other
            ))),
        }
    }
}

/// A scheduled photography engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub event_name: String,
    pub event_place: Option<String>,
    pub event_date: Option<NaiveDate>,
    #[serde(default, with = "option_hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "option_hhmm")]
    pub end_time: Option<NaiveTime>,
    pub price_quote: i64,
    pub advance_paid: i64,
    pub payment_method: Option<String>,
    pub photos_committed: i32,
    pub status: BookingStatus,
    pub assistant_name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Amount still owed on the quote.
    pub fn balance_due(&self) -> i64 {
        self.price_quote - self.advance_paid
    }

    pub fn slot(&self) -> Slot {
        Slot {
            date: self.event_date,
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn has_assistant(&self) -> bool {
        has_text(self.assistant_name.as_deref())
    }
}

/// The date and time window of a booking. Any part may be unset while a
/// form is being filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slot {
    pub date: Option<NaiveDate>,
    #[serde(default, with = "option_hhmm")]
    pub start: Option<NaiveTime>,
    #[serde(default, with = "option_hhmm")]
    pub end: Option<NaiveTime>,
}

impl Slot {
    /// Returns `(date, start, end)` when every part is present.
    pub fn complete(&self) -> Option<(NaiveDate, NaiveTime, NaiveTime)> {
        Some((self.date?, self.start?, self.end?))
    }
}

/// Payload for creating or replacing a booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    #[serde(default)]
    pub event_name: String,
    pub event_place: Option<String>,
    pub event_date: Option<NaiveDate>,
    #[serde(default, with = "option_hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "option_hhmm")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub price_quote: i64,
    #[serde(default)]
    pub advance_paid: i64,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub photos_committed: i32,
    #[serde(default)]
    pub status: BookingStatus,
    pub assistant_name: Option<String>,
    pub description: Option<String>,
}

impl BookingRequest {
    pub fn slot(&self) -> Slot {
        Slot {
            date: self.event_date,
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn has_assistant(&self) -> bool {
        has_text(self.assistant_name.as_deref())
    }

    /// Field-level checks that do not need other bookings.
    pub fn validate(&self) -> StudioResult<()> {
        if self.event_name.trim().is_empty() {
            return Err(StudioError::Validation("Booking name required.".to_string()));
        }

        if let Some(phone) = self.client_phone.as_deref().filter(|p| !p.is_empty()) {
            if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
                return Err(StudioError::Validation(
                    "Phone number must be exactly 10 digits.".to_string(),
                ));
            }
        }

        if self.price_quote < 0 || self.advance_paid < 0 {
            return Err(StudioError::Validation(
                "Amounts cannot be negative.".to_string(),
            ));
        }

        if let Some(method) = self.payment_method.as_deref().filter(|m| !m.is_empty()) {
            if !PAYMENT_METHODS.contains(&method) {
                return Err(StudioError::Validation(format!(
                    "Unknown payment method '{}'",
                    method
                )));
            }
        }

        Ok(())
    }
}

/// Query parameters accepted by the booking list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    pub search: Option<String>,
    /// A booking status, or `All`. Defaults to `upcoming`.
    pub status: Option<String>,
    pub assistant: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        let matches_search = match self.search.as_deref().filter(|s| !s.is_empty()) {
            None => true,
            Some(search) => {
                let needle = search.to_lowercase();
                contains_lower(booking.client_name.as_deref(), &needle)
                    || booking
                        .client_phone
                        .as_deref()
                        .is_some_and(|phone| phone.contains(search))
                    || booking.event_name.to_lowercase().contains(&needle)
            }
        };

        let matches_status = match self.status.as_deref().unwrap_or("upcoming") {
            "All" | "all" => true,
            status => booking.status.as_str() == status,
        };

        let matches_assistant = match self.assistant.as_deref().filter(|s| !s.is_empty()) {
            None => true,
            Some(assistant) => {
                contains_lower(booking.assistant_name.as_deref(), &assistant.to_lowercase())
            }
        };

        let matches_range = match (self.from, self.to) {
            (None, None) => true,
            (from, to) => booking.event_date.is_some_and(|date| {
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            }),
        };

        matches_search && matches_status && matches_assistant && matches_range
    }
}

/// Candidate slot submitted by the booking form for a live conflict check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub event_date: Option<NaiveDate>,
    #[serde(default, with = "option_hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "option_hhmm")]
    pub end_time: Option<NaiveTime>,
    pub editing_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    pub conflict: bool,
    pub conflicting_id: Option<Uuid>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBookingResponse {
    pub id: Uuid,
    pub deleted: bool,
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn contains_lower(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}
