//! Booking time-conflict detection.
//!
//! Two bookings conflict when they fall on the same date, neither is
//! cancelled, and their time windows overlap as half-open intervals.
//! Back-to-back bookings (one ends exactly when the other starts) do not
//! conflict.

use uuid::Uuid;

use crate::errors::{StudioError, StudioResult};
use crate::models::booking::{Booking, BookingStatus, ConflictCheckResponse, Slot};

/// A detected overlap, referring to the booking already holding the slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictWarning<'a> {
    pub booking: &'a Booking,
}

impl ConflictWarning<'_> {
    pub fn message(&self) -> String {
        format!("Slot already booked for \"{}\".", self.booking.event_name)
    }
}

/// Returns the first booking in `bookings` whose slot overlaps `candidate`.
///
/// The booking being edited (`editing_id`) is skipped. An incomplete
/// candidate never conflicts, and neither do bookings missing a date or a
/// time.
pub fn find_conflict<'a>(
    candidate: &Slot,
    bookings: &'a [Booking],
    editing_id: Option<Uuid>,
) -> Option<ConflictWarning<'a>> {
    let (date, start, end) = candidate.complete()?;

    bookings
        .iter()
        .filter(|other| Some(other.id) != editing_id)
        .filter(|other| other.status != BookingStatus::Cancelled)
        .find(|other| match other.slot().complete() {
            Some((other_date, other_start, other_end)) => {
                other_date == date && start < other_end && end > other_start
            }
            None => false,
        })
        .map(|booking| ConflictWarning { booking })
}

/// Applies the double-booking policy: an overlapping slot is only accepted
/// when an assistant is assigned to cover it.
pub fn ensure_bookable(
    candidate: &Slot,
    has_assistant: bool,
    bookings: &[Booking],
    editing_id: Option<Uuid>,
) -> StudioResult<()> {
    match find_conflict(candidate, bookings, editing_id) {
        Some(warning) if !has_assistant => Err(StudioError::Validation(format!(
            "{} Assign an assistant to double-book this slot.",
            warning.message()
        ))),
        _ => Ok(()),
    }
}

impl From<Option<ConflictWarning<'_>>> for ConflictCheckResponse {
    fn from(warning: Option<ConflictWarning<'_>>) -> Self {
        match warning {
            Some(warning) => ConflictCheckResponse {
                conflict: true,
                conflicting_id: Some(warning.booking.id),
                message: Some(warning.message()),
            },
            None => ConflictCheckResponse {
                conflict: false,
                conflicting_id: None,
                message: None,
            },
        }
    }
}
