use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use studio_core::{
    conflict,
    errors::StudioError,
    models::booking::{
        Booking, BookingFilter, BookingRequest, ConflictCheckRequest, ConflictCheckResponse,
        DeleteBookingResponse, Slot,
    },
};
use studio_db::{models::DbBooking, repositories::booking as repo};
use uuid::Uuid;

use crate::{
    ApiState, cleanup,
    middleware::{auth::AdminSession, error_handling::AppError},
};

fn into_bookings(rows: Vec<DbBooking>) -> Result<Vec<Booking>, StudioError> {
    rows.into_iter().map(Booking::try_from).collect()
}

fn not_found(id: Uuid) -> StudioError {
    StudioError::NotFound(format!("Booking with ID {} not found", id))
}

/// Bookings on the candidate's date, or none when the slot is incomplete
/// and the check is skipped.
async fn bookings_sharing_date(state: &ApiState, slot: &Slot) -> Result<Vec<Booking>, AppError> {
    match slot.date {
        Some(date) if slot.complete().is_some() => {
            let rows = repo::list_bookings_on_date(&state.db_pool, date)
                .await
                .map_err(StudioError::Database)?;
            Ok(into_bookings(rows)?)
        }
        _ => Ok(Vec::new()),
    }
}

#[axum::debug_handler]
pub async fn list_bookings(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let rows = repo::list_bookings(&state.db_pool)
        .await
        .map_err(StudioError::Database)?;

    let bookings = into_bookings(rows)?
        .into_iter()
        .filter(|booking| filter.matches(booking))
        .collect();

    Ok(Json(bookings))
}

#[axum::debug_handler]
pub async fn get_booking(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = repo::get_booking(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(Booking::try_from(booking)?))
}

#[axum::debug_handler]
pub async fn create_booking(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    payload.validate()?;

    let slot = payload.slot();
    let same_day = bookings_sharing_date(&state, &slot).await?;
    conflict::ensure_bookable(&slot, payload.has_assistant(), &same_day, None)?;

    let booking = repo::create_booking(&state.db_pool, &payload)
        .await
        .map_err(StudioError::Database)?;
    tracing::info!("Created booking {} ({})", booking.id, booking.event_name);

    Ok((StatusCode::CREATED, Json(Booking::try_from(booking)?)))
}

#[axum::debug_handler]
pub async fn update_booking(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<Booking>, AppError> {
    payload.validate()?;

    let slot = payload.slot();
    let same_day = bookings_sharing_date(&state, &slot).await?;
    conflict::ensure_bookable(&slot, payload.has_assistant(), &same_day, Some(id))?;

    let booking = repo::update_booking(&state.db_pool, id, &payload)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(Booking::try_from(booking)?))
}

/// Deletes a booking together with its gallery.
#[axum::debug_handler]
pub async fn delete_booking(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteBookingResponse>, AppError> {
    let deleted = repo::delete_booking(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?;
    if !deleted {
        return Err(not_found(id).into());
    }

    cleanup::drain_after_delete(&state.db_pool, state.storage.as_ref()).await;
    tracing::info!("Deleted booking {}", id);

    Ok(Json(DeleteBookingResponse { id, deleted }))
}

/// Reports whether a candidate slot overlaps an existing booking, without
/// saving anything.
#[axum::debug_handler]
pub async fn check_conflict(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let slot = Slot {
        date: payload.event_date,
        start: payload.start_time,
        end: payload.end_time,
    };

    let same_day = bookings_sharing_date(&state, &slot).await?;
    let warning = conflict::find_conflict(&slot, &same_day, payload.editing_id);

    Ok(Json(ConflictCheckResponse::from(warning)))
}
