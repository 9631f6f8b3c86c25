//! Client-portal handlers.
//!
//! Every handler checks the caller's access row for the event it touches;
//! a valid session alone grants nothing.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use studio_core::{
    errors::StudioError,
    models::{
        booking::Booking,
        gallery::{
            BulkSelectionRequest, BulkSelectionResponse, EventImage, GalleryResponse,
            SelectionStatus, UpdateSelectionRequest,
        },
    },
};
use studio_db::repositories::{booking, client, image};
use uuid::Uuid;

use crate::{
    ApiState,
    handlers::gallery::load_gallery,
    middleware::{auth::ClientSession, error_handling::AppError},
};

async fn ensure_access(state: &ApiState, session: ClientSession, event_id: Uuid) -> Result<(), AppError> {
    let allowed = client::has_access(&state.db_pool, session.client_id, event_id)
        .await
        .map_err(StudioError::Database)?;
    if !allowed {
        tracing::warn!(
            "Client {} denied access to event {}",
            session.client_id,
            event_id
        );
        return Err(AppError(StudioError::Authorization(
            "You do not have access to this event".to_string(),
        )));
    }
    Ok(())
}

/// Events shared with the signed-in client.
#[axum::debug_handler]
pub async fn list_events(
    session: ClientSession,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let events = booking::list_bookings_for_client(&state.db_pool, session.client_id)
        .await
        .map_err(StudioError::Database)?
        .into_iter()
        .map(Booking::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(events))
}

#[axum::debug_handler]
pub async fn get_event(
    session: ClientSession,
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<GalleryResponse>, AppError> {
    ensure_access(&state, session, event_id).await?;

    Ok(Json(load_gallery(&state, event_id).await?))
}

/// Sets an image's selection. Choosing the status it already has clears it.
#[axum::debug_handler]
pub async fn update_image_status(
    session: ClientSession,
    State(state): State<Arc<ApiState>>,
    Path(image_id): Path<Uuid>,
    Json(payload): Json<UpdateSelectionRequest>,
) -> Result<Json<EventImage>, AppError> {
    let current = image::get_event_image(&state.db_pool, image_id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Image with ID {} not found", image_id)))?;
    ensure_access(&state, session, current.event_id).await?;

    let current = EventImage::try_from(current)?;
    let status = SelectionStatus::toggled(current.status, payload.status);

    let updated = image::update_image_status(&state.db_pool, image_id, status.as_str())
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Image with ID {} not found", image_id)))?;

    Ok(Json(EventImage::try_from(updated)?))
}

/// Sets the status of every image of an event, or only of those currently
/// in `only_status`.
#[axum::debug_handler]
pub async fn bulk_update_status(
    session: ClientSession,
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<BulkSelectionRequest>,
) -> Result<Json<BulkSelectionResponse>, AppError> {
    ensure_access(&state, session, event_id).await?;

    let updated = image::bulk_update_status(
        &state.db_pool,
        event_id,
        payload.status.as_str(),
        payload.only_status.map(|status| status.as_str()),
    )
    .await
    .map_err(StudioError::Database)?;
    tracing::debug!(
        "Client {} set {} images of {} to {}",
        session.client_id,
        updated,
        event_id,
        payload.status
    );

    Ok(Json(BulkSelectionResponse { updated }))
}
