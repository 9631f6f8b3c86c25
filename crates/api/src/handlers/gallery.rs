use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use studio_core::{
    compress::CompressOptions,
    errors::StudioError,
    models::{
        booking::Booking,
        gallery::{
            DeleteImagesRequest, DeleteImagesResponse, EventImage, GalleryResponse, ImageListQuery,
            SelectionCounts, UploadProgress,
        },
    },
    naming::{is_compressible, is_photo_file},
};
use studio_db::repositories::{booking, image as repo};
use uuid::Uuid;

use crate::{
    ApiState, cleanup,
    handlers::read_multipart,
    jobs::{self, UploadPlan},
    middleware::{auth::AdminSession, error_handling::AppError},
};

/// Loads an event with all of its images, newest first.
pub(crate) async fn load_gallery(state: &ApiState, event_id: Uuid) -> Result<GalleryResponse, AppError> {
    let event = booking::get_booking(&state.db_pool, event_id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Booking with ID {} not found", event_id)))?;

    let images = repo::list_event_images(&state.db_pool, event_id, None)
        .await
        .map_err(StudioError::Database)?
        .into_iter()
        .map(EventImage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GalleryResponse {
        event: Booking::try_from(event)?,
        counts: SelectionCounts::tally(&images),
        images,
    })
}

/// The event's gallery. Counts always cover every image; `status` only
/// narrows the returned list.
#[axum::debug_handler]
pub async fn list_event_images(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<ImageListQuery>,
) -> Result<Json<GalleryResponse>, AppError> {
    let mut gallery = load_gallery(&state, event_id).await?;
    if let Some(status) = query.status {
        gallery.images.retain(|image| image.status == status);
    }

    Ok(Json(gallery))
}

/// Accepts a batch of photos and uploads them in the background.
///
/// Form fields: one or more `file` parts, and optionally `compress`,
/// `quality` and `max_width`. Non-photo files are skipped up front; when
/// compressing, so are photo formats the encoder cannot read.
#[axum::debug_handler]
pub async fn start_upload(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(event_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadProgress>), AppError> {
    let event = booking::get_booking(&state.db_pool, event_id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Booking with ID {} not found", event_id)))?;

    let form = read_multipart(multipart).await?;
    let compress = if form.flag("compress") {
        Some(CompressOptions::new(form.number("max_width")?, form.number("quality")?)?)
    } else {
        None
    };

    let received = form.files.len();
    let files: Vec<_> = form
        .files
        .into_iter()
        .filter(|file| {
            let accepted = is_photo_file(&file.file_name)
                && (compress.is_none() || is_compressible(&file.file_name));
            if !accepted {
                tracing::warn!("Skipping {}: not an uploadable photo", file.file_name);
            }
            accepted
        })
        .collect();
    let skipped = received - files.len();

    if files.is_empty() {
        return Err(AppError(StudioError::Validation(format!(
            "No photos to upload ({} file(s) skipped)",
            skipped
        ))));
    }

    let plan = UploadPlan {
        event_id,
        event_name: event.event_name,
        files,
        skipped,
        compress,
    };
    let writer = Arc::new(state.db_pool.clone());
    let progress = jobs::spawn_upload(&state.uploads, plan, state.storage.clone(), writer).await;

    Ok((StatusCode::ACCEPTED, Json(progress)))
}

fn unknown_job(job_id: Uuid) -> StudioError {
    StudioError::NotFound(format!("Upload job {} not found", job_id))
}

#[axum::debug_handler]
pub async fn upload_status(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<UploadProgress>, AppError> {
    let progress = state
        .uploads
        .progress(job_id)
        .await
        .ok_or_else(|| unknown_job(job_id))?;

    Ok(Json(progress))
}

/// Requests cancellation. The job stops before its next file.
#[axum::debug_handler]
pub async fn cancel_upload(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<UploadProgress>, AppError> {
    let progress = state
        .uploads
        .cancel(job_id)
        .await
        .ok_or_else(|| unknown_job(job_id))?;

    Ok(Json(progress))
}

async fn delete_images(state: &ApiState, ids: &[Uuid]) -> Result<DeleteImagesResponse, AppError> {
    let deleted = repo::delete_event_images(&state.db_pool, ids)
        .await
        .map_err(StudioError::Database)?;
    let pending_cleanup = cleanup::drain_after_delete(&state.db_pool, state.storage.as_ref()).await;

    tracing::info!(
        "Deleted {} event images, {} objects still queued",
        deleted,
        pending_cleanup
    );
    Ok(DeleteImagesResponse {
        deleted,
        pending_cleanup,
    })
}

#[axum::debug_handler]
pub async fn batch_delete_images(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<DeleteImagesRequest>,
) -> Result<Json<DeleteImagesResponse>, AppError> {
    if payload.ids.is_empty() {
        return Err(AppError(StudioError::Validation(
            "No images selected".to_string(),
        )));
    }

    Ok(Json(delete_images(&state, &payload.ids).await?))
}

#[axum::debug_handler]
pub async fn delete_image(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteImagesResponse>, AppError> {
    let response = delete_images(&state, &[id]).await?;
    if response.deleted == 0 {
        return Err(AppError(StudioError::NotFound(format!(
            "Image with ID {} not found",
            id
        ))));
    }

    Ok(Json(response))
}
