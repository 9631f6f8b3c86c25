use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use studio_core::{
    errors::StudioError,
    models::{
        gallery::{DeleteImagesRequest, DeleteImagesResponse},
        website::{
            CategoryImage, CategoryNameRequest, CategorySummary, CategoryUploadResponse,
            UpdateAltTextRequest, UploadFailure, WebsiteCategory, ensure_category_deletable,
            ensure_category_editable,
        },
    },
    naming::{category_cover_key, content_type_for, file_stem, is_photo_file, website_image_key},
};
use studio_db::repositories::website as repo;
use uuid::Uuid;

use crate::{
    ApiState, cleanup,
    handlers::read_multipart,
    middleware::{
        auth::AdminSession,
        error_handling::{AppError, storage_error},
    },
};

async fn load_category(state: &ApiState, id: Uuid) -> Result<WebsiteCategory, AppError> {
    let category = repo::get_category(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Category with ID {} not found", id)))?;
    Ok(category.into())
}

async fn category_summaries(state: &ApiState) -> Result<Vec<CategorySummary>, AppError> {
    let rows = repo::list_categories(&state.db_pool)
        .await
        .map_err(StudioError::Database)?;
    Ok(rows.into_iter().map(CategorySummary::from).collect())
}

async fn category_images(state: &ApiState, id: Uuid) -> Result<Vec<CategoryImage>, AppError> {
    load_category(state, id).await?;
    let rows = repo::list_category_images(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?;
    Ok(rows.into_iter().map(CategoryImage::from).collect())
}

#[axum::debug_handler]
pub async fn list_categories(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    Ok(Json(category_summaries(&state).await?))
}

/// New categories go last and are never system categories.
#[axum::debug_handler]
pub async fn create_category(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CategoryNameRequest>,
) -> Result<(StatusCode, Json<WebsiteCategory>), AppError> {
    let name = payload.validated_name()?;

    let category = repo::create_category(&state.db_pool, name)
        .await
        .map_err(StudioError::Database)?;
    tracing::info!("Created website category '{}'", category.name);

    Ok((StatusCode::CREATED, Json(category.into())))
}

#[axum::debug_handler]
pub async fn rename_category(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryNameRequest>,
) -> Result<Json<WebsiteCategory>, AppError> {
    let category = load_category(&state, id).await?;
    ensure_category_editable(&category)?;
    let name = payload.validated_name()?;

    let renamed = repo::rename_category(&state.db_pool, id, name)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Category with ID {} not found", id)))?;

    Ok(Json(renamed.into()))
}

/// Only empty, non-system categories can be deleted.
#[axum::debug_handler]
pub async fn delete_category(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let category = load_category(&state, id).await?;
    let image_count = repo::count_category_images(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?;
    ensure_category_deletable(&category, image_count)?;

    repo::delete_category(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?;
    cleanup::drain_after_delete(&state.db_pool, state.storage.as_ref()).await;
    tracing::info!("Deleted website category '{}'", category.name);

    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the category cover with the first file of the form. The old
/// cover object is removed afterwards.
#[axum::debug_handler]
pub async fn upload_cover(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<WebsiteCategory>, AppError> {
    load_category(&state, id).await?;

    let form = read_multipart(multipart).await?;
    let file = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| StudioError::Validation("No cover image received".to_string()))?;
    if !is_photo_file(&file.file_name) {
        return Err(AppError(StudioError::Validation(format!(
            "{} is not an image",
            file.file_name
        ))));
    }

    let key = category_cover_key(id, Utc::now().timestamp_millis(), &file.file_name);
    state
        .storage
        .put(&key, file.data, content_type_for(&file.file_name))
        .await
        .map_err(storage_error)?;
    let url = state.storage.public_url(&key);

    let updated = match repo::set_category_cover(&state.db_pool, id, &url, &key).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            cleanup::discard_object(&state.db_pool, state.storage.as_ref(), &key).await?;
            return Err(AppError(StudioError::NotFound(format!(
                "Category with ID {} not found",
                id
            ))));
        }
        Err(e) => {
            cleanup::discard_object(&state.db_pool, state.storage.as_ref(), &key).await?;
            return Err(AppError(StudioError::Database(e)));
        }
    };
    cleanup::drain_after_delete(&state.db_pool, state.storage.as_ref()).await;

    Ok(Json(updated.into()))
}

#[axum::debug_handler]
pub async fn list_category_images(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CategoryImage>>, AppError> {
    Ok(Json(category_images(&state, id).await?))
}

/// Uploads every file of the form into the category, one at a time.
///
/// A failing file is reported in `failures` and the rest of the batch
/// continues. Alt text defaults to the file name without its extension.
#[axum::debug_handler]
pub async fn upload_category_images(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<CategoryUploadResponse>, AppError> {
    load_category(&state, id).await?;

    let form = read_multipart(multipart).await?;
    if form.files.is_empty() {
        return Err(AppError(StudioError::Validation(
            "No images received".to_string(),
        )));
    }

    let mut sort_order = repo::next_image_sort_order(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?;
    let mut uploaded = Vec::new();
    let mut failures = Vec::new();

    for file in form.files {
        let file_name = file.file_name;
        if !is_photo_file(&file_name) {
            failures.push(UploadFailure {
                file_name,
                error: "Not an image file".to_string(),
            });
            continue;
        }

        let key = website_image_key(id, Utc::now().timestamp_millis(), &file_name);
        if let Err(e) = state
            .storage
            .put(&key, file.data, content_type_for(&file_name))
            .await
        {
            tracing::warn!("Website upload of {} failed: {:#}", file_name, e);
            failures.push(UploadFailure {
                file_name,
                error: format!("{:#}", e),
            });
            continue;
        }

        let url = state.storage.public_url(&key);
        let alt_text = file_stem(&file_name).to_string();
        match repo::insert_category_image(&state.db_pool, id, &url, &key, &alt_text, sort_order).await {
            Ok(image) => {
                sort_order += 1;
                uploaded.push(CategoryImage::from(image));
            }
            Err(e) => {
                tracing::warn!("Recording website image {} failed: {:#}", key, e);
                cleanup::discard_object(&state.db_pool, state.storage.as_ref(), &key).await?;
                failures.push(UploadFailure {
                    file_name,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    tracing::info!(
        "Website upload into {}: {} uploaded, {} failed",
        id,
        uploaded.len(),
        failures.len()
    );
    Ok(Json(CategoryUploadResponse { uploaded, failures }))
}

#[axum::debug_handler]
pub async fn update_alt_text(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(image_id): Path<Uuid>,
    Json(payload): Json<UpdateAltTextRequest>,
) -> Result<Json<CategoryImage>, AppError> {
    let image = repo::update_alt_text(&state.db_pool, image_id, payload.alt_text.trim())
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Image with ID {} not found", image_id)))?;

    Ok(Json(image.into()))
}

async fn delete_images(
    state: &ApiState,
    category_id: Uuid,
    ids: &[Uuid],
) -> Result<DeleteImagesResponse, AppError> {
    let deleted = repo::delete_category_images(&state.db_pool, category_id, ids)
        .await
        .map_err(StudioError::Database)?;
    let pending_cleanup = cleanup::drain_after_delete(&state.db_pool, state.storage.as_ref()).await;

    Ok(DeleteImagesResponse {
        deleted,
        pending_cleanup,
    })
}

#[axum::debug_handler]
pub async fn batch_delete_category_images(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeleteImagesRequest>,
) -> Result<Json<DeleteImagesResponse>, AppError> {
    if payload.ids.is_empty() {
        return Err(AppError(StudioError::Validation(
            "No images selected".to_string(),
        )));
    }

    Ok(Json(delete_images(&state, id, &payload.ids).await?))
}

#[axum::debug_handler]
pub async fn delete_category_image(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DeleteImagesResponse>, AppError> {
    let response = delete_images(&state, id, &[image_id]).await?;
    if response.deleted == 0 {
        return Err(AppError(StudioError::NotFound(format!(
            "Image with ID {} not found",
            image_id
        ))));
    }

    Ok(Json(response))
}

/// Public site: categories in display order.
#[axum::debug_handler]
pub async fn site_categories(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<CategorySummary>>, AppError> {
    Ok(Json(category_summaries(&state).await?))
}

/// Public site: images of one category in display order.
#[axum::debug_handler]
pub async fn site_category_images(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CategoryImage>>, AppError> {
    Ok(Json(category_images(&state, id).await?))
}
