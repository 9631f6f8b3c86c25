use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use studio_core::{
    errors::StudioError,
    models::client::{
        AccessGrantRequest, AccessGrantResponse, ClientDetailResponse, ClientListQuery,
        ClientSummary, ClientUser, CreateClientRequest, UpdateClientRequest,
    },
};
use studio_db::repositories::{booking, client as repo};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::{self, AdminSession},
        error_handling::AppError,
    },
};

fn not_found(id: Uuid) -> StudioError {
    StudioError::NotFound(format!("Client with ID {} not found", id))
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn ensure_event_exists(state: &ApiState, event_id: Uuid) -> Result<(), AppError> {
    booking::get_booking(&state.db_pool, event_id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| StudioError::NotFound(format!("Booking with ID {} not found", event_id)))?;
    Ok(())
}

/// Rejects a username already used by a different client.
async fn ensure_username_free(
    state: &ApiState,
    username: &str,
    current: Option<Uuid>,
) -> Result<(), AppError> {
    let existing = repo::find_client_by_username(&state.db_pool, username)
        .await
        .map_err(StudioError::Database)?;

    match existing {
        Some(other) if Some(other.id) != current => Err(AppError(StudioError::Conflict(format!(
            "Username \"{}\" is already taken",
            username
        )))),
        _ => Ok(()),
    }
}

async fn detail(state: &ApiState, client: ClientUser) -> Result<ClientDetailResponse, AppError> {
    let event_ids = repo::list_granted_event_ids(&state.db_pool, client.id)
        .await
        .map_err(StudioError::Database)?;
    Ok(ClientDetailResponse { client, event_ids })
}

#[axum::debug_handler]
pub async fn list_clients(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<Vec<ClientSummary>>, AppError> {
    let rows = repo::list_clients(&state.db_pool)
        .await
        .map_err(StudioError::Database)?;

    let clients = rows
        .into_iter()
        .map(ClientSummary::from)
        .filter(|summary| query.matches(&summary.client))
        .collect();

    Ok(Json(clients))
}

#[axum::debug_handler]
pub async fn create_client(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientDetailResponse>), AppError> {
    payload.validate()?;
    let username = payload.username.trim();
    ensure_username_free(&state, username, None).await?;

    for event_id in &payload.event_ids {
        ensure_event_exists(&state, *event_id).await?;
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let client = repo::create_client(
        &state.db_pool,
        username,
        &password_hash,
        blank_to_none(payload.display_name.as_deref()),
        &payload.event_ids,
    )
    .await
    .map_err(StudioError::Database)?;
    tracing::info!(
        "Created client {} with {} event grants",
        client.username,
        payload.event_ids.len()
    );

    let response = detail(&state, client.into()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn get_client(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientDetailResponse>, AppError> {
    let client = repo::get_client(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(detail(&state, client.into()).await?))
}

/// Replaces username and label, and the password when one is given.
#[axum::debug_handler]
pub async fn update_client(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<ClientDetailResponse>, AppError> {
    payload.validate()?;
    let username = payload.username.trim();
    ensure_username_free(&state, username, Some(id)).await?;

    let password_hash = match blank_to_none(payload.password.as_deref()) {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };

    let client = repo::update_client(
        &state.db_pool,
        id,
        username,
        password_hash.as_deref(),
        blank_to_none(payload.display_name.as_deref()),
    )
    .await
    .map_err(StudioError::Database)?
    .ok_or_else(|| not_found(id))?;

    Ok(Json(detail(&state, client.into()).await?))
}

/// Removes the client and, through the cascade, all of its grants.
#[axum::debug_handler]
pub async fn delete_client(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = repo::delete_client(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?;
    if !deleted {
        return Err(not_found(id).into());
    }

    tracing::info!("Deleted client {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn grant_access(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccessGrantRequest>,
) -> Result<Json<AccessGrantResponse>, AppError> {
    repo::get_client(&state.db_pool, id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| not_found(id))?;
    ensure_event_exists(&state, payload.event_id).await?;

    let created = repo::grant_access(&state.db_pool, id, payload.event_id)
        .await
        .map_err(StudioError::Database)?;
    tracing::debug!(
        "Grant client={} event={} (new={})",
        id,
        payload.event_id,
        created
    );

    Ok(Json(AccessGrantResponse {
        client_id: id,
        event_id: payload.event_id,
        granted: true,
    }))
}

/// Idempotent: revoking a grant that does not exist succeeds.
#[axum::debug_handler]
pub async fn revoke_access(
    _admin: AdminSession,
    State(state): State<Arc<ApiState>>,
    Path((id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AccessGrantResponse>, AppError> {
    let removed = repo::revoke_access(&state.db_pool, id, event_id)
        .await
        .map_err(StudioError::Database)?;
    tracing::debug!("Revoke client={} event={} (removed={})", id, event_id, removed);

    Ok(Json(AccessGrantResponse {
        client_id: id,
        event_id,
        granted: false,
    }))
}
