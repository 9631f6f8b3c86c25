use axum::{Json, extract::State};
use std::sync::Arc;
use studio_core::{
    errors::StudioError,
    models::client::{ClientUser, LoginRequest, SessionResponse},
};

use crate::{
    ApiState,
    middleware::{
        auth::{self, ADMIN_ROLE, CLIENT_ROLE, ClientSession},
        error_handling::AppError,
    },
};

fn invalid_credentials() -> AppError {
    AppError(StudioError::Authentication(
        "Invalid username or password".to_string(),
    ))
}

#[axum::debug_handler]
pub async fn admin_login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    // Both checks run so a wrong username costs the same as a wrong password
    let username_ok = payload.username.trim() == state.admin.username;
    let password_ok = auth::verify_password(&payload.password, &state.admin.password_hash);
    if !(username_ok && password_ok) {
        tracing::warn!("Rejected admin login for '{}'", payload.username);
        return Err(invalid_credentials());
    }

    let (token, expires_at) = auth::issue_token(&state.admin.username, ADMIN_ROLE, &state.jwt)?;
    tracing::info!("Admin '{}' signed in", state.admin.username);

    Ok(Json(SessionResponse {
        token,
        expires_at,
        client: None,
    }))
}

#[axum::debug_handler]
pub async fn client_login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError(StudioError::Validation(
            "Username and password are required.".to_string(),
        )));
    }

    let client = studio_db::repositories::client::find_client_by_username(
        &state.db_pool,
        payload.username.trim(),
    )
    .await
    .map_err(StudioError::Database)?
    .ok_or_else(invalid_credentials)?;

    if !auth::verify_password(&payload.password, &client.password_hash) {
        tracing::warn!("Rejected client login for '{}'", client.username);
        return Err(invalid_credentials());
    }

    let (token, expires_at) = auth::issue_token(&client.id.to_string(), CLIENT_ROLE, &state.jwt)?;
    tracing::info!("Client '{}' signed in", client.username);

    Ok(Json(SessionResponse {
        token,
        expires_at,
        client: Some(ClientUser::from(client)),
    }))
}

/// Profile of the signed-in client.
#[axum::debug_handler]
pub async fn client_profile(
    session: ClientSession,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ClientUser>, AppError> {
    let client = studio_db::repositories::client::get_client(&state.db_pool, session.client_id)
        .await
        .map_err(StudioError::Database)?
        .ok_or_else(|| {
            StudioError::Authentication("This account no longer exists".to_string())
        })?;

    Ok(Json(client.into()))
}
