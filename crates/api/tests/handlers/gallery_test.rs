use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use studio_core::models::gallery::{UploadProgress, UploadState};
use uuid::Uuid;

use crate::test_utils::{TestContext, bearer};

#[tokio::test]
async fn test_unknown_upload_job_is_not_found() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let job_id = Uuid::new_v4();
    let (name, value) = bearer(&ctx.admin_token());

    let response = server
        .get(&format!("/api/admin/uploads/{}", job_id))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"],
        format!("Resource not found: Upload job {} not found", job_id)
    );
}

#[tokio::test]
async fn test_upload_progress_is_pollable() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let event_id = Uuid::new_v4();
    let (registered, _cancel) = ctx.state.uploads.register(event_id, 12, 2).await;
    let (name, value) = bearer(&ctx.admin_token());

    let response = server
        .get(&format!("/api/admin/uploads/{}", registered.id))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let progress = response.json::<UploadProgress>();
    assert_eq!(progress, registered);
    assert_eq!(progress.state, UploadState::Running);
    assert_eq!(progress.total, 12);
    assert_eq!(progress.skipped, 2);
}

#[tokio::test]
async fn test_cancel_trips_the_job_token() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (registered, cancel) = ctx.state.uploads.register(Uuid::new_v4(), 3, 0).await;
    let (name, value) = bearer(&ctx.admin_token());

    let response = server
        .delete(&format!("/api/admin/uploads/{}", registered.id))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn test_cancel_requires_admin() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (registered, cancel) = ctx.state.uploads.register(Uuid::new_v4(), 3, 0).await;
    let (name, value) = bearer(&ctx.client_token(Uuid::new_v4()));

    let response = server
        .delete(&format!("/api/admin/uploads/{}", registered.id))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert!(!cancel.is_cancelled());
}

#[tokio::test]
async fn test_batch_delete_needs_ids() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (name, value) = bearer(&ctx.admin_token());

    let response = server
        .post("/api/admin/images/batch-delete")
        .add_header(name, value)
        .json(&json!({ "ids": [] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Validation error: No images selected"
    );
}

#[tokio::test]
async fn test_upload_requires_admin() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&format!("/api/admin/events/{}/uploads", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(ctx.storage.is_empty().await);
}
