use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, bearer};

#[tokio::test]
async fn test_portal_requires_a_session() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/portal/events").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_token_is_not_a_client_session() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (name, value) = bearer(&ctx.admin_token());

    let response = server
        .get(&format!("/api/portal/events/{}", Uuid::new_v4()))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.json::<Value>()["error"],
        "Authorization error: This endpoint requires a client session"
    );
}

#[tokio::test]
async fn test_client_token_with_bad_subject_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = studio_api::middleware::auth::issue_token(
        "not-a-uuid",
        studio_api::middleware::auth::CLIENT_ROLE,
        &ctx.state.jwt,
    )
    .unwrap()
    .0;
    let (name, value) = bearer(&token);

    let response = server.get("/api/portal/events").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_selection_status_is_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (name, value) = bearer(&ctx.client_token(Uuid::new_v4()));

    let response = server
        .put(&format!("/api/portal/images/{}/status", Uuid::new_v4()))
        .add_header(name, value)
        .json(&json!({ "status": "favourite" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}
