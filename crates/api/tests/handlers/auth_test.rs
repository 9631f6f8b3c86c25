use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use studio_api::middleware::auth::{self, ADMIN_ROLE};
use studio_core::models::client::SessionResponse;
use test_log::test;

use crate::test_utils::{ADMIN_PASSWORD, ADMIN_USERNAME, TestContext, bearer};

#[test(tokio::test)]
async fn test_admin_login_issues_admin_token() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/admin/login")
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let session = response.json::<SessionResponse>();
    let claims = auth::validate_token(&session.token, &ctx.state.jwt).unwrap();
    assert_eq!(claims.role, ADMIN_ROLE);
    assert_eq!(claims.sub, ADMIN_USERNAME);
    assert!(session.client.is_none());
}

#[test(tokio::test)]
async fn test_admin_login_response_has_no_credentials() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/admin/login")
        .json(&json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }))
        .await;

    let body = response.json::<Value>();
    let object = body.as_object().unwrap();
    assert!(object.contains_key("token"));
    assert!(!object.contains_key("password"));
    assert!(!object.contains_key("password_hash"));
    assert!(!object.contains_key("client"));
}

#[test(tokio::test)]
async fn test_admin_login_rejects_wrong_password() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/admin/login")
        .json(&json!({ "username": ADMIN_USERNAME, "password": "guess" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["error"],
        "Authentication error: Invalid username or password"
    );
}

#[test(tokio::test)]
async fn test_admin_login_rejects_wrong_username() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/admin/login")
        .json(&json!({ "username": "intruder", "password": ADMIN_PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[test(tokio::test)]
async fn test_client_login_requires_both_fields() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/portal/login")
        .json(&json!({ "username": "  ", "password": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Validation error: Username and password are required."
    );
}

#[test(tokio::test)]
async fn test_admin_token_cannot_open_client_profile() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let (name, value) = bearer(&ctx.admin_token());

    let response = server.get("/api/portal/me").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[test(tokio::test)]
async fn test_version_endpoint() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/version").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["version"],
        env!("CARGO_PKG_VERSION")
    );
}
