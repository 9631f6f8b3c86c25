use axum::http::StatusCode;
use axum::response::IntoResponse;
use jsonwebtoken::{EncodingKey, Header, encode};
use pretty_assertions::assert_eq;
use rstest::rstest;
use studio_api::middleware::{
    auth::{self, ADMIN_ROLE, CLIENT_ROLE, Claims},
    error_handling::{AppError, map_error, storage_error},
};
use studio_core::errors::StudioError;
use uuid::Uuid;

use crate::test_utils::jwt_config;

#[rstest]
#[case(StudioError::NotFound("Booking not found".to_string()), StatusCode::NOT_FOUND)]
#[case(StudioError::Validation("Invalid input".to_string()), StatusCode::BAD_REQUEST)]
#[case(StudioError::Conflict("Username taken".to_string()), StatusCode::CONFLICT)]
#[case(StudioError::Authentication("Invalid password".to_string()), StatusCode::UNAUTHORIZED)]
#[case(StudioError::Authorization("Not authorized".to_string()), StatusCode::FORBIDDEN)]
#[case(StudioError::Storage("bucket unreachable".to_string()), StatusCode::BAD_GATEWAY)]
#[case(StudioError::Database(eyre::eyre!("Database error")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    StudioError::Internal(Box::new(std::io::Error::other("Internal error"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: StudioError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn test_error_body_carries_message() {
    let response = map_error(StudioError::Validation("Booking name required.".to_string()));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        json["error"],
        "Validation error: Booking name required."
    );
}

#[test]
fn test_report_keeps_wrapped_studio_error() {
    let report: eyre::Report = StudioError::Validation("No matched originals to download".to_string()).into();
    let error = AppError::from(report);

    assert_eq!(error.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_plain_report_is_a_server_error() {
    let error = AppError::from(eyre::eyre!("connection reset"));

    assert!(matches!(error.0, StudioError::Database(_)));
    assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_storage_error_is_bad_gateway() {
    let error = storage_error(eyre::eyre!("put refused"));
    assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_hash_password() {
    let password = "test_password";
    let hashed = auth::hash_password(password).unwrap();

    assert_ne!(hashed, password);
    assert!(hashed.starts_with("$argon2"));
}

#[test]
fn test_hashes_are_salted() {
    let first = auth::hash_password("same").unwrap();
    let second = auth::hash_password("same").unwrap();

    assert_ne!(first, second);
    assert!(auth::verify_password("same", &first));
    assert!(auth::verify_password("same", &second));
}

#[test]
fn test_verify_password() {
    let hashed = auth::hash_password("correct horse").unwrap();

    assert!(auth::verify_password("correct horse", &hashed));
    assert!(!auth::verify_password("wrong horse", &hashed));
}

#[test]
fn test_verify_password_rejects_malformed_hash() {
    assert!(!auth::verify_password("anything", "plaintext-not-a-hash"));
}

#[test]
fn test_token_round_trip() {
    let config = jwt_config();
    let client_id = Uuid::new_v4();

    let (token, expires_at) = auth::issue_token(&client_id.to_string(), CLIENT_ROLE, &config).unwrap();
    let claims = auth::validate_token(&token, &config).unwrap();

    assert_eq!(claims.sub, client_id.to_string());
    assert_eq!(claims.role, CLIENT_ROLE);
    assert_eq!(claims.exp, expires_at.timestamp());
    assert!(claims.exp > claims.iat);
    assert!(!claims.jti.is_empty());
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let mut other = jwt_config();
    other.secret = "a-completely-different-secret".to_string();

    let (token, _) = auth::issue_token("owner", ADMIN_ROLE, &other).unwrap();
    let result = auth::validate_token(&token, &jwt_config());

    assert!(matches!(result, Err(StudioError::Authentication(_))));
}

#[test]
fn test_expired_token_is_rejected() {
    let config = jwt_config();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "owner".to_string(),
        role: ADMIN_ROLE.to_string(),
        // Well past the default leeway
        exp: now - 300,
        iat: now - 600,
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap();

    assert!(auth::validate_token(&token, &config).is_err());
}
