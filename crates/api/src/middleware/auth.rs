//! # Authentication Module
//!
//! This module provides authentication-related utilities for the studio API:
//! password hashing and verification, session tokens, and the request
//! extractors that guard the admin and client portals.
//!
//! Passwords are stored as Argon2 PHC strings, for client users and for the
//! admin account alike. A successful login returns an HS256 JWT carrying the
//! caller's role; no credential material is ever returned to the caller.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use eyre::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use studio_core::errors::StudioError;
use uuid::Uuid;

use crate::{ApiState, config::JwtConfig, middleware::error_handling::AppError};

/// Role claim of admin sessions.
pub const ADMIN_ROLE: &str = "admin";
/// Role claim of client-portal sessions.
pub const CLIENT_ROLE: &str = "client";

/// Hashes a password using the Argon2 algorithm
///
/// This function securely hashes passwords before storage in the database,
/// automatically generating a random salt and using the default Argon2
/// parameters.
///
/// # Arguments
///
/// * `password` - The plain text password to hash
///
/// # Returns
///
/// * `Result<String>` - The hashed password in PHC string format
///
/// # Example
///
/// ```rust
/// use studio_api::middleware::auth::hash_password;
///
/// let hashed = hash_password("user_password").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    // Create default Argon2 instance
    let argon2 = Argon2::default();

    // Hash the password with salt
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a password against a stored Argon2 hash
///
/// A malformed stored hash is treated as a failed match rather than an
/// error, so a corrupt row cannot be told apart from a wrong password.
///
/// # Arguments
///
/// * `password` - Plain text password to verify
/// * `password_hash` - PHC string produced by [`hash_password`]
///
/// # Returns
///
/// * `bool` - True if password matches, false otherwise
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// JWT claims embedded in every session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the admin username, or the client user's id
    pub sub: String,
    /// `admin` or `client`
    pub role: String,
    /// Expiration time (UTC Unix timestamp)
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp)
    pub iat: i64,
    /// Unique token identifier
    pub jti: String,
}

/// Issues an HS256 session token
///
/// # Arguments
///
/// * `subject` - Value stored in the `sub` claim
/// * `role` - [`ADMIN_ROLE`] or [`CLIENT_ROLE`]
/// * `config` - Signing secret and lifetime
///
/// # Returns
///
/// * `Result<(String, DateTime<Utc>)>` - The encoded token and its expiry
pub fn issue_token(subject: &str, role: &str, config: &JwtConfig) -> Result<(String, DateTime<Utc>)> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.expiry_hours);

    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| eyre::eyre!("Error signing session token: {}", e))?;

    Ok((token, expires_at))
}

/// Validates a session token's signature and expiry and returns its claims
///
/// # Errors
///
/// Returns `StudioError::Authentication` for any invalid or expired token.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, StudioError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        StudioError::Authentication("Invalid or expired session".to_string())
    })
}

/// Extracts and validates the bearer token, then checks its role
fn claims_from_parts(parts: &Parts, config: &JwtConfig, role: &str) -> Result<Claims, StudioError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| StudioError::Authentication("Missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| StudioError::Authentication("Expected a bearer token".to_string()))?;

    let claims = validate_token(token, config)?;
    if claims.role != role {
        return Err(StudioError::Authorization(format!(
            "This endpoint requires a {} session",
            role
        )));
    }

    Ok(claims)
}

/// An authenticated admin session
///
/// Handlers take this extractor to require an admin token. Missing or
/// invalid tokens are rejected with 401, client tokens with 403.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, &state.jwt, ADMIN_ROLE)?;
        Ok(AdminSession {
            username: claims.sub,
        })
    }
}

/// An authenticated client-portal session
///
/// Event access is not implied by the session; handlers still check the
/// client's grants for every event they touch.
#[derive(Debug, Clone, Copy)]
pub struct ClientSession {
    pub client_id: Uuid,
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for ClientSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, &state.jwt, CLIENT_ROLE)?;
        let client_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| StudioError::Authentication("Invalid or expired session".to_string()))?;
        Ok(ClientSession { client_id })
    }
}
