//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the studio API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! The following environment variables are used:
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `MAX_UPLOAD_BYTES`: Body limit for multipart uploads (default: 512 MiB)
//! - `JWT_SECRET`: Secret key used to sign session tokens (required)
//! - `JWT_EXPIRY_HOURS`: Session lifetime (default: 24)
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD_HASH`: Admin account, the hash in argon2 PHC form (required)
//! - `STORAGE_BACKEND`: `s3` (default) or `memory`
//! - `S3_ENDPOINT`, `S3_PUBLIC_ENDPOINT`, `S3_REGION`, `S3_BUCKET`,
//!   `S3_ACCESS_KEY`, `S3_SECRET_KEY`: Object storage settings for the `s3` backend

use eyre::{Result, WrapErr, eyre};
use std::env;
use studio_storage::S3Config;
use tracing::Level;

/// Default body limit for uploads: 512 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Signing settings for session tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify tokens
    pub secret: String,

    /// Token lifetime in hours
    pub expiry_hours: i64,
}

/// The single admin account, checked at `/api/admin/login`.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,

    /// Argon2 PHC string; the plaintext password is never configured
    pub password_hash: String,
}

/// Where uploaded files are stored.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Any S3-compatible service
    S3(S3Config),

    /// In-process store for local development; objects are lost on restart
    Memory { base_url: String },
}

/// Configuration for the studio API server
///
/// This struct encapsulates all configuration options for the API server,
/// including networking, database connections, storage and security settings.
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use studio_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,

    /// Session token settings
    pub jwt: JwtConfig,

    /// Admin login
    pub admin: AdminCredentials,

    /// Object storage backend
    pub storage: StorageConfig,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// This function loads configuration values from environment variables,
    /// providing sensible defaults where possible.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - `DATABASE_URL`, `JWT_SECRET`, `ADMIN_USERNAME` or `ADMIN_PASSWORD_HASH` is not set
    /// - A numeric value such as `API_PORT` cannot be parsed
    /// - The `s3` backend is selected without a bucket or credentials
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);
        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => value.parse().wrap_err("Invalid MAX_UPLOAD_BYTES value")?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        // Security settings
        let secret = env::var("JWT_SECRET").wrap_err("JWT_SECRET environment variable must be set")?;
        if secret.is_empty() {
            return Err(eyre!("JWT_SECRET must not be empty"));
        }
        let expiry_hours = env::var("JWT_EXPIRY_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .wrap_err("Invalid JWT_EXPIRY_HOURS value")?;
        let jwt = JwtConfig {
            secret,
            expiry_hours,
        };

        let admin = AdminCredentials {
            username: env::var("ADMIN_USERNAME")
                .wrap_err("ADMIN_USERNAME environment variable must be set")?,
            password_hash: env::var("ADMIN_PASSWORD_HASH")
                .wrap_err("ADMIN_PASSWORD_HASH environment variable must be set")?,
        };

        let storage = storage_from_env()?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            max_upload_bytes,
            jwt,
            admin,
            storage,
        })
    }

    /// Returns the server address as a string
    ///
    /// # Returns
    ///
    /// * `String` - Formatted server address (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Maps a `LOG_LEVEL` value to a tracing level, falling back to INFO.
pub fn parse_log_level(value: &str) -> Level {
    match value.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn storage_from_env() -> Result<StorageConfig> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "s3".to_string());

    match backend.as_str() {
        "memory" => Ok(StorageConfig::Memory {
            base_url: env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000/storage".to_string()),
        }),
        "s3" => {
            let endpoint = env::var("S3_ENDPOINT").ok().filter(|v| !v.is_empty());
            let public_endpoint = env::var("S3_PUBLIC_ENDPOINT").ok().filter(|v| !v.is_empty());

            Ok(StorageConfig::S3(S3Config {
                endpoint,
                public_endpoint,
                region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                bucket: env::var("S3_BUCKET")
                    .wrap_err("S3_BUCKET environment variable must be set")?,
                access_key: env::var("S3_ACCESS_KEY")
                    .wrap_err("S3_ACCESS_KEY environment variable must be set")?,
                secret_key: env::var("S3_SECRET_KEY")
                    .wrap_err("S3_SECRET_KEY environment variable must be set")?,
            }))
        }
        other => Err(eyre!("Unknown STORAGE_BACKEND '{}', expected s3 or memory", other)),
    }
}
