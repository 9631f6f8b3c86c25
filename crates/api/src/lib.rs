//! # Studio API
//!
//! The API crate provides the web server behind both studio portals. The
//! admin portal manages bookings, clients, event galleries, uploads and the
//! public website; the client portal lets a signed-in client browse the
//! events shared with them and select photos.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like authentication and error handling
//! - **Jobs**: Run gallery uploads in the background with cooperative cancellation
//! - **Cleanup**: Remove storage objects orphaned by deletes
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework, SQLx for database interactions and
//! an [`ObjectStore`] for files.

/// Removal of storage objects queued by deletes
pub mod cleanup;
/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Background upload jobs
pub mod jobs;
/// Middleware for authentication, logging, and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{BoxError, Router, error_handling::HandleErrorLayer, http::StatusCode};
use eyre::Result;
use sqlx::PgPool;
use studio_storage::{MemoryStore, ObjectStore, S3Store};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::config::{AdminCredentials, ApiConfig, JwtConfig, StorageConfig};
use crate::jobs::UploadJobs;

/// Shared application state that is accessible to all request handlers
///
/// Everything a handler needs is built once at startup and injected here;
/// there are no global clients.
///
/// # Example
///
/// ```rust,ignore
/// let state = Arc::new(ApiState { db_pool, storage, jwt, admin, uploads: UploadJobs::new() });
/// let app = build_router(state, config.max_upload_bytes);
/// ```
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,

    /// Object storage for event photos and website images
    pub storage: Arc<dyn ObjectStore>,

    /// Session token settings
    pub jwt: JwtConfig,

    /// The admin account
    pub admin: AdminCredentials,

    /// Registry of running and recently finished upload jobs
    pub uploads: UploadJobs,
}

/// Builds the object store selected by the configuration
///
/// # Errors
///
/// Returns an error if the S3 client cannot be created from the settings.
pub fn build_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config {
        StorageConfig::S3(s3) => Ok(Arc::new(S3Store::new(s3)?)),
        StorageConfig::Memory { base_url } => {
            warn!("Using in-memory storage; uploaded files are lost on restart");
            Ok(Arc::new(MemoryStore::new(base_url.clone())))
        }
    }
}

/// Builds the application router with every route and request tracing
///
/// CORS and the request timeout are added by [`start_server`], so tests can
/// drive this router directly.
///
/// # Arguments
///
/// * `state` - Shared state handed to every handler
/// * `max_upload_bytes` - Body limit for the multipart upload routes
pub fn build_router(state: Arc<ApiState>, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Login for both portals
        .merge(routes::auth::routes())
        // Admin portal
        .merge(routes::bookings::routes())
        .merge(routes::dashboard::routes())
        .merge(routes::clients::routes())
        .merge(routes::gallery::routes(max_upload_bytes))
        // Website management and the public site
        .merge(routes::website::routes(max_upload_bytes))
        // Client portal
        .merge(routes::portal::routes())
        // Attach shared state to all routes
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, builds the object store, removes any
/// storage objects still queued from earlier runs, configures routes and
/// starts the HTTP server.
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and other settings
/// * `db_pool` - PostgreSQL connection pool for database operations
///
/// # Returns
///
/// * `Result<()>` - Success or error result
///
/// # Example
///
/// ```rust,ignore
/// let config = ApiConfig::from_env()?;
/// let db_pool = studio_db::create_pool(&config.database_url).await?;
/// start_server(config, db_pool).await?;
/// ```
pub async fn start_server(config: ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let storage = build_storage(&config.storage)?;

    // Objects queued by deletes whose cleanup did not finish last time
    match cleanup::purge_pending_deletions(&db_pool, storage.as_ref(), cleanup::PURGE_BATCH).await {
        Ok(report) => info!(
            "Startup cleanup: removed={}, failed={}, retained={}",
            report.removed, report.failed, report.retained
        ),
        Err(e) => warn!("Startup cleanup skipped: {:#}", e),
    }

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        storage,
        jwt: config.jwt.clone(),
        admin: config.admin.clone(),
        uploads: UploadJobs::new(),
    });

    let app = build_router(state, config.max_upload_bytes);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect::<Vec<axum::http::HeaderValue>>();

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async {
                StatusCode::REQUEST_TIMEOUT
            }))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
