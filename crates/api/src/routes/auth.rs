use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/login", post(handlers::auth::admin_login))
        .route("/api/portal/login", post(handlers::auth::client_login))
        .route("/api/portal/me", get(handlers::auth::client_profile))
}
