use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/dashboard", get(handlers::dashboard::dashboard))
        .route("/api/admin/payments", get(handlers::dashboard::payments))
}
