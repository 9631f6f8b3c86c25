use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/portal/events", get(handlers::portal::list_events))
        .route("/api/portal/events/:id", get(handlers::portal::get_event))
        .route(
            "/api/portal/events/:id/images/status",
            post(handlers::portal::bulk_update_status),
        )
        .route(
            "/api/portal/images/:id/status",
            put(handlers::portal::update_image_status),
        )
}
