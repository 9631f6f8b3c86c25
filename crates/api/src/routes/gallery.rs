use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

/// Admin gallery routes. Uploads accept bodies up to `max_upload_bytes`.
pub fn routes(max_upload_bytes: usize) -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/admin/events/:id/images",
            get(handlers::gallery::list_event_images),
        )
        .route(
            "/api/admin/events/:id/uploads",
            post(handlers::gallery::start_upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/admin/uploads/:job_id",
            get(handlers::gallery::upload_status).delete(handlers::gallery::cancel_upload),
        )
        .route(
            "/api/admin/images/batch-delete",
            post(handlers::gallery::batch_delete_images),
        )
        .route("/api/admin/images/:id", delete(handlers::gallery::delete_image))
}
