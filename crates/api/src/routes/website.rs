use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

/// Admin website management plus the public, read-only site routes.
pub fn routes(max_upload_bytes: usize) -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/admin/website/categories",
            get(handlers::website::list_categories).post(handlers::website::create_category),
        )
        .route(
            "/api/admin/website/categories/:id",
            put(handlers::website::rename_category).delete(handlers::website::delete_category),
        )
        .route(
            "/api/admin/website/categories/:id/cover",
            post(handlers::website::upload_cover).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/admin/website/categories/:id/images",
            get(handlers::website::list_category_images)
                .post(handlers::website::upload_category_images)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/admin/website/categories/:id/images/batch-delete",
            post(handlers::website::batch_delete_category_images),
        )
        .route(
            "/api/admin/website/categories/:id/images/:image_id",
            delete(handlers::website::delete_category_image),
        )
        .route(
            "/api/admin/website/images/:id",
            put(handlers::website::update_alt_text),
        )
        .route("/api/site/categories", get(handlers::website::site_categories))
        .route(
            "/api/site/categories/:id/images",
            get(handlers::website::site_category_images),
        )
}
