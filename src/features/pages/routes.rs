use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::pages::handlers;
use crate::features::pages::services::PageService;

/// Create routes for the pages feature (all bearer-token protected)
pub fn routes(service: Arc<PageService>) -> Router {
    Router::new()
        .route(
            "/api/pages",
            get(handlers::list_pages).post(handlers::create_page),
        )
        .route(
            "/api/pages/{id}",
            get(handlers::get_page)
                .put(handlers::update_page)
                .patch(handlers::update_page)
                .delete(handlers::delete_page),
        )
        .with_state(service)
}
