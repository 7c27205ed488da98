use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature (all bearer-token protected)
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_user, unique_slug, with_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::PgPool;

    async fn build_server(pool: PgPool) -> TestServer {
        let user = seed_user(&pool).await;
        let service = Arc::new(CategoryService::new(pool));
        TestServer::new(with_auth(routes(service), user)).unwrap()
    }

    #[sqlx::test]
    async fn test_create_and_get_category(pool: PgPool) {
        let server = build_server(pool).await;

        let slug = unique_slug("genel");
        let created = server
            .post("/api/categories")
            .json(&json!({ "name": "Genel", "slug": slug }))
            .await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        let body: serde_json::Value = created.json();
        assert_eq!(body["data"]["sort_order"], json!(0));
        // Categories carry no author relation
        assert!(body["data"].get("author").is_none());

        let id = body["data"]["id"].as_str().unwrap();
        let fetched = server.get(&format!("/api/categories/{}", id)).await;
        fetched.assert_status_ok();
        let fetched_body: serde_json::Value = fetched.json();
        assert_eq!(fetched_body["data"]["slug"], json!(slug));
    }

    #[sqlx::test]
    async fn test_update_rejects_unknown_parent(pool: PgPool) {
        let server = build_server(pool).await;

        let created = server
            .post("/api/categories")
            .json(&json!({ "name": "Alt", "slug": unique_slug("alt") }))
            .await;
        let body: serde_json::Value = created.json();
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server
            .patch(&format!("/api/categories/{}", id))
            .json(&json!({ "parent_id": uuid::Uuid::new_v4() }))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let error_body: serde_json::Value = response.json();
        assert!(error_body["errors"].get("parent_id").is_some());
    }

    #[sqlx::test]
    async fn test_delete_returns_204_then_404(pool: PgPool) {
        let server = build_server(pool).await;

        let created = server
            .post("/api/categories")
            .json(&json!({ "name": "Gecici", "slug": unique_slug("gecici") }))
            .await;
        let body: serde_json::Value = created.json();
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let deleted = server.delete(&format!("/api/categories/{}", id)).await;
        assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

        let gone = server.get(&format!("/api/categories/{}", id)).await;
        assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_unknown_id_is_404(pool: PgPool) {
        let server = build_server(pool).await;

        let response = server
            .get(&format!("/api/categories/{}", uuid::Uuid::new_v4()))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
