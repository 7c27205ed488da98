use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .with_state(service)
}

/// Protected auth routes (require a valid bearer token)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/user", get(handlers::get_user))
        .route("/api/auth/logout", post(handlers::logout))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::middleware;
    use crate::features::auth::services::TokenService;
    use crate::shared::test_helpers::seed_user_with_password;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::PgPool;

    /// Same topology as main: public login, protected routes behind the
    /// bearer middleware, unauthenticated health check.
    fn build_server(pool: PgPool) -> TestServer {
        let tokens = Arc::new(TokenService::new(pool.clone(), 3600));
        let auth = Arc::new(AuthService::new(pool, Arc::clone(&tokens)));

        let protected = protected_routes(Arc::clone(&auth)).route_layer(
            axum::middleware::from_fn_with_state(tokens, middleware::auth_middleware),
        );
        let app = Router::new()
            .merge(public_routes(auth))
            .merge(protected)
            .route(
                "/health",
                get(|| async { axum::Json(json!({ "ok": true })) }),
            );

        TestServer::new(app).unwrap()
    }

    async fn login(server: &TestServer, email: &str, password: &str) -> String {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[sqlx::test]
    async fn test_login_then_fetch_current_user(pool: PgPool) {
        let user = seed_user_with_password(&pool, "parola123").await;
        let server = build_server(pool);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": user.email, "password": "parola123" }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["user"]["email"], json!(user.email));
        let token = body["data"]["token"].as_str().unwrap();

        let me = server
            .get("/api/auth/user")
            .authorization_bearer(token)
            .await;
        me.assert_status_ok();
        let me_body: serde_json::Value = me.json();
        assert_eq!(me_body["data"]["email"], json!(user.email));
        assert_eq!(me_body["data"]["name"], json!(user.name));
        // The password hash never leaves the service
        assert!(me_body["data"].get("password_hash").is_none());
    }

    #[sqlx::test]
    async fn test_protected_routes_reject_missing_and_bogus_tokens(pool: PgPool) {
        let server = build_server(pool);

        let missing = server.get("/api/auth/user").await;
        assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

        let bogus = server
            .get("/api/auth/user")
            .authorization_bearer("deadbeef")
            .await;
        assert_eq!(bogus.status_code(), StatusCode::UNAUTHORIZED);

        // Health never requires a token
        let health = server.get("/health").await;
        health.assert_status_ok();
        let body: serde_json::Value = health.json();
        assert_eq!(body["ok"], json!(true));
    }

    #[sqlx::test]
    async fn test_login_failures_return_identical_responses(pool: PgPool) {
        let user = seed_user_with_password(&pool, "parola123").await;
        let server = build_server(pool);

        let wrong_password = server
            .post("/api/auth/login")
            .json(&json!({ "email": user.email, "password": "yanlis" }))
            .await;
        let unknown_email = server
            .post("/api/auth/login")
            .json(&json!({ "email": "nobody@test.local", "password": "parola123" }))
            .await;

        assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.text(), unknown_email.text());
    }

    #[sqlx::test]
    async fn test_logout_revokes_only_the_presented_token(pool: PgPool) {
        let user = seed_user_with_password(&pool, "parola123").await;
        let server = build_server(pool);

        let first = login(&server, &user.email, "parola123").await;
        let second = login(&server, &user.email, "parola123").await;

        let logout = server
            .post("/api/auth/logout")
            .authorization_bearer(&first)
            .await;
        logout.assert_status_ok();
        let body: serde_json::Value = logout.json();
        assert_eq!(body["data"]["ok"], json!(true));

        let revoked = server
            .get("/api/auth/user")
            .authorization_bearer(&first)
            .await;
        assert_eq!(revoked.status_code(), StatusCode::UNAUTHORIZED);

        let still_valid = server
            .get("/api/auth/user")
            .authorization_bearer(&second)
            .await;
        still_valid.assert_status_ok();
    }
}
