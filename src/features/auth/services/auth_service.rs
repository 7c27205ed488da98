use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::models::User;
use crate::features::auth::password;
use crate::features::auth::services::TokenService;

/// Identical for unknown email and wrong password so the response cannot be
/// used to enumerate accounts.
fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Service for login, logout and startup user bootstrap
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenService>) -> Self {
        Self { pool, tokens }
    }

    /// Verify credentials and issue a fresh bearer token.
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user by email: {:?}", e);
            AppError::Database(e)
        })?;

        let user = user.ok_or_else(invalid_credentials)?;

        let password_valid = password::verify_password(&dto.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;

        if !password_valid {
            return Err(invalid_credentials());
        }

        let token = self.tokens.issue(user.id).await?;

        tracing::info!("User logged in: id={}, email={}", user.id, user.email);

        Ok(AuthResponseDto {
            user: user.into(),
            token,
        })
    }

    /// Revoke exactly the token presented with this request.
    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<()> {
        self.tokens.revoke(user.token_id).await
    }

    /// Create the initial user from ADMIN_EMAIL/ADMIN_PASSWORD if configured
    /// and the email is not taken yet.
    pub async fn ensure_bootstrap_user(&self, config: &AuthConfig) -> Result<()> {
        let (Some(email), Some(pass)) = (&config.admin_email, &config.admin_password) else {
            return Ok(());
        };

        let password_hash = password::hash_password(pass)
            .map_err(|e| AppError::Internal(format!("Password hashing error: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&config.admin_name)
        .bind(email)
        .bind(&password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to bootstrap admin user: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() > 0 {
            tracing::info!("Bootstrap user created: {}", email);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_user_with_password, test_auth_config};

    fn service(pool: &PgPool) -> AuthService {
        let tokens = Arc::new(TokenService::new(pool.clone(), 3600));
        AuthService::new(pool.clone(), tokens)
    }

    #[sqlx::test]
    async fn test_login_returns_user_and_token(pool: PgPool) {
        let user = seed_user_with_password(&pool, "gizli-parola").await;
        let service = service(&pool);

        let response = service
            .login(LoginRequestDto {
                email: user.email.clone(),
                password: "gizli-parola".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.id, user.id);
        assert_eq!(response.user.email, user.email);
        assert!(!response.token.is_empty());
    }

    #[sqlx::test]
    async fn test_login_failures_are_indistinguishable(pool: PgPool) {
        let user = seed_user_with_password(&pool, "gizli-parola").await;
        let service = service(&pool);

        let wrong_password = service
            .login(LoginRequestDto {
                email: user.email.clone(),
                password: "yanlis".to_string(),
            })
            .await
            .unwrap_err();

        let unknown_email = service
            .login(LoginRequestDto {
                email: "nobody@test.local".to_string(),
                password: "gizli-parola".to_string(),
            })
            .await
            .unwrap_err();

        // Same variant, same message, so the same response body.
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, AppError::Unauthorized(_)));
        assert!(matches!(unknown_email, AppError::Unauthorized(_)));
    }

    #[sqlx::test]
    async fn test_bootstrap_user_can_log_in(pool: PgPool) {
        let service = service(&pool);
        let config = test_auth_config("root@test.local", "ilk-parola");

        service.ensure_bootstrap_user(&config).await.unwrap();
        // Second run is a no-op, not an error.
        service.ensure_bootstrap_user(&config).await.unwrap();

        let response = service
            .login(LoginRequestDto {
                email: "root@test.local".to_string(),
                password: "ilk-parola".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.email, "root@test.local");
    }
}
