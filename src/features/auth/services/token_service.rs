use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

/// Row produced by the token lookup: the token id plus the owning user.
#[derive(Debug, FromRow)]
struct AuthRow {
    token_id: Uuid,
    user_id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Issues and resolves opaque bearer tokens.
///
/// The plaintext token leaves the process exactly once, in the login
/// response; only its SHA-256 digest is stored.
pub struct TokenService {
    pool: PgPool,
    ttl: Duration,
}

impl TokenService {
    pub fn new(pool: PgPool, token_ttl_secs: i64) -> Self {
        Self {
            pool,
            ttl: Duration::seconds(token_ttl_secs),
        }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// Issue a new token for the user and return the plaintext.
    pub async fn issue(&self, user_id: Uuid) -> Result<String> {
        let token = Self::generate_token();
        let expires_at = Utc::now() + self.ttl;

        sqlx::query(
            r#"
            INSERT INTO access_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(Self::hash_token(&token))
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store access token: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(token)
    }

    /// Resolve a presented token to its user, refreshing last_used_at.
    ///
    /// Expired and revoked (deleted) tokens fail identically.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let row = sqlx::query_as::<_, AuthRow>(
            r#"
            UPDATE access_tokens t
            SET last_used_at = now()
            FROM users u
            WHERE t.token_hash = $1
              AND u.id = t.user_id
              AND (t.expires_at IS NULL OR t.expires_at > now())
            RETURNING t.id AS token_id, u.id AS user_id, u.name, u.email,
                      u.created_at, u.updated_at
            "#,
        )
        .bind(Self::hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up access token: {:?}", e);
            AppError::Database(e)
        })?;

        let row =
            row.ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthenticatedUser {
            id: row.user_id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
            token_id: row.token_id,
        })
    }

    /// Delete a single token row. Other tokens of the same user stay valid.
    pub async fn revoke(&self, token_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM access_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to revoke access token: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
