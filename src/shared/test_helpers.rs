#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};

#[cfg(test)]
use fake::{faker::name::en::Name, Fake};

#[cfg(test)]
use sqlx::PgPool;

#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
use crate::core::config::AuthConfig;

#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use crate::features::auth::models::User;

#[cfg(test)]
use crate::features::auth::password;

/// Insert a user row and return it as an authenticated caller.
///
/// The token_id is synthetic; tests that exercise real token resolution go
/// through TokenService instead.
#[cfg(test)]
pub async fn seed_user(pool: &PgPool) -> AuthenticatedUser {
    seed_user_with_password(pool, "test-password").await
}

#[cfg(test)]
pub async fn seed_user_with_password(pool: &PgPool, plaintext: &str) -> AuthenticatedUser {
    let name: String = Name().fake();
    let email = format!("{}@test.local", Uuid::new_v4().simple());
    let password_hash = password::hash_password(plaintext).expect("hashing should succeed");

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, password_hash, created_at, updated_at
        "#,
    )
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .expect("user insert should succeed");

    AuthenticatedUser {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
        token_id: Uuid::new_v4(),
    }
}

/// Slug that passes SLUG_REGEX and will not collide across test rows
#[cfg(test)]
pub fn unique_slug(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &suffix[..8])
}

#[cfg(test)]
pub fn test_auth_config(admin_email: &str, admin_password: &str) -> AuthConfig {
    AuthConfig {
        token_ttl_secs: 3600,
        admin_email: Some(admin_email.to_string()),
        admin_password: Some(admin_password.to_string()),
        admin_name: "Admin".to_string(),
    }
}

/// Wrap a router so every request carries the given authenticated user,
/// bypassing token resolution.
#[cfg(test)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
