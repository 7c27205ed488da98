use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, FieldErrors, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::Category;
use crate::shared::types::{Meta, PaginationQuery};

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, parent_id, sort_order, created_at, updated_at";

/// Convert database errors into field-level validation errors where a
/// constraint maps to a request field.
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // Unique constraint violation (PostgreSQL error code 23505)
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("slug") {
                    return AppError::field("slug", "has already been taken");
                }
            }
        }

        // Foreign key violation (PostgreSQL error code 23503)
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::field("parent_id", "must reference an existing category");
        }
    }

    AppError::Database(e)
}

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let mut errors = FieldErrors::new();
        if self.slug_taken(&dto.slug, None).await? {
            errors.add("slug", "has already been taken");
        }
        if let Some(parent_id) = dto.parent_id {
            if !self.exists(parent_id).await? {
                errors.add("parent_id", "must reference an existing category");
            }
        }
        errors.into_result()?;

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, slug, description, parent_id, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(&dto.slug)
        .bind(&dto.description)
        .bind(dto.parent_id)
        .bind(dto.sort_order.unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)?;

        tracing::info!("Category created: id={}, slug={}", category.id, category.slug);

        Ok(category.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category: {:?}", e);
            AppError::Database(e)
        })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))
    }

    /// List categories newest first
    pub async fn list(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<CategoryResponseDto>, Meta)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let categories = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((
            categories.into_iter().map(|c| c.into()).collect(),
            Meta::paginated(total, pagination),
        ))
    }

    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let current = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))?;

        let mut errors = FieldErrors::new();
        if let Some(slug) = &dto.slug {
            if *slug != current.slug && self.slug_taken(slug, Some(id)).await? {
                errors.add("slug", "has already been taken");
            }
        }
        if let Some(Some(parent_id)) = dto.parent_id {
            if parent_id == id {
                errors.add("parent_id", "must not reference the category itself");
            } else if !self.exists(parent_id).await? {
                errors.add("parent_id", "must reference an existing category");
            }
        }
        errors.into_result()?;

        let name = dto.name.unwrap_or(current.name);
        let slug = dto.slug.unwrap_or(current.slug);
        let description = dto.description.unwrap_or(current.description);
        let parent_id = dto.parent_id.unwrap_or(current.parent_id);
        let sort_order = dto.sort_order.unwrap_or(current.sort_order);

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = $1, slug = $2, description = $3, parent_id = $4,
                sort_order = $5, updated_at = now()
            WHERE id = $6
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(&slug)
        .bind(&description)
        .bind(parent_id)
        .bind(sort_order)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)?;

        Ok(category.into())
    }

    /// Hard-delete a category. Children are detached by the FK's ON DELETE
    /// SET NULL, not deleted.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category '{}' not found", id)));
        }

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
