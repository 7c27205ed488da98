use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, FieldErrors, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::pages::dtos::{CreatePageDto, PageAuthorDto, PageResponseDto, UpdatePageDto};
use crate::features::pages::models::{Page, PageWithAuthor};
use crate::shared::constants::DEFAULT_PAGE_TEMPLATE;
use crate::shared::types::{Meta, PaginationQuery};

const PAGE_COLUMNS: &str = "id, title, slug, content, excerpt, featured_image, \
     meta_title, meta_description, meta_keywords, status, published_at, \
     author_id, parent_id, template, sort_order, is_homepage, created_at, updated_at";

/// Convert database errors into field-level validation errors where a
/// constraint maps to a request field. The unique index on slug is the
/// source of truth; the service-level pre-check is only an optimistic read.
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
            return AppError::field("parent_id", "must reference an existing page");
        }
    }

    AppError::Database(e)
}

/// Service for page operations
pub struct PageService {
    pool: PgPool,
}

impl PageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a page. The author is always the authenticated caller.
    pub async fn create(
        &self,
        dto: CreatePageDto,
        author: &AuthenticatedUser,
    ) -> Result<PageResponseDto> {
        let mut errors = FieldErrors::new();
        if self.slug_taken(&dto.slug, None).await? {
            errors.add("slug", "has already been taken");
        }
        if let Some(parent_id) = dto.parent_id {
            if !self.exists(parent_id).await? {
                errors.add("parent_id", "must reference an existing page");
            }
        }
        errors.into_result()?;

        let is_homepage = dto.is_homepage.unwrap_or(false);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // At most one homepage at any commit point
        if is_homepage {
            sqlx::query("UPDATE pages SET is_homepage = FALSE, updated_at = now() WHERE is_homepage = TRUE")
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        let page = sqlx::query_as::<_, Page>(&format!(
            r#"
            INSERT INTO pages (
                title, slug, content, excerpt, featured_image,
                meta_title, meta_description, meta_keywords,
                status, published_at, author_id, parent_id,
                template, sort_order, is_homepage
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(&dto.title)
        .bind(&dto.slug)
        .bind(&dto.content)
        .bind(&dto.excerpt)
        .bind(&dto.featured_image)
        .bind(&dto.meta_title)
        .bind(&dto.meta_description)
        .bind(&dto.meta_keywords)
        .bind(dto.status.unwrap_or_default())
        .bind(dto.published_at)
        .bind(author.id)
        .bind(dto.parent_id)
        .bind(dto.template.as_deref().unwrap_or(DEFAULT_PAGE_TEMPLATE))
        .bind(dto.sort_order.unwrap_or(0))
        .bind(is_homepage)
        .fetch_one(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("Page created: id={}, slug={}", page.id, page.slug);

        // The author relation is the caller; no need to re-read it
        let mut response = PageResponseDto::from(page);
        response.author = Some(PageAuthorDto {
            id: Some(author.id),
            name: Some(author.name.clone()),
        });
        Ok(response)
    }

    /// Get a page by id, with its author embedded
    pub async fn get(&self, id: Uuid) -> Result<PageResponseDto> {
        let row = sqlx::query_as::<_, PageWithAuthor>(
            r#"
            SELECT p.id, p.title, p.slug, p.content, p.excerpt, p.featured_image,
                   p.meta_title, p.meta_description, p.meta_keywords, p.status,
                   p.published_at, p.author_id, p.parent_id, p.template,
                   p.sort_order, p.is_homepage, p.created_at, p.updated_at,
                   u.name AS author_name
            FROM pages p
            LEFT JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get page: {:?}", e);
            AppError::Database(e)
        })?;

        row.map(|r| r.into())
            .ok_or_else(|| AppError::NotFound(format!("Page '{}' not found", id)))
    }

    /// List pages newest first, with authors embedded
    pub async fn list(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<PageResponseDto>, Meta)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let rows = sqlx::query_as::<_, PageWithAuthor>(
            r#"
            SELECT p.id, p.title, p.slug, p.content, p.excerpt, p.featured_image,
                   p.meta_title, p.meta_description, p.meta_keywords, p.status,
                   p.published_at, p.author_id, p.parent_id, p.template,
                   p.sort_order, p.is_homepage, p.created_at, p.updated_at,
                   u.name AS author_name
            FROM pages p
            LEFT JOIN users u ON u.id = p.author_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list pages: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((
            rows.into_iter().map(|r| r.into()).collect(),
            Meta::paginated(total, pagination),
        ))
    }

    /// Apply only the supplied fields, re-validating slug uniqueness
    /// (excluding self) and parent existence
    pub async fn update(&self, id: Uuid, dto: UpdatePageDto) -> Result<PageResponseDto> {
        let current = sqlx::query_as::<_, Page>(&format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Page '{}' not found", id)))?;

        let mut errors = FieldErrors::new();
        if let Some(slug) = &dto.slug {
            if *slug != current.slug && self.slug_taken(slug, Some(id)).await? {
                errors.add("slug", "has already been taken");
            }
        }
        if let Some(Some(parent_id)) = dto.parent_id {
            if parent_id == id {
                errors.add("parent_id", "must not reference the page itself");
            } else if !self.exists(parent_id).await? {
                errors.add("parent_id", "must reference an existing page");
            }
        }
        errors.into_result()?;

        let title = dto.title.unwrap_or(current.title);
        let slug = dto.slug.unwrap_or(current.slug);
        let content = dto.content.unwrap_or(current.content);
        let excerpt = dto.excerpt.unwrap_or(current.excerpt);
        let featured_image = dto.featured_image.unwrap_or(current.featured_image);
        let meta_title = dto.meta_title.unwrap_or(current.meta_title);
        let meta_description = dto.meta_description.unwrap_or(current.meta_description);
        let meta_keywords = dto.meta_keywords.unwrap_or(current.meta_keywords);
        let status = dto.status.unwrap_or(current.status);
        let published_at = dto.published_at.unwrap_or(current.published_at);
        let parent_id = dto.parent_id.unwrap_or(current.parent_id);
        let template = dto.template.unwrap_or(current.template);
        let sort_order = dto.sort_order.unwrap_or(current.sort_order);
        let is_homepage = dto.is_homepage.unwrap_or(current.is_homepage);

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        if is_homepage {
            sqlx::query(
                "UPDATE pages SET is_homepage = FALSE, updated_at = now() \
                 WHERE is_homepage = TRUE AND id <> $1",
            )
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        let page = sqlx::query_as::<_, Page>(&format!(
            r#"
            UPDATE pages
            SET title = $1, slug = $2, content = $3, excerpt = $4,
                featured_image = $5, meta_title = $6, meta_description = $7,
                meta_keywords = $8, status = $9, published_at = $10,
                parent_id = $11, template = $12, sort_order = $13,
                is_homepage = $14, updated_at = now()
            WHERE id = $15
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(&title)
        .bind(&slug)
        .bind(&content)
        .bind(&excerpt)
        .bind(&featured_image)
        .bind(&meta_title)
        .bind(&meta_description)
        .bind(&meta_keywords)
        .bind(status)
        .bind(published_at)
        .bind(parent_id)
        .bind(&template)
        .bind(sort_order)
        .bind(is_homepage)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        tx.commit().await.map_err(AppError::Database)?;

        self.get(page.id).await
    }

    /// Hard-delete a page. Children are detached by the FK's ON DELETE SET
    /// NULL, not deleted.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete page: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page '{}' not found", id)));
        }

        tracing::info!("Page deleted: id={}", id);
        Ok(())
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pages WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pages WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::pages::models::PageStatus;
    use crate::shared::test_helpers::{seed_user, unique_slug};

    fn create_dto(slug: &str) -> CreatePageDto {
        CreatePageDto {
            title: "Test Page".to_string(),
            slug: slug.to_string(),
            content: Some("body".to_string()),
            excerpt: None,
            featured_image: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            status: None,
            published_at: None,
            parent_id: None,
            template: None,
            sort_order: None,
            is_homepage: None,
        }
    }

    #[sqlx::test]
    async fn test_create_applies_defaults_and_readback_matches(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let slug = unique_slug("anasayfa");
        let created = service.create(create_dto(&slug), &author).await.unwrap();

        assert_eq!(created.status, PageStatus::Draft);
        assert_eq!(created.template, "default");
        assert_eq!(created.sort_order, 0);
        assert!(!created.is_homepage);
        assert_eq!(created.author_id, Some(author.id));
        let embedded = created.author.as_ref().unwrap();
        assert_eq!(embedded.id, Some(author.id));
        assert_eq!(embedded.name, Some(author.name.clone()));

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.slug, slug);
        assert_eq!(fetched.content, created.content);
        assert_eq!(fetched.author.unwrap().name, Some(author.name));
    }

    #[sqlx::test]
    async fn test_duplicate_slug_fails_on_slug_field(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let slug = unique_slug("tekrar");
        service.create(create_dto(&slug), &author).await.unwrap();
        let err = service.create(create_dto(&slug), &author).await.unwrap_err();

        match err {
            AppError::Validation(fields) => {
                assert!(fields.into_map().contains_key("slug"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[sqlx::test]
    async fn test_unknown_parent_is_rejected(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let mut dto = create_dto(&unique_slug("cocuk"));
        dto.parent_id = Some(Uuid::now_v7());
        let err = service.create(dto, &author).await.unwrap_err();

        match err {
            AppError::Validation(fields) => {
                assert!(fields.into_map().contains_key("parent_id"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[sqlx::test]
    async fn test_partial_update_changes_only_supplied_fields(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let created = service
            .create(create_dto(&unique_slug("eski")), &author)
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdatePageDto {
                    title: Some("New".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.slug, created.slug);
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.status, created.status);
        assert_eq!(updated.sort_order, created.sort_order);
        assert_eq!(updated.author_id, created.author_id);
    }

    #[sqlx::test]
    async fn test_update_with_own_slug_is_allowed(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let slug = unique_slug("sabit");
        let created = service.create(create_dto(&slug), &author).await.unwrap();

        let updated = service
            .update(
                created.id,
                UpdatePageDto {
                    slug: Some(slug.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, slug);
    }

    #[sqlx::test]
    async fn test_explicit_null_clears_parent(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let parent = service
            .create(create_dto(&unique_slug("ebeveyn")), &author)
            .await
            .unwrap();
        let mut child_dto = create_dto(&unique_slug("cocuk"));
        child_dto.parent_id = Some(parent.id);
        let child = service.create(child_dto, &author).await.unwrap();
        assert_eq!(child.parent_id, Some(parent.id));

        let updated = service
            .update(
                child.id,
                UpdatePageDto {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.parent_id, None);
    }

    #[sqlx::test]
    async fn test_self_parenting_is_rejected(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let page = service
            .create(create_dto(&unique_slug("tekil")), &author)
            .await
            .unwrap();

        let err = service
            .update(
                page.id,
                UpdatePageDto {
                    parent_id: Some(Some(page.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[sqlx::test]
    async fn test_deleting_parent_detaches_children(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let parent = service
            .create(create_dto(&unique_slug("ebeveyn")), &author)
            .await
            .unwrap();
        let mut child_dto = create_dto(&unique_slug("cocuk"));
        child_dto.parent_id = Some(parent.id);
        let child = service.create(child_dto, &author).await.unwrap();

        service.delete(parent.id).await.unwrap();

        let orphan = service.get(child.id).await.unwrap();
        assert_eq!(orphan.parent_id, None);
    }

    #[sqlx::test]
    async fn test_delete_unknown_id_is_not_found(pool: PgPool) {
        let service = PageService::new(pool);
        let err = service.delete(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test]
    async fn test_list_paginates_newest_first(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        for i in 0..25 {
            service
                .create(create_dto(&unique_slug(&format!("sayfa{}", i))), &author)
                .await
                .unwrap();
        }

        let first = PaginationQuery { page: 1, page_size: 20 };
        let (items, meta) = service.list(&first).await.unwrap();
        assert_eq!(items.len(), 20);
        assert_eq!(meta.total, 25);
        assert_eq!(meta.total_pages, 2);

        let second = PaginationQuery { page: 2, page_size: 20 };
        let (rest, _) = service.list(&second).await.unwrap();
        assert_eq!(rest.len(), 5);

        // Newest first across the whole listing
        let all: Vec<_> = items.iter().chain(rest.iter()).collect();
        for pair in all.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[sqlx::test]
    async fn test_homepage_flag_is_unique(pool: PgPool) {
        let author = seed_user(&pool).await;
        let service = PageService::new(pool);

        let mut first_dto = create_dto(&unique_slug("birinci"));
        first_dto.is_homepage = Some(true);
        let first = service.create(first_dto, &author).await.unwrap();
        assert!(first.is_homepage);

        let mut second_dto = create_dto(&unique_slug("ikinci"));
        second_dto.is_homepage = Some(true);
        let second = service.create(second_dto, &author).await.unwrap();
        assert!(second.is_homepage);

        let demoted = service.get(first.id).await.unwrap();
        assert!(!demoted.is_homepage);
    }
}
