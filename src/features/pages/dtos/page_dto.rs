use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::pages::models::{Page, PageStatus, PageWithAuthor};
use crate::shared::serde_helpers::double_option;
use crate::shared::validation::SLUG_REGEX;

/// Author embedded in a page response, collapsed to id and name
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageAuthorDto {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

/// Response DTO for a page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageResponseDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub status: PageStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub template: String,
    pub sort_order: i32,
    pub is_homepage: bool,
    /// Key is omitted entirely when the author relation was not loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<PageAuthorDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Page> for PageResponseDto {
    fn from(p: Page) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            excerpt: p.excerpt,
            featured_image: p.featured_image,
            meta_title: p.meta_title,
            meta_description: p.meta_description,
            meta_keywords: p.meta_keywords,
            status: p.status,
            published_at: p.published_at,
            author_id: p.author_id,
            parent_id: p.parent_id,
            template: p.template,
            sort_order: p.sort_order,
            is_homepage: p.is_homepage,
            author: None,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<PageWithAuthor> for PageResponseDto {
    fn from(row: PageWithAuthor) -> Self {
        let author = PageAuthorDto {
            id: row.page.author_id,
            name: row.author_name,
        };
        let mut dto = PageResponseDto::from(row.page);
        dto.author = Some(author);
        dto
    }
}

/// DTO for creating a page; author_id always comes from the authenticated
/// caller, never from the payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePageDto {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,

    #[validate(
        length(min = 1, max = 255, message = "must be 1-255 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "must contain only lowercase letters, digits and single hyphens"
        )
    )]
    pub slug: String,

    pub content: Option<String>,

    pub excerpt: Option<String>,

    #[validate(length(max = 255, message = "must not exceed 255 characters"))]
    pub featured_image: Option<String>,

    #[validate(length(max = 255, message = "must not exceed 255 characters"))]
    pub meta_title: Option<String>,

    pub meta_description: Option<String>,

    pub meta_keywords: Option<String>,

    /// Defaults to draft
    pub status: Option<PageStatus>,

    pub published_at: Option<DateTime<Utc>>,

    /// Must reference an existing page
    pub parent_id: Option<Uuid>,

    /// Defaults to "default"
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub template: Option<String>,

    /// Defaults to 0
    #[validate(range(min = 0, message = "must not be negative"))]
    pub sort_order: Option<i32>,

    /// Defaults to false; setting it clears the flag on every other page
    pub is_homepage: Option<bool>,
}

/// DTO for partial page updates.
///
/// Every field is optional and validated only when present. Nullable columns
/// use a double Option so an explicit JSON null clears the stored value while
/// an absent key leaves it untouched.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePageDto {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "must be 1-255 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "must contain only lowercase letters, digits and single hyphens"
        )
    )]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub excerpt: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255, message = "must not exceed 255 characters"))]
    pub featured_image: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255, message = "must not exceed 255 characters"))]
    pub meta_title: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub meta_description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub meta_keywords: Option<Option<String>>,

    pub status: Option<PageStatus>,

    #[serde(default, deserialize_with = "double_option")]
    pub published_at: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,

    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub template: Option<String>,

    #[validate(range(min = 0, message = "must not be negative"))]
    pub sort_order: Option<i32>,

    pub is_homepage: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page {
            id: Uuid::now_v7(),
            title: "Hakkımızda".to_string(),
            slug: "hakkimizda".to_string(),
            content: Some("content".to_string()),
            excerpt: None,
            featured_image: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            status: PageStatus::Published,
            published_at: None,
            author_id: None,
            parent_id: None,
            template: "default".to_string(),
            sort_order: 0,
            is_homepage: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_author_key_omitted_when_not_loaded() {
        let dto = PageResponseDto::from(page());
        let json = serde_json::to_value(&dto).unwrap();

        assert!(json.get("author").is_none());
        assert_eq!(json["slug"], "hakkimizda");
    }

    #[test]
    fn test_author_collapses_to_id_and_name_when_loaded() {
        let author_id = Uuid::now_v7();
        let mut row = page();
        row.author_id = Some(author_id);

        let dto = PageResponseDto::from(PageWithAuthor {
            page: row,
            author_name: Some("Ayşe".to_string()),
        });
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["author"]["id"], serde_json::json!(author_id));
        assert_eq!(json["author"]["name"], "Ayşe");
    }

    #[test]
    fn test_update_dto_distinguishes_absent_from_null() {
        let dto: UpdatePageDto = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(dto.parent_id, Some(None));
        assert!(dto.content.is_none());

        let dto: UpdatePageDto = serde_json::from_str(r#"{"content": "yeni"}"#).unwrap();
        assert_eq!(dto.content, Some(Some("yeni".to_string())));
    }

    #[test]
    fn test_create_dto_reports_all_failing_fields() {
        let dto = CreatePageDto {
            title: "".to_string(),
            slug: "Not A Slug".to_string(),
            content: None,
            excerpt: None,
            featured_image: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            status: None,
            published_at: None,
            parent_id: None,
            template: None,
            sort_order: Some(-3),
            is_homepage: None,
        };

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("slug"));
        assert!(fields.contains_key("sort_order"));
    }

    #[test]
    fn test_status_rejects_unknown_variant() {
        let result = serde_json::from_str::<UpdatePageDto>(r#"{"status": "binned"}"#);
        assert!(result.is_err());
    }
}
