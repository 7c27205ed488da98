use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::serde_helpers::double_option;
use crate::shared::validation::SLUG_REGEX;

/// Response DTO for a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            parent_id: c.parent_id,
            sort_order: c.sort_order,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// DTO for creating a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 255, message = "must be 1-255 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "must contain only lowercase letters, digits and single hyphens"
        )
    )]
    pub slug: String,

    pub description: Option<String>,

    /// Must reference an existing category
    pub parent_id: Option<Uuid>,

    /// Defaults to 0
    #[validate(range(min = 0, message = "must not be negative"))]
    pub sort_order: Option<i32>,
}

/// DTO for partial category updates.
///
/// Fields are validated only when present; nullable columns use a double
/// Option so an explicit JSON null clears the stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "must be 1-255 characters"),
        regex(
            path = *SLUG_REGEX,
            message = "must contain only lowercase letters, digits and single hyphens"
        )
    )]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,

    #[validate(range(min = 0, message = "must not be negative"))]
    pub sort_order: Option<i32>,
}
