use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Publication state of a page
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "page_status", rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Database model for a page
#[derive(Debug, Clone, FromRow)]
pub struct Page {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page row joined with its author's name
#[derive(Debug, Clone, FromRow)]
pub struct PageWithAuthor {
    #[sqlx(flatten)]
    pub page: Page,
    pub author_name: Option<String>,
}
