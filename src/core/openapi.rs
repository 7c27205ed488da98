use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::pages::{
    dtos as pages_dtos, handlers as pages_handlers, models as pages_models,
};
use crate::shared::types::Meta;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::login,
        auth_handlers::get_user,
        auth_handlers::logout,
        // Pages
        pages_handlers::list_pages,
        pages_handlers::create_page,
        pages_handlers::get_page,
        pages_handlers::update_page,
        pages_handlers::delete_page,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::get_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_dtos::LoginRequestDto,
            auth_dtos::AuthResponseDto,
            auth_dtos::UserDto,
            // Pages
            pages_models::PageStatus,
            pages_dtos::PageAuthorDto,
            pages_dtos::PageResponseDto,
            pages_dtos::CreatePageDto,
            pages_dtos::UpdatePageDto,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
        )
    ),
    tags(
        (name = "auth", description = "Login, current user, logout"),
        (name = "pages", description = "Hierarchical content pages"),
        (name = "categories", description = "Hierarchical content categories"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Sayfa API",
        version = "0.1.0",
        description = "API documentation for Sayfa",
    )
)]
pub struct ApiDoc;

/// Adds the bearer token security scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("Token")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
