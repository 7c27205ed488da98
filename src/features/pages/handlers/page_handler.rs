use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::pages::dtos::{CreatePageDto, PageResponseDto, UpdatePageDto};
use crate::features::pages::services::PageService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List pages, newest first, 20 per page
#[utoipa::path(
    get,
    path = "/api/pages",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated list of pages", body = ApiResponse<Vec<PageResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "pages",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_pages(
    State(service): State<Arc<PageService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PageResponseDto>>>> {
    let (pages, meta) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(Some(pages), None, Some(meta))))
}

/// Create a page; the author is the authenticated caller
#[utoipa::path(
    post,
    path = "/api/pages",
    request_body = CreatePageDto,
    responses(
        (status = 201, description = "Page created", body = ApiResponse<PageResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    ),
    tag = "pages",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_page(
    user: AuthenticatedUser,
    State(service): State<Arc<PageService>>,
    AppJson(dto): AppJson<CreatePageDto>,
) -> Result<(StatusCode, Json<ApiResponse<PageResponseDto>>)> {
    dto.validate().map_err(AppError::from)?;

    let page = service.create(dto, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(page), None, None)),
    ))
}

/// Get a page by id
#[utoipa::path(
    get,
    path = "/api/pages/{id}",
    params(
        ("id" = Uuid, Path, description = "Page id")
    ),
    responses(
        (status = 200, description = "Page found", body = ApiResponse<PageResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Page not found")
    ),
    tag = "pages",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_page(
    State(service): State<Arc<PageService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PageResponseDto>>> {
    let page = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(page), None, None)))
}

/// Partially update a page; only supplied fields change
#[utoipa::path(
    put,
    path = "/api/pages/{id}",
    params(
        ("id" = Uuid, Path, description = "Page id")
    ),
    request_body = UpdatePageDto,
    responses(
        (status = 200, description = "Page updated", body = ApiResponse<PageResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Page not found"),
        (status = 422, description = "Validation error")
    ),
    tag = "pages",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_page(
    State(service): State<Arc<PageService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePageDto>,
) -> Result<Json<ApiResponse<PageResponseDto>>> {
    dto.validate().map_err(AppError::from)?;

    let page = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(page), None, None)))
}

/// Delete a page; children are detached, not deleted
#[utoipa::path(
    delete,
    path = "/api/pages/{id}",
    params(
        ("id" = Uuid, Path, description = "Page id")
    ),
    responses(
        (status = 204, description = "Page deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Page not found")
    ),
    tag = "pages",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_page(
    State(service): State<Arc<PageService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
