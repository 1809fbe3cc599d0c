//! Asset inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        asset::{AssetQuery, CreateAsset, UpdateAsset},
        Asset,
    },
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// List assets with search and pagination
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "List of assets", body = PaginatedResponse<Asset>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<PaginatedResponse<Asset>>> {
    claims.require_read_assets()?;

    let company_id = query.company_id.unwrap_or(claims.company_id);
    claims.require_company(company_id)?;

    let (items, total) = state.services.assets.search(company_id, &query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get asset details by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Asset>> {
    claims.require_read_assets()?;

    let asset = state
        .services
        .assets
        .get(id, claims.company_scope())
        .await?;
    Ok(Json(asset))
}

/// Create a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Asset code already exists")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    claims.require_manage_assets()?;

    let company_id = data.company_id.unwrap_or(claims.company_id);
    claims.require_company(company_id)?;

    let created = state.services.assets.create(company_id, &data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an asset
#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    claims.require_manage_assets()?;

    let updated = state
        .services
        .assets
        .update(id, claims.company_scope(), &data)
        .await?;
    Ok(Json(updated))
}

/// Delete an asset
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_manage_assets()?;

    state
        .services
        .assets
        .delete(id, claims.company_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
