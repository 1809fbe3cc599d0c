//! QR code generation endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Batch generation request
#[derive(Deserialize, ToSchema)]
pub struct QrBatchRequest {
    /// Tenant to generate for, admins only; defaults to the caller's company
    pub company_id: Option<Uuid>,
    /// Regenerate codes that already exist
    pub force: Option<bool>,
}

/// Batch generation summary
#[derive(Serialize, ToSchema)]
pub struct QrBatchResult {
    /// True when no item failed
    pub success: bool,
    /// Assets considered
    pub total: i64,
    /// Assets with a fresh QR code written back
    pub succeeded: i64,
    /// Assets that failed (see errors)
    pub failed: i64,
    /// One "{asset_id}: {message}" entry per failed asset
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Single asset generation parameters
#[derive(Deserialize, IntoParams)]
pub struct QrGenerateParams {
    /// Regenerate even if the asset already has a QR code
    pub force: Option<bool>,
}

/// Single asset generation response
#[derive(Serialize, ToSchema)]
pub struct QrCodeResponse {
    pub asset_id: Uuid,
    pub qr_code_url: String,
}

/// Generate QR codes for all eligible assets
#[utoipa::path(
    post,
    path = "/qr-codes/generate",
    tag = "qr-codes",
    security(("bearer_auth" = [])),
    request_body = QrBatchRequest,
    responses(
        (status = 200, description = "Batch summary", body = QrBatchResult),
        (status = 401, description = "Not authenticated"),
        (status = 429, description = "Rate limited")
    )
)]
pub async fn generate_batch(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<QrBatchRequest>,
) -> AppResult<Json<QrBatchResult>> {
    claims.require_manage_assets()?;

    let scope = match request.company_id {
        Some(company_id) => {
            claims.require_company(company_id)?;
            Some(company_id)
        }
        None => claims.company_scope(),
    };

    let result = state
        .services
        .qr
        .generate_batch(scope, request.force.unwrap_or(false))
        .await?;
    Ok(Json(result))
}

/// Generate the QR code for a single asset
#[utoipa::path(
    post,
    path = "/assets/{id}/qr-code",
    tag = "qr-codes",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID"),
        QrGenerateParams
    ),
    responses(
        (status = 200, description = "QR code generated", body = QrCodeResponse),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset already has a QR code"),
        (status = 429, description = "Rate limited")
    )
)]
pub async fn generate_for_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(params): Query<QrGenerateParams>,
) -> AppResult<Json<QrCodeResponse>> {
    claims.require_manage_assets()?;

    let qr_code_url = state
        .services
        .qr
        .generate_for_asset(id, claims.company_scope(), params.force.unwrap_or(false))
        .await?;
    Ok(Json(QrCodeResponse {
        asset_id: id,
        qr_code_url,
    }))
}
