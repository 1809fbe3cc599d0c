//! Availability forecast endpoint

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{AvailabilityWindow, Booking, CalendarDay},
};

use super::AuthenticatedUser;

/// Forecast query parameters
#[derive(Deserialize, IntoParams)]
pub struct ForecastQuery {
    /// Tenant override, admins only
    pub company_id: Option<Uuid>,
    /// Horizon length in days (default: 365)
    pub days: Option<i64>,
}

/// Forecast horizon
#[derive(Serialize, ToSchema)]
pub struct ForecastPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

/// Occupancy statistics over the forecast horizon
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityStats {
    pub total_days: i64,
    pub booked_days: i64,
    pub available_days: i64,
    /// Booked days over total days; 0.0 on an empty horizon
    pub occupancy_rate: f64,
    pub next_available_date: Option<NaiveDate>,
    pub longest_available_window: Option<AvailabilityWindow>,
}

/// Availability forecast for one asset
#[derive(Serialize, ToSchema)]
pub struct ForecastResponse {
    pub asset_id: Uuid,
    pub period: ForecastPeriod,
    /// Bookings overlapping the horizon
    pub bookings: Vec<Booking>,
    /// One calendar row per day of the horizon
    pub heatmap: Vec<CalendarDay>,
    /// Contiguous runs of available days
    pub windows: Vec<AvailabilityWindow>,
    pub statistics: AvailabilityStats,
}

/// Forecast availability for an asset
#[utoipa::path(
    get,
    path = "/assets/{id}/availability-forecast",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Asset ID"),
        ForecastQuery
    ),
    responses(
        (status = 200, description = "Availability forecast", body = ForecastResponse),
        (status = 400, description = "Invalid horizon"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn forecast(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ForecastResponse>> {
    claims.require_read_assets()?;

    let company_scope = match query.company_id {
        Some(company_id) => {
            claims.require_company(company_id)?;
            Some(company_id)
        }
        None => claims.company_scope(),
    };

    let forecast = state
        .services
        .availability
        .forecast(id, company_scope, query.days.unwrap_or(365))
        .await?;
    Ok(Json(forecast))
}
