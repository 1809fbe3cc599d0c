//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, availability, health, qr};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AdBoard API",
        version = "1.0.0",
        description = "Out-of-home advertising back office REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "AdBoard Team", email = "dev@adboard.io")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        // Availability
        availability::forecast,
        // QR codes
        qr::generate_batch,
        qr::generate_for_asset,
    ),
    components(
        schemas(
            // Assets
            crate::models::Asset,
            crate::models::AssetKind,
            crate::models::asset::AssetQuery,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            // Availability
            crate::models::Booking,
            crate::models::BookingStatus,
            crate::models::CalendarDay,
            crate::models::DayStatus,
            crate::models::AvailabilityWindow,
            availability::ForecastPeriod,
            availability::AvailabilityStats,
            availability::ForecastResponse,
            // QR codes
            qr::QrBatchRequest,
            qr::QrBatchResult,
            qr::QrCodeResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "assets", description = "Advertising asset inventory"),
        (name = "availability", description = "Availability forecasting"),
        (name = "qr-codes", description = "QR code generation")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
