//! Advertising asset model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Asset kind slug (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Billboard,
    Shelter,
    Transit,
    Digital,
    Other,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Billboard => "billboard",
            AssetKind::Shelter => "shelter",
            AssetKind::Transit => "transit",
            AssetKind::Digital => "digital",
            AssetKind::Other => "other",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "billboard" => Ok(AssetKind::Billboard),
            "shelter" => Ok(AssetKind::Shelter),
            "transit" => Ok(AssetKind::Transit),
            "digital" => Ok(AssetKind::Digital),
            "other" => Ok(AssetKind::Other),
            _ => Err(format!("Invalid asset kind: {}", s)),
        }
    }
}

impl From<String> for AssetKind {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(AssetKind::Other)
    }
}

impl From<AssetKind> for String {
    fn from(kind: AssetKind) -> Self {
        kind.as_str().to_string()
    }
}

// SQLx conversion for AssetKind
impl sqlx::Type<Postgres> for AssetKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AssetKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AssetKind {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Advertising asset (billboard face, shelter panel, digital screen...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: Uuid,
    /// Owning tenant
    pub company_id: Uuid,
    /// Operator reference code (e.g. "PAN-0042")
    pub code: String,
    pub name: String,
    pub kind: AssetKind,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Street-view style link for the exact face
    pub street_view_url: Option<String>,
    /// Generic location link (operator-provided)
    pub location_url: Option<String>,
    /// Public URL of the generated QR image; written by the QR generator
    pub qr_code_url: Option<String>,
    pub qr_generated_at: Option<DateTime<Utc>>,
    pub monthly_rate: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Asset query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    /// Tenant override, admins only; defaults to the caller's company
    pub company_id: Option<Uuid>,
    /// Filter by name or code substring
    pub search: Option<String>,
    pub city: Option<String>,
    pub kind: Option<AssetKind>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    /// Tenant; defaults to the caller's company
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Code must not be empty"))]
    pub code: String,
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub kind: Option<AssetKind>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: Option<f64>,
    #[validate(url(message = "Invalid street view URL"))]
    pub street_view_url: Option<String>,
    #[validate(url(message = "Invalid location URL"))]
    pub location_url: Option<String>,
    pub monthly_rate: Option<Decimal>,
}

/// Update asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAsset {
    pub code: Option<String>,
    pub name: Option<String>,
    pub kind: Option<AssetKind>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: Option<f64>,
    #[validate(url(message = "Invalid street view URL"))]
    pub street_view_url: Option<String>,
    #[validate(url(message = "Invalid location URL"))]
    pub location_url: Option<String>,
    pub monthly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}
