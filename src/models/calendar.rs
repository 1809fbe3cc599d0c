//! Per-day asset calendar and derived availability types
//!
//! `asset_calendar` holds one row per asset per day within the maintained
//! horizon, written by an external aggregation. This service only reads it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Day status slug (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Available,
    Booked,
    Maintenance,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Available => "available",
            DayStatus::Booked => "booked",
            DayStatus::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DayStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(DayStatus::Available),
            "booked" => Ok(DayStatus::Booked),
            "maintenance" => Ok(DayStatus::Maintenance),
            _ => Err(format!("Invalid day status: {}", s)),
        }
    }
}

// SQLx conversion for DayStatus
impl sqlx::Type<Postgres> for DayStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for DayStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for DayStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// One calendar day for one asset
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CalendarDay {
    pub asset_id: Uuid,
    pub day: NaiveDate,
    pub status: DayStatus,
    pub booking_id: Option<Uuid>,
    pub client_name: Option<String>,
}

/// Maximal run of consecutive available days; derived, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
}
