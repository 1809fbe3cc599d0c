//! Bookings repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::booking::Booking};

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Non-cancelled bookings overlapping [from, to] for one asset,
    /// ordered by start date
    pub async fn list_for_asset_in_range(
        &self,
        asset_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE asset_id = $1
              AND start_date <= $3
              AND end_date >= $2
              AND status != 'cancelled'
            ORDER BY start_date
            "#,
        )
        .bind(asset_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
