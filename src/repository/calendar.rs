//! Asset calendar repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::calendar::CalendarDay};

#[derive(Clone)]
pub struct CalendarRepository {
    pool: Pool<Postgres>,
}

impl CalendarRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Calendar rows for one asset within [from, to], ordered by day ascending.
    /// The window fold downstream relies on this ordering.
    pub async fn days_for_asset(
        &self,
        asset_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<CalendarDay>> {
        let rows = sqlx::query_as::<_, CalendarDay>(
            r#"
            SELECT * FROM asset_calendar
            WHERE asset_id = $1 AND day >= $2 AND day <= $3
            ORDER BY day
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
