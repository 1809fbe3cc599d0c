//! Rate limit records repository for database operations

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::rate_limit::RateLimitRecord};

#[derive(Clone)]
pub struct RateLimitsRepository {
    pool: Pool<Postgres>,
}

impl RateLimitsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the record for a key, if any
    pub async fn get_by_key(&self, key: &str) -> AppResult<Option<RateLimitRecord>> {
        let row = sqlx::query_as::<_, RateLimitRecord>(
            "SELECT * FROM rate_limit_records WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert or replace the record for a key
    pub async fn upsert(&self, record: &RateLimitRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rate_limit_records (key, timestamps, blocked_until, last_request)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE
            SET timestamps = EXCLUDED.timestamps,
                blocked_until = EXCLUDED.blocked_until,
                last_request = EXCLUDED.last_request
            "#,
        )
        .bind(&record.key)
        .bind(&record.timestamps)
        .bind(record.blocked_until)
        .bind(record.last_request)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
