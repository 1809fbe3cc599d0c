//! Rate limit record model
//!
//! One row per `{namespace}:{caller}` key. Created on first request from a
//! caller, mutated on every subsequent one, never deleted by the limiter
//! itself (an operator sweep on `last_request` is expected in production).

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

/// Persisted limiter state for one key
#[derive(Debug, Clone, FromRow)]
pub struct RateLimitRecord {
    pub key: String,
    /// Request instants within the current window, oldest first
    pub timestamps: Json<Vec<DateTime<Utc>>>,
    pub blocked_until: Option<DateTime<Utc>>,
    pub last_request: DateTime<Utc>,
}
