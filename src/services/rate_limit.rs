//! Fixed-window rate limiter over persisted per-key records
//!
//! Sliding-window-by-recount: every check refetches the key's record and
//! refilters its timestamp list against the current time. The list is
//! bounded above by `max_requests` because reaching the cap clears it and
//! sets a block. The read-modify-write is deliberately unlocked; two
//! same-instant requests can both observe "allowed", and that imprecision
//! is accepted rather than serialized away.
//!
//! Store failures never deny a request: the check degrades to
//! allowed-at-full-quota and the error is logged. Records are never
//! deleted here; production deployments are expected to sweep
//! `rate_limit_records` on `last_request` out of band.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
#[cfg(test)]
use mockall::automock;
use sqlx::types::Json;

use crate::{
    config::RateLimitConfig, error::AppResult, models::rate_limit::RateLimitRecord,
    repository::rate_limits::RateLimitsRepository,
};

/// Persistence seam for limiter records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn fetch(&self, key: &str) -> AppResult<Option<RateLimitRecord>>;
    async fn save(&self, record: &RateLimitRecord) -> AppResult<()>;
}

#[async_trait]
impl RateLimitStore for RateLimitsRepository {
    async fn fetch(&self, key: &str) -> AppResult<Option<RateLimitRecord>> {
        self.get_by_key(key).await
    }

    async fn save(&self, record: &RateLimitRecord) -> AppResult<()> {
        self.upsert(record).await
    }
}

/// Outcome of one limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// When the window or block expires
    pub reset_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
}

impl RateLimitService {
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Check and account one request for `{namespace}:{caller}`.
    /// Store failures are downgraded to allowed-at-full-quota.
    pub async fn check(&self, namespace: &str, caller: &str) -> RateLimitDecision {
        let key = format!("{}:{}", namespace, caller);
        match self.check_key(&key).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "rate limit store unavailable, failing open");
                RateLimitDecision {
                    allowed: true,
                    limit: self.config.max_requests,
                    remaining: self.config.max_requests,
                    reset_at: Utc::now() + Duration::seconds(self.config.window_seconds),
                }
            }
        }
    }

    async fn check_key(&self, key: &str) -> AppResult<RateLimitDecision> {
        let now = Utc::now();
        let max = self.config.max_requests;
        let window = Duration::seconds(self.config.window_seconds);

        let mut record = match self.store.fetch(key).await? {
            Some(record) => record,
            None => {
                // first request from this caller
                let record = RateLimitRecord {
                    key: key.to_string(),
                    timestamps: Json(vec![now]),
                    blocked_until: None,
                    last_request: now,
                };
                self.store.save(&record).await?;
                return Ok(RateLimitDecision {
                    allowed: true,
                    limit: max,
                    remaining: max.saturating_sub(1),
                    reset_at: now + window,
                });
            }
        };

        if let Some(blocked_until) = record.blocked_until {
            if now < blocked_until {
                return Ok(RateLimitDecision {
                    allowed: false,
                    limit: max,
                    remaining: 0,
                    reset_at: blocked_until,
                });
            }
            // expired block: fall back into normal accounting
        }

        let window_start = now - window;
        let mut timestamps: Vec<DateTime<Utc>> = record
            .timestamps
            .0
            .iter()
            .copied()
            .filter(|t| *t >= window_start && *t <= now)
            .collect();

        if (timestamps.len() as u32) < max {
            timestamps.push(now);
            let count = timestamps.len() as u32;
            // the window resets when the oldest counted request ages out
            let reset_at = timestamps.first().copied().unwrap_or(now) + window;
            record.timestamps = Json(timestamps);
            record.blocked_until = None;
            record.last_request = now;
            self.store.save(&record).await?;
            Ok(RateLimitDecision {
                allowed: true,
                limit: max,
                remaining: max - count,
                reset_at,
            })
        } else {
            let blocked_until = now + Duration::seconds(self.config.block_seconds);
            record.timestamps = Json(Vec::new());
            record.blocked_until = Some(blocked_until);
            record.last_request = now;
            self.store.save(&record).await?;
            Ok(RateLimitDecision {
                allowed: false,
                limit: max,
                remaining: 0,
                reset_at: blocked_until,
            })
        }
    }
}
