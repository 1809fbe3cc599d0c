//! Repository layer for database operations

pub mod assets;
pub mod bookings;
pub mod calendar;
pub mod rate_limits;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub assets: assets::AssetsRepository,
    pub bookings: bookings::BookingsRepository,
    pub calendar: calendar::CalendarRepository,
    pub rate_limits: rate_limits::RateLimitsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            assets: assets::AssetsRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            calendar: calendar::CalendarRepository::new(pool.clone()),
            rate_limits: rate_limits::RateLimitsRepository::new(pool.clone()),
            pool,
        }
    }
}
