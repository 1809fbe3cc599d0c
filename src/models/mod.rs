//! Data models for AdBoard

pub mod asset;
pub mod auth;
pub mod booking;
pub mod calendar;
pub mod rate_limit;

// Re-export commonly used types
pub use asset::{Asset, AssetKind};
pub use auth::{Claims, Role};
pub use booking::{Booking, BookingStatus};
pub use calendar::{AvailabilityWindow, CalendarDay, DayStatus};
pub use rate_limit::RateLimitRecord;
