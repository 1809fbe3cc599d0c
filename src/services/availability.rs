//! Availability forecasting service
//!
//! Derives contiguous available-date windows and occupancy statistics from
//! the per-day asset calendar. The calendar is maintained densely (one row
//! per day within the horizon) by an external aggregation, so the fold
//! below is purely status-driven.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    api::availability::{AvailabilityStats, ForecastPeriod, ForecastResponse},
    error::{AppError, AppResult},
    models::calendar::{AvailabilityWindow, CalendarDay, DayStatus},
    repository::Repository,
};

/// Longest forecast horizon a caller may request, in days
pub const MAX_HORIZON_DAYS: i64 = 730;

/// Fold calendar rows (ordered by day ascending) into maximal runs of
/// available days. One linear pass: open or extend a window on an
/// available day, close it on anything else, flush at the end.
pub fn availability_windows(days: &[CalendarDay]) -> Vec<AvailabilityWindow> {
    let mut windows = Vec::new();
    let mut current: Option<AvailabilityWindow> = None;

    for day in days {
        if day.status == DayStatus::Available {
            match current.as_mut() {
                Some(window) => {
                    window.end_date = day.day;
                    window.days += 1;
                }
                None => {
                    current = Some(AvailabilityWindow {
                        start_date: day.day,
                        end_date: day.day,
                        days: 1,
                    });
                }
            }
        } else if let Some(window) = current.take() {
            windows.push(window);
        }
    }
    if let Some(window) = current.take() {
        windows.push(window);
    }
    windows
}

/// Occupancy statistics over one horizon. Ties for the longest window go
/// to the earliest one.
pub fn occupancy_stats(days: &[CalendarDay], windows: &[AvailabilityWindow]) -> AvailabilityStats {
    let total_days = days.len() as i64;
    let booked_days = days
        .iter()
        .filter(|d| d.status == DayStatus::Booked)
        .count() as i64;
    let available_days = days
        .iter()
        .filter(|d| d.status == DayStatus::Available)
        .count() as i64;

    let occupancy_rate = if total_days == 0 {
        0.0
    } else {
        booked_days as f64 / total_days as f64
    };

    let mut longest: Option<&AvailabilityWindow> = None;
    for window in windows {
        if longest.map_or(true, |best| window.days > best.days) {
            longest = Some(window);
        }
    }

    AvailabilityStats {
        total_days,
        booked_days,
        available_days,
        occupancy_rate,
        next_available_date: windows.first().map(|w| w.start_date),
        longest_available_window: longest.cloned(),
    }
}

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Forecast availability for one asset over `[today, today + days - 1]`
    pub async fn forecast(
        &self,
        asset_id: Uuid,
        company_scope: Option<Uuid>,
        days: i64,
    ) -> AppResult<ForecastResponse> {
        if days < 1 || days > MAX_HORIZON_DAYS {
            return Err(AppError::Validation(format!(
                "days must be between 1 and {}",
                MAX_HORIZON_DAYS
            )));
        }

        let asset = self.repository.assets.get_by_id(asset_id).await?;
        if let Some(company_id) = company_scope {
            if asset.company_id != company_id {
                return Err(AppError::Authorization(
                    "Asset does not belong to company".to_string(),
                ));
            }
        }

        let start = Utc::now().date_naive();
        let end = start + Duration::days(days - 1);

        let bookings = self
            .repository
            .bookings
            .list_for_asset_in_range(asset_id, start, end)
            .await?;
        let heatmap = self
            .repository
            .calendar
            .days_for_asset(asset_id, start, end)
            .await?;

        let windows = availability_windows(&heatmap);
        let statistics = occupancy_stats(&heatmap, &windows);

        Ok(ForecastResponse {
            asset_id,
            period: ForecastPeriod { start, end, days },
            bookings,
            heatmap,
            windows,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(date: &str, status: DayStatus) -> CalendarDay {
        CalendarDay {
            asset_id: Uuid::nil(),
            day: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            status,
            booking_id: None,
            client_name: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_horizon_has_no_windows_and_zero_occupancy() {
        let days: Vec<CalendarDay> = Vec::new();
        let windows = availability_windows(&days);
        let stats = occupancy_stats(&days, &windows);

        assert!(windows.is_empty());
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.occupancy_rate, 0.0);
        assert_eq!(stats.next_available_date, None);
        assert!(stats.longest_available_window.is_none());
    }

    #[test]
    fn test_all_available_yields_single_spanning_window() {
        let days = vec![
            day("2026-09-01", DayStatus::Available),
            day("2026-09-02", DayStatus::Available),
            day("2026-09-03", DayStatus::Available),
            day("2026-09-04", DayStatus::Available),
            day("2026-09-05", DayStatus::Available),
        ];
        let windows = availability_windows(&days);
        let stats = occupancy_stats(&days, &windows);

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_date, date("2026-09-01"));
        assert_eq!(windows[0].end_date, date("2026-09-05"));
        assert_eq!(windows[0].days, 5);
        assert_eq!(stats.occupancy_rate, 0.0);
        assert_eq!(stats.available_days, 5);
        assert_eq!(stats.next_available_date, Some(date("2026-09-01")));
    }

    #[test]
    fn test_all_booked_yields_no_windows_and_full_occupancy() {
        let days = vec![
            day("2026-09-01", DayStatus::Booked),
            day("2026-09-02", DayStatus::Booked),
            day("2026-09-03", DayStatus::Booked),
        ];
        let windows = availability_windows(&days);
        let stats = occupancy_stats(&days, &windows);

        assert!(windows.is_empty());
        assert_eq!(stats.occupancy_rate, 1.0);
        assert_eq!(stats.booked_days, 3);
        assert_eq!(stats.next_available_date, None);
        assert!(stats.longest_available_window.is_none());
    }

    #[test]
    fn test_mixed_heatmap_splits_windows_in_order() {
        // A A B A
        let days = vec![
            day("2026-09-01", DayStatus::Available),
            day("2026-09-02", DayStatus::Available),
            day("2026-09-03", DayStatus::Booked),
            day("2026-09-04", DayStatus::Available),
        ];
        let windows = availability_windows(&days);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].days, 2);
        assert_eq!(windows[0].start_date, date("2026-09-01"));
        assert_eq!(windows[0].end_date, date("2026-09-02"));
        assert_eq!(windows[1].days, 1);
        assert_eq!(windows[1].start_date, date("2026-09-04"));
    }

    #[test]
    fn test_trailing_window_is_flushed() {
        let days = vec![
            day("2026-09-01", DayStatus::Booked),
            day("2026-09-02", DayStatus::Available),
            day("2026-09-03", DayStatus::Available),
        ];
        let windows = availability_windows(&days);

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_date, date("2026-09-02"));
        assert_eq!(windows[0].days, 2);
    }

    #[test]
    fn test_maintenance_closes_window_without_counting_as_booked() {
        // A M A
        let days = vec![
            day("2026-09-01", DayStatus::Available),
            day("2026-09-02", DayStatus::Maintenance),
            day("2026-09-03", DayStatus::Available),
        ];
        let windows = availability_windows(&days);
        let stats = occupancy_stats(&days, &windows);

        assert_eq!(windows.len(), 2);
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.booked_days, 0);
        assert_eq!(stats.available_days, 2);
        assert_eq!(stats.occupancy_rate, 0.0);
    }

    #[test]
    fn test_longest_window_tie_goes_to_earliest() {
        // A A B A A: two windows of 2 days, the first one must win
        let days = vec![
            day("2026-09-01", DayStatus::Available),
            day("2026-09-02", DayStatus::Available),
            day("2026-09-03", DayStatus::Booked),
            day("2026-09-04", DayStatus::Available),
            day("2026-09-05", DayStatus::Available),
        ];
        let windows = availability_windows(&days);
        let stats = occupancy_stats(&days, &windows);

        let longest = stats.longest_available_window.unwrap();
        assert_eq!(longest.days, 2);
        assert_eq!(longest.start_date, date("2026-09-01"));
    }

    #[test]
    fn test_longest_window_prefers_strictly_longer_run() {
        // A B A A A B A
        let days = vec![
            day("2026-09-01", DayStatus::Available),
            day("2026-09-02", DayStatus::Booked),
            day("2026-09-03", DayStatus::Available),
            day("2026-09-04", DayStatus::Available),
            day("2026-09-05", DayStatus::Available),
            day("2026-09-06", DayStatus::Booked),
            day("2026-09-07", DayStatus::Available),
        ];
        let windows = availability_windows(&days);
        let stats = occupancy_stats(&days, &windows);

        assert_eq!(windows.len(), 3);
        let longest = stats.longest_available_window.unwrap();
        assert_eq!(longest.start_date, date("2026-09-03"));
        assert_eq!(longest.days, 3);
        assert_eq!(stats.next_available_date, Some(date("2026-09-01")));
    }

    #[test]
    fn test_occupancy_counts_only_booked_days() {
        // B B M A
        let days = vec![
            day("2026-09-01", DayStatus::Booked),
            day("2026-09-02", DayStatus::Booked),
            day("2026-09-03", DayStatus::Maintenance),
            day("2026-09-04", DayStatus::Available),
        ];
        let windows = availability_windows(&days);
        let stats = occupancy_stats(&days, &windows);

        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.booked_days, 2);
        assert_eq!(stats.occupancy_rate, 0.5);
    }
}
