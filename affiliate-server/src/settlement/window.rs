//! Billing window computation
//!
//! Pure calendar logic: which half-month of earnings, if any, is settled on
//! a given business date. Boundaries are dates; conversion to Unix millis
//! happens at the edge with the business time zone.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use shared::models::AffiliateSettings;

use crate::utils::time::day_start_millis;

/// Day of month on which the second half of a month begins
const SECOND_HALF_START_DAY: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowHalf {
    /// 1st to 15th of the current month
    CurrentFirstHalf,
    /// 16th to month end of the previous month
    PreviousSecondHalf,
}

/// Half-open settlement window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub half: WindowHalf,
}

impl BillingWindow {
    pub fn start_millis(&self, tz: Tz) -> i64 {
        day_start_millis(self.start, tz)
    }

    pub fn end_millis(&self, tz: Tz) -> i64 {
        day_start_millis(self.end, tz)
    }
}

impl std::fmt::Display for BillingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Window settled on `today`, or `None` when today is not a withdrawal day
///
/// `withdrawal_day1` is checked first; a day set to 0 never fires. A day
/// past the end of the current month never matches.
pub fn compute_window(settings: &AffiliateSettings, today: NaiveDate) -> Option<BillingWindow> {
    let day = today.day();

    if settings.withdrawal_day1 > 0 && day == settings.withdrawal_day1 {
        return Some(BillingWindow {
            start: today.with_day(1)?,
            end: today.with_day(SECOND_HALF_START_DAY)?,
            half: WindowHalf::CurrentFirstHalf,
        });
    }

    if settings.withdrawal_day2 > 0 && day == settings.withdrawal_day2 {
        let month_start = today.with_day(1)?;
        let (year, month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };
        return Some(BillingWindow {
            start: NaiveDate::from_ymd_opt(year, month, SECOND_HALF_START_DAY)?,
            end: month_start,
            half: WindowHalf::PreviousSecondHalf,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings(day1: u32, day2: u32) -> AffiliateSettings {
        AffiliateSettings {
            withdrawal_day1: day1,
            withdrawal_day2: day2,
            minimum_withdrawal: Decimal::from(100),
        }
    }

    #[test]
    fn test_day1_settles_current_first_half() {
        let window = compute_window(&settings(16, 1), date(2026, 3, 16)).unwrap();
        assert_eq!(window.start, date(2026, 3, 1));
        assert_eq!(window.end, date(2026, 3, 16));
        assert_eq!(window.half, WindowHalf::CurrentFirstHalf);
    }

    #[test]
    fn test_day2_settles_previous_second_half() {
        let window = compute_window(&settings(16, 1), date(2026, 3, 1)).unwrap();
        assert_eq!(window.start, date(2026, 2, 16));
        assert_eq!(window.end, date(2026, 3, 1));
        assert_eq!(window.half, WindowHalf::PreviousSecondHalf);
    }

    #[test]
    fn test_january_rolls_back_to_december() {
        let window = compute_window(&settings(16, 1), date(2027, 1, 1)).unwrap();
        assert_eq!(window.start, date(2026, 12, 16));
        assert_eq!(window.end, date(2027, 1, 1));
    }

    #[test]
    fn test_other_days_have_no_window() {
        for day in [2, 15, 17, 28, 31] {
            assert!(compute_window(&settings(16, 1), date(2026, 3, day)).is_none());
        }
    }

    #[test]
    fn test_zero_disables_a_day() {
        assert!(compute_window(&settings(0, 1), date(2026, 3, 16)).is_none());
        assert!(compute_window(&settings(16, 0), date(2026, 3, 1)).is_none());
        assert!(compute_window(&settings(0, 0), date(2026, 3, 1)).is_none());
    }

    #[test]
    fn test_day1_wins_when_both_days_match() {
        let window = compute_window(&settings(5, 5), date(2026, 6, 5)).unwrap();
        assert_eq!(window.half, WindowHalf::CurrentFirstHalf);
        assert_eq!(window.start, date(2026, 6, 1));
    }

    #[test]
    fn test_non_default_days_keep_fixed_boundaries() {
        // Trigger day moves, window boundaries do not
        let window = compute_window(&settings(20, 3), date(2026, 8, 20)).unwrap();
        assert_eq!((window.start, window.end), (date(2026, 8, 1), date(2026, 8, 16)));

        let window = compute_window(&settings(20, 3), date(2026, 8, 3)).unwrap();
        assert_eq!((window.start, window.end), (date(2026, 7, 16), date(2026, 8, 1)));
    }

    #[test]
    fn test_day_past_month_end_never_fires_in_short_month() {
        for day in 1..=28 {
            assert!(compute_window(&settings(31, 30), date(2026, 2, day)).is_none());
        }
    }

    #[test]
    fn test_window_millis_follow_business_zone() {
        let window = compute_window(&settings(16, 1), date(2026, 3, 16)).unwrap();
        let tz = chrono_tz::Asia::Dhaka;
        assert_eq!(window.start_millis(tz), day_start_millis(date(2026, 3, 1), tz));
        assert_eq!(window.end_millis(tz) - window.start_millis(tz), 15 * shared::util::DAY_MILLIS);
        assert_eq!(window.to_string(), "[2026-03-01, 2026-03-16)");
    }
}
