//! Business-day calendar seam.
//!
//! Leave-day totals exclude weekends and holidays for categories counted in
//! business days. Which dates are holidays is deployment-specific, so the
//! calendar is injected.

use chrono::{Datelike, NaiveDate, Weekday};

/// Supplies holiday information for business-day arithmetic.
pub trait HolidayCalendar: Send + Sync + 'static {
    /// Return whether the given date is a public holiday.
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Calendar with no holidays; only weekends are non-working days.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl HolidayCalendar for WeekendCalendar {
    fn is_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// Count business days in the inclusive range `[start, end]`.
///
/// A business day is any weekday that the calendar does not mark as a
/// holiday. Returns 0 for reversed ranges.
pub fn business_days_between(
    start: NaiveDate,
    end: NaiveDate,
    calendar: &dyn HolidayCalendar,
) -> i32 {
    if start > end {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !is_weekend(*d) && !calendar.is_holiday(*d))
        .count() as i32
}

/// Count calendar days in the inclusive range `[start, end]`.
pub fn calendar_days_between(start: NaiveDate, end: NaiveDate) -> i32 {
    if start > end {
        return 0;
    }
    (end - start).num_days() as i32 + 1
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
