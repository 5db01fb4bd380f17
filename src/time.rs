//! Calendar anchors and interval stepping.
//!
//! Timelines are anchored at a fixed epoch minimum (`dawn`) and run
//! through a fixed epoch maximum (`end_of_time`). The `Interval` enum
//! provides the calendar-aware stepping the recurring-period family is
//! built on.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// The epoch minimum. Every timeline's first breakpoint is `dawn()`.
#[must_use]
pub fn dawn() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1800, 1, 1, 0, 0, 0).unwrap()
}

/// The epoch maximum. A timeline's last value holds through this instant.
#[must_use]
pub fn end_of_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2400, 12, 31, 0, 0, 0).unwrap()
}

/// Convenience constructor for a date at UTC midnight.
///
/// # Panics
///
/// Panics on an invalid calendar date; rule code passes literals.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid calendar date: {year:04}-{month:02}-{day:02}"))
}

/// A calendar period length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    /// One calendar day.
    Day,
    /// Seven days.
    Week,
    /// One calendar month.
    Month,
    /// Three calendar months.
    Quarter,
    /// One calendar year.
    Year,
}

impl Interval {
    /// Steps `t` forward by one period, calendar-aware.
    ///
    /// Month-grained steps clamp the day-of-month when the target month
    /// is shorter (Jan 31 + 1 month = Feb 28/29).
    #[must_use]
    pub fn step(self, t: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => t + Duration::days(1),
            Self::Week => t + Duration::days(7),
            Self::Month => add_months(t, 1),
            Self::Quarter => add_months(t, 3),
            Self::Year => add_years(t, 1),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        };
        write!(f, "{name}")
    }
}

/// Adds whole calendar months, clamping the day-of-month.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn add_months(t: DateTime<Utc>, months: i32) -> DateTime<Utc> {
    let total = t.year() * 12 + t.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = t.day().min(days_in_month(year, month));
    Utc.with_ymd_and_hms(year, month, day, t.hour(), t.minute(), t.second())
        .single()
        .unwrap_or_else(|| panic!("month arithmetic produced an invalid date"))
}

/// Adds whole calendar years, clamping Feb 29 to Feb 28 off leap years.
#[must_use]
pub fn add_years(t: DateTime<Utc>, years: i32) -> DateTime<Utc> {
    let year = t.year() + years;
    let day = t.day().min(days_in_month(year, t.month()));
    Utc.with_ymd_and_hms(year, t.month(), day, t.hour(), t.minute(), t.second())
        .single()
        .unwrap_or_else(|| panic!("year arithmetic produced an invalid date"))
}

/// Number of days in the given month.
///
/// # Panics
///
/// Panics if `month` is outside 1-12.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => panic!("invalid month: {month}"),
    }
}

/// Gregorian leap-year test.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// The calendar quarter (1-4) containing the given instant.
#[must_use]
pub fn quarter_of(t: DateTime<Utc>) -> u32 {
    (t.month() - 1) / 3 + 1
}
