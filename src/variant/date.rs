//! The date timeline variant.
//!
//! Calendar decomposition and signed date differences. Year differences
//! count off whole calendar years recursively so leap-year alignment is
//! compensated, with partial years carried to three decimals.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::algebra::map2;
use crate::state::preceding_state;
use crate::time::{add_years, quarter_of};
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TBool, TNumber, TValue, Temporal};

/// A date-valued timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TDate {
    timeline: Timeline,
}

fn datum(v: &EpistemicValue) -> Option<DateTime<Utc>> {
    v.payload().and_then(Value::as_date)
}

impl TDate {
    /// A date constant for all of time.
    #[must_use]
    pub fn constant(value: DateTime<Utc>) -> Self {
        Self {
            timeline: Timeline::eternal(EpistemicValue::known(value)),
        }
    }

    /// The calendar year of each known date.
    #[must_use]
    pub fn year(&self) -> TNumber {
        self.decompose(|d| i64::from(d.year()))
    }

    /// The calendar quarter (1-4) of each known date.
    #[must_use]
    pub fn quarter(&self) -> TNumber {
        self.decompose(|d| i64::from(quarter_of(d)))
    }

    /// The calendar month (1-12) of each known date.
    #[must_use]
    pub fn month(&self) -> TNumber {
        self.decompose(|d| i64::from(d.month()))
    }

    /// The day-of-month of each known date.
    #[must_use]
    pub fn day(&self) -> TNumber {
        self.decompose(|d| i64::from(d.day()))
    }

    fn decompose(&self, f: impl Fn(DateTime<Utc>) -> i64) -> TNumber {
        let mut out: Option<Timeline> = None;
        for (at, v) in self.timeline.iter() {
            let mapped = match datum(v) {
                Some(d) => EpistemicValue::known(Decimal::from(f(d))),
                None => EpistemicValue::of_state(v.state()),
            };
            match &mut out {
                None => out = Some(Timeline::eternal(mapped)),
                Some(t) => t.set(*at, mapped),
            }
        }
        TNumber::from_timeline(
            out.unwrap_or_else(|| panic!("date timeline with no entries"))
                .lean(),
        )
    }

    /// Signed difference in whole days, `other - self`.
    #[must_use]
    pub fn days_until(&self, other: &Self) -> TNumber {
        self.diff(other, |a, b| Decimal::from((b - a).num_days()))
    }

    /// Signed difference in weeks, `other - self`, to three decimals.
    #[must_use]
    pub fn weeks_until(&self, other: &Self) -> TNumber {
        self.diff(other, |a, b| {
            (Decimal::from((b - a).num_days()) / Decimal::from(7)).round_dp(3)
        })
    }

    /// Signed difference in years, `other - self`.
    ///
    /// Whole calendar years are counted off one at a time so the result
    /// is exact across leap years; the remaining partial year is the
    /// day fraction of the final year, to three decimals.
    #[must_use]
    pub fn years_until(&self, other: &Self) -> TNumber {
        self.diff(other, |a, b| year_difference(a, b))
    }

    fn diff(
        &self,
        other: &Self,
        f: impl Fn(DateTime<Utc>, DateTime<Utc>) -> Decimal,
    ) -> TNumber {
        TNumber::from_timeline(map2(&self.timeline, &other.timeline, |a, b| {
            match (datum(a), datum(b)) {
                (Some(x), Some(y)) => EpistemicValue::known(f(x, y)),
                _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
            }
        }))
    }

    fn compare(&self, other: &Self, f: impl Fn(DateTime<Utc>, DateTime<Utc>) -> bool) -> TBool {
        TBool::from_timeline(map2(&self.timeline, &other.timeline, |a, b| {
            match (datum(a), datum(b)) {
                (Some(x), Some(y)) => EpistemicValue::known(f(x, y)),
                _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
            }
        }))
    }

    /// Pointwise `>`.
    #[must_use]
    pub fn gt(&self, other: &Self) -> TBool {
        self.compare(other, |a, b| a > b)
    }

    /// Pointwise `>=`.
    #[must_use]
    pub fn ge(&self, other: &Self) -> TBool {
        self.compare(other, |a, b| a >= b)
    }

    /// Pointwise `<`.
    #[must_use]
    pub fn lt(&self, other: &Self) -> TBool {
        self.compare(other, |a, b| a < b)
    }

    /// Pointwise `<=`.
    #[must_use]
    pub fn le(&self, other: &Self) -> TBool {
        self.compare(other, |a, b| a <= b)
    }

    /// Pointwise equality.
    #[must_use]
    pub fn equals(&self, other: &Self) -> TBool {
        self.compare(other, |a, b| a == b)
    }
}

/// Recursive signed year difference; see [`TDate::years_until`].
fn year_difference(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    if from > to {
        return -year_difference(to, from);
    }
    let mut whole = 0i64;
    let mut cursor = from;
    loop {
        let next = add_years(cursor, 1);
        if next > to {
            let year_days = (next - cursor).num_days();
            let part = Decimal::from((to - cursor).num_days()) / Decimal::from(year_days);
            return (Decimal::from(whole) + part).round_dp(3);
        }
        whole += 1;
        cursor = next;
    }
}

impl Temporal for TDate {
    fn from_timeline(timeline: Timeline) -> Self {
        Self { timeline }
    }

    fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    fn into_timeline(self) -> Timeline {
        self.timeline
    }

    fn from_stored(value: &TValue) -> Option<Self> {
        match value {
            TValue::Date(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_stored(self) -> TValue {
        TValue::Date(self)
    }

    fn kind() -> &'static str {
        "date"
    }
}
