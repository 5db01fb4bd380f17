//! Recurring calendar periods and the elapsed/summed interval counters.
//!
//! A *period reference* is a numeric timeline whose breakpoints are the
//! period boundaries and whose values count the periods; the shift and
//! period-end machinery in [`crate::algebra`] and the counters here all
//! key off those breakpoints.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::algebra::shifted;
use crate::state::preceding_state;
use crate::time::{date, Interval};
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TBool, TNumber, Temporal};

/// The boundary instants of every period between `from` and `to`.
///
/// # Panics
///
/// Panics when `from` is not strictly between Dawn and `to`.
fn boundaries(interval: Interval, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    assert!(
        crate::time::dawn() < from && from <= to,
        "period window must lie after Dawn and run forward"
    );
    let mut out = Vec::new();
    let mut cursor = from;
    while cursor <= to {
        out.push(cursor);
        cursor = interval.step(cursor);
    }
    out
}

/// A period reference: zero before `from`, then the running period
/// number, incremented at every boundary up to `to`.
#[must_use]
pub fn periods(interval: Interval, from: DateTime<Utc>, to: DateTime<Utc>) -> TNumber {
    let mut out = Timeline::eternal(EpistemicValue::known(Decimal::ZERO));
    for (i, b) in boundaries(interval, from, to).iter().enumerate() {
        out.set(*b, EpistemicValue::known(Decimal::from(i + 1)));
    }
    TNumber::from_timeline(out.lean())
}

/// Whole intervals elapsed since `from`: zero through the first
/// boundary after `from`, then counting up.
#[must_use]
pub fn intervals_since(interval: Interval, from: DateTime<Utc>, to: DateTime<Utc>) -> TNumber {
    let mut out = Timeline::eternal(EpistemicValue::known(Decimal::ZERO));
    for (i, b) in boundaries(interval, from, to).iter().enumerate().skip(1) {
        out.set(*b, EpistemicValue::known(Decimal::from(i)));
    }
    TNumber::from_timeline(out.lean())
}

/// Whole intervals remaining until `to`: counting down to zero at the
/// last boundary.
#[must_use]
pub fn intervals_until(interval: Interval, from: DateTime<Utc>, to: DateTime<Utc>) -> TNumber {
    let bounds = boundaries(interval, from, to);
    let total = bounds.len() - 1;
    let mut out = Timeline::eternal(EpistemicValue::known(Decimal::from(total)));
    for (i, b) in bounds.iter().enumerate().skip(1) {
        out.set(*b, EpistemicValue::known(Decimal::from(total - i)));
    }
    TNumber::from_timeline(out.lean())
}

/// A numeric timeline cycling `1..=cycle` across consecutive periods,
/// starting the first cycle at `from`.
///
/// # Panics
///
/// Panics when `cycle` is zero.
#[must_use]
pub fn recurrence(
    interval: Interval,
    cycle: usize,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> TNumber {
    assert!(cycle > 0, "a recurrence needs at least one period per cycle");
    let mut out = Timeline::eternal(EpistemicValue::known(Decimal::ONE));
    for (i, b) in boundaries(interval, from, to).iter().enumerate() {
        out.set(*b, EpistemicValue::known(Decimal::from(i % cycle + 1)));
    }
    TNumber::from_timeline(out.lean())
}

/// The standard calendar-year period, spanning 1900 through 2100.
#[must_use]
pub fn the_year() -> TNumber {
    periods(Interval::Year, date(1900, 1, 1), date(2100, 1, 1))
}

/// The standard calendar-quarter period, spanning 1900 through 2100.
#[must_use]
pub fn the_quarter() -> TNumber {
    periods(Interval::Quarter, date(1900, 1, 1), date(2100, 1, 1))
}

/// The standard calendar-month period, spanning 1900 through 2100.
#[must_use]
pub fn the_month() -> TNumber {
    periods(Interval::Month, date(1900, 1, 1), date(2100, 1, 1))
}

/// A weekly period over an explicit window; weeks carry no global
/// anchor, so the window is the caller's.
#[must_use]
pub fn calendar_weeks(from: DateTime<Utc>, to: DateTime<Utc>) -> TNumber {
    periods(Interval::Week, from, to)
}

/// A daily period over an explicit window.
#[must_use]
pub fn calendar_days(from: DateTime<Utc>, to: DateTime<Utc>) -> TNumber {
    periods(Interval::Day, from, to)
}

/// The dominating unknown state across an input and its period
/// reference, or `Known` when neither is ever unknown.
fn guard_state<T: Temporal>(input: &T, period: &TNumber) -> crate::state::Knowledge {
    preceding_state([input.state_if_unknown(), period.state_if_unknown()])
}

fn number_at(t: &Timeline, at: DateTime<Utc>) -> Decimal {
    match t.value_as_of(at).payload().and_then(Value::as_number) {
        Some(n) => n,
        None => panic!("non-numeric payload sampled from a rate timeline"),
    }
}

impl TBool {
    /// The running count of whole periods during which this boolean
    /// held true, sampled at each period's start and credited at its
    /// end.
    ///
    /// An ever-unknown input or period collapses the result to the
    /// dominating unknown state for all of time.
    #[must_use]
    pub fn running_elapsed_intervals(&self, period: &TNumber) -> TNumber {
        let state = guard_state(self, period);
        if state.is_unknown() {
            return TNumber::eternal_state(state);
        }
        let bounds: Vec<DateTime<Utc>> = period.timeline().keys().copied().collect();
        let mut out = Timeline::eternal(EpistemicValue::known(Decimal::ZERO));
        let mut count = Decimal::ZERO;
        for pair in bounds.windows(2) {
            if self.timeline().value_as_of(pair[0]).payload() == Some(&Value::Bool(true)) {
                count += Decimal::ONE;
            }
            out.set(pair[1], EpistemicValue::known(count));
        }
        TNumber::from_timeline(out.lean())
    }

    /// The count of true periods among the last `window` periods,
    /// derived as the running count minus itself shifted by `window`.
    ///
    /// # Panics
    ///
    /// Panics when `window` exceeds `i32::MAX` periods.
    #[must_use]
    pub fn sliding_elapsed_intervals(&self, window: usize, period: &TNumber) -> TNumber {
        let running = self.running_elapsed_intervals(period);
        if running.is_ever_unknown() {
            return running;
        }
        let offset = i32::try_from(window)
            .unwrap_or_else(|_| panic!("sliding window of {window} periods is out of range"));
        running.minus(&shifted(&running, offset, period))
    }
}

impl TNumber {
    /// The running total of a per-period rate: each period's rate is
    /// sampled at the period's start and added to the total at its end.
    ///
    /// An ever-unknown rate or period collapses the result to the
    /// dominating unknown state for all of time.
    #[must_use]
    pub fn running_summed_intervals(&self, period: &TNumber) -> Self {
        let state = guard_state(self, period);
        if state.is_unknown() {
            return Self::eternal_state(state);
        }
        let bounds: Vec<DateTime<Utc>> = period.timeline().keys().copied().collect();
        let mut out = Timeline::eternal(EpistemicValue::known(Decimal::ZERO));
        let mut total = Decimal::ZERO;
        for pair in bounds.windows(2) {
            total += number_at(self.timeline(), pair[0]);
            out.set(pair[1], EpistemicValue::known(total));
        }
        Self::from_timeline(out.lean())
    }

    /// The total of a per-period rate over the last `window` periods,
    /// maintained incrementally: each step adds the newly-entered
    /// period and subtracts the one that fell out of the window.
    ///
    /// # Panics
    ///
    /// Panics when `window` is zero.
    #[must_use]
    pub fn sliding_summed_intervals(&self, window: usize, period: &TNumber) -> Self {
        assert!(window > 0, "sliding window must cover at least one period");
        let state = guard_state(self, period);
        if state.is_unknown() {
            return Self::eternal_state(state);
        }
        let bounds: Vec<DateTime<Utc>> = period.timeline().keys().copied().collect();
        let mut out = Timeline::eternal(EpistemicValue::known(Decimal::ZERO));
        let mut recent: VecDeque<Decimal> = VecDeque::with_capacity(window + 1);
        let mut total = Decimal::ZERO;
        for pair in bounds.windows(2) {
            let rate = number_at(self.timeline(), pair[0]);
            total += rate;
            recent.push_back(rate);
            if recent.len() > window {
                if let Some(expired) = recent.pop_front() {
                    total -= expired;
                }
            }
            out.set(pair[1], EpistemicValue::known(total));
        }
        Self::from_timeline(out.lean())
    }
}
