//! The generic timeline algebra engine.
//!
//! Everything the typed variants share lives here: the multi-timeline
//! breakpoint merge, the multi-way conditional ("Switch") evaluator,
//! time-shifting against a reference period, and period-end resampling.
//! All results are compacted before being returned.

use chrono::{DateTime, Duration, Utc};

use crate::time::end_of_time;
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TBool, TNumber, Temporal};

/// The sorted union of every input's breakpoints.
pub(crate) fn breakpoint_union(inputs: &[&Timeline]) -> Vec<DateTime<Utc>> {
    let mut keys: Vec<DateTime<Utc>> = inputs
        .iter()
        .flat_map(|t| t.keys().copied())
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Breakpoint merge: applies `f` to one row of input values per merged
/// breakpoint, each input read as-of that breakpoint. The result is
/// compacted.
pub(crate) fn map_rows<F>(inputs: &[&Timeline], mut f: F) -> Timeline
where
    F: FnMut(&[EpistemicValue]) -> EpistemicValue,
{
    let keys = breakpoint_union(inputs);
    let mut row = Vec::with_capacity(inputs.len());
    let mut out: Option<Timeline> = None;
    for at in keys {
        row.clear();
        row.extend(inputs.iter().map(|t| t.value_as_of(at).clone()));
        let value = f(&row);
        match &mut out {
            // The first merged key is always Dawn: every input starts there.
            None => out = Some(Timeline::eternal(value)),
            Some(t) => t.set(at, value),
        }
    }
    out.unwrap_or_else(|| panic!("breakpoint merge over zero timelines"))
        .lean()
}

/// Two-input convenience wrapper over [`map_rows`].
pub(crate) fn map2<F>(a: &Timeline, b: &Timeline, mut f: F) -> Timeline
where
    F: FnMut(&EpistemicValue, &EpistemicValue) -> EpistemicValue,
{
    map_rows(&[a, b], |row| f(&row[0], &row[1]))
}

/// True when `pred` holds for any merged row.
pub(crate) fn any_row<F>(inputs: &[&Timeline], pred: F) -> bool
where
    F: Fn(&[EpistemicValue]) -> bool,
{
    let keys = breakpoint_union(inputs);
    let mut row = Vec::with_capacity(inputs.len());
    keys.into_iter().any(|at| {
        row.clear();
        row.extend(inputs.iter().map(|t| t.value_as_of(at).clone()));
        pred(&row)
    })
}

/// A lazily-evaluated branch of a [`switch`].
pub struct SwitchCase<'a, T> {
    condition: Box<dyn FnOnce() -> TBool + 'a>,
    value: Box<dyn FnOnce() -> T + 'a>,
}

impl<'a, T> SwitchCase<'a, T> {
    /// Pairs a condition thunk with the value it selects.
    pub fn new<C, V>(condition: C, value: V) -> Self
    where
        C: FnOnce() -> TBool + 'a,
        V: FnOnce() -> T + 'a,
    {
        Self {
            condition: Box::new(condition),
            value: Box::new(value),
        }
    }
}

/// Multi-way conditional over timelines.
///
/// Cases are taken in order. Where a condition is unknown, its state
/// fills any still-undecided slice of the result; where it is true, the
/// case's value fills the still-undecided slices (evaluated lazily, at
/// most once per case). Evaluation stops as soon as every slice of the
/// result is decided, so later thunks are never invoked once the whole
/// timeline is covered. The mandatory `default` fills whatever remains.
///
/// # Examples
///
/// ```
/// use themis::{switch, SwitchCase, TBool, TNumber, Temporal};
/// use rust_decimal_macros::dec;
///
/// let n = switch(
///     vec![SwitchCase::new(|| TBool::always(true), || TNumber::constant(dec!(1)))],
///     || TNumber::constant(dec!(0)),
/// );
/// assert_eq!(n.to_text(), "1");
/// ```
pub fn switch<'a, T, D>(cases: Vec<SwitchCase<'a, T>>, default: D) -> T
where
    T: Temporal,
    D: FnOnce() -> T + 'a,
{
    let mut result = Timeline::eternal(EpistemicValue::null());

    for case in cases {
        if !result.has_null() {
            break;
        }
        let condition = (case.condition)();

        // Condition-unknown propagates into undecided slices, but never
        // overwrites an already-resolved one.
        result = map2(&result, condition.timeline(), |r, c| {
            if r.is_null() && c.state().is_unknown() {
                EpistemicValue::of_state(c.state())
            } else {
                r.clone()
            }
        });

        let selects = any_row(&[&result, condition.timeline()], |row| {
            row[0].is_null() && row[1].payload() == Some(&Value::Bool(true))
        });
        if selects {
            let value = (case.value)();
            result = map_rows(
                &[&result, condition.timeline(), value.timeline()],
                |row| {
                    if row[0].is_null() && row[1].payload() == Some(&Value::Bool(true)) {
                        row[2].clone()
                    } else {
                        row[0].clone()
                    }
                },
            );
        }
    }

    if result.has_null() {
        let fallback = default().into_timeline();
        result = map2(&result, &fallback, |r, d| {
            if r.is_null() {
                d.clone()
            } else {
                r.clone()
            }
        });
    }

    T::from_timeline(result.lean())
}

/// Shifts a variant by `offset` periods of a reference period timeline.
///
/// Each breakpoint's value is relocated to the period boundary `offset`
/// positions away; values whose target falls outside the reference's
/// boundaries are dropped. Payloads pass through untouched.
#[must_use]
pub fn shifted<T: Temporal>(value: &T, offset: i32, period: &TNumber) -> T {
    let boundaries: Vec<DateTime<Utc>> = period.timeline().keys().copied().collect();
    let mut out = Timeline::eternal(value.timeline().first_value().clone());

    for (at, v) in value.timeline().iter() {
        // Position of the period containing this breakpoint.
        let pos = boundaries.partition_point(|b| b <= at);
        debug_assert!(pos > 0, "period reference must start at Dawn");
        let target = pos as i64 - 1 + i64::from(offset);
        if target < 0 {
            continue;
        }
        let Some(slot) = boundaries.get(target as usize) else {
            continue;
        };
        out.set(*slot, v.clone());
    }

    T::from_timeline(out.lean())
}

/// Resamples a variant so each period holds the value observed at that
/// period's end.
///
/// The final period is open-ended and samples at the epoch maximum.
/// Payloads pass through untouched.
#[must_use]
pub fn period_end_values<T: Temporal>(value: &T, period: &TNumber) -> T {
    let boundaries: Vec<DateTime<Utc>> = period.timeline().keys().copied().collect();
    let mut out: Option<Timeline> = None;

    for (i, start) in boundaries.iter().enumerate() {
        let sample_at = match boundaries.get(i + 1) {
            Some(next) => *next - Duration::microseconds(1),
            None => end_of_time(),
        };
        let v = value.timeline().value_as_of(sample_at).clone();
        match &mut out {
            None => out = Some(Timeline::eternal(v)),
            Some(t) => t.set(*start, v),
        }
    }

    let out = out.unwrap_or_else(|| panic!("period reference has no boundaries"));
    T::from_timeline(out.lean())
}
