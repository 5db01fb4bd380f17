//! The numeric timeline variant.
//!
//! Payloads are exact decimals. Arithmetic, comparison, and rounding are
//! pointwise over the breakpoint merge; all unknown handling goes
//! through *data* precedence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::algebra::map2;
use crate::state::preceding_state;
use crate::state::Knowledge;
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TBool, TValue, Temporal};

/// Tie-break and direction configuration for [`TNumber::rounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// To the nearest multiple, ties rounding up.
    NearestTiesUp,
    /// To the nearest multiple, ties rounding down.
    NearestTiesDown,
    /// Always up to the next multiple.
    Up,
    /// Always down to the previous multiple.
    Down,
}

/// A decimal-valued timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TNumber {
    timeline: Timeline,
}

fn num(v: &EpistemicValue) -> Option<Decimal> {
    v.payload().and_then(Value::as_number)
}

/// A known-zero test used by the multiplicative short-circuits.
fn is_known_zero(v: &EpistemicValue) -> bool {
    num(v) == Some(Decimal::ZERO)
}

impl TNumber {
    /// A numeric constant for all of time.
    #[must_use]
    pub fn constant(value: Decimal) -> Self {
        Self {
            timeline: Timeline::eternal(EpistemicValue::known(value)),
        }
    }

    /// The constant zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::constant(Decimal::ZERO)
    }

    /// Pointwise addition.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        self.arith(other, |a, b| a + b)
    }

    /// Pointwise subtraction.
    #[must_use]
    pub fn minus(&self, other: &Self) -> Self {
        self.arith(other, |a, b| a - b)
    }

    /// Pointwise multiplication.
    ///
    /// A known-zero operand short-circuits the row to zero before the
    /// precedence rules are consulted.
    #[must_use]
    pub fn times(&self, other: &Self) -> Self {
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| {
                if is_known_zero(a) || is_known_zero(b) {
                    return EpistemicValue::known(Decimal::ZERO);
                }
                match (num(a), num(b)) {
                    (Some(x), Some(y)) => EpistemicValue::known(x * y),
                    _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
                }
            }),
        }
    }

    /// Pointwise division.
    ///
    /// A known-zero operand short-circuits the row to zero before the
    /// precedence rules are consulted; in particular division *by* zero
    /// yields a known zero rather than an error.
    #[must_use]
    pub fn divided_by(&self, other: &Self) -> Self {
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| {
                if is_known_zero(a) || is_known_zero(b) {
                    return EpistemicValue::known(Decimal::ZERO);
                }
                match (num(a), num(b)) {
                    (Some(x), Some(y)) => EpistemicValue::known(x / y),
                    _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
                }
            }),
        }
    }

    /// Pointwise remainder; a known-zero divisor yields a known zero.
    #[must_use]
    pub fn remainder(&self, other: &Self) -> Self {
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| {
                if is_known_zero(b) {
                    return EpistemicValue::known(Decimal::ZERO);
                }
                match (num(a), num(b)) {
                    (Some(x), Some(y)) => EpistemicValue::known(x % y),
                    _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
                }
            }),
        }
    }

    fn arith(&self, other: &Self, f: impl Fn(Decimal, Decimal) -> Decimal) -> Self {
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| match (num(a), num(b)) {
                (Some(x), Some(y)) => EpistemicValue::known(f(x, y)),
                _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
            }),
        }
    }

    fn compare(&self, other: &Self, f: impl Fn(Decimal, Decimal) -> bool) -> TBool {
        TBool::from_timeline(map2(&self.timeline, &other.timeline, |a, b| {
            match (num(a), num(b)) {
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

    /// Pointwise inequality.
    #[must_use]
    pub fn not_equals(&self, other: &Self) -> TBool {
        self.compare(other, |a, b| a != b)
    }

    /// Pointwise maximum of two numeric timelines.
    #[must_use]
    pub fn max_with(&self, other: &Self) -> Self {
        self.arith(other, Decimal::max)
    }

    /// Pointwise minimum of two numeric timelines.
    #[must_use]
    pub fn min_with(&self, other: &Self) -> Self {
        self.arith(other, Decimal::min)
    }

    /// The all-time maximum, as an eternal numeric timeline.
    ///
    /// Short-circuits to the dominating unknown state when the variant
    /// is ever unknown.
    #[must_use]
    pub fn all_time_max(&self) -> Self {
        self.extremum(Decimal::max)
    }

    /// The all-time minimum, as an eternal numeric timeline.
    #[must_use]
    pub fn all_time_min(&self) -> Self {
        self.extremum(Decimal::min)
    }

    fn extremum(&self, pick: impl Fn(Decimal, Decimal) -> Decimal) -> Self {
        if self.is_ever_unknown() {
            return Self::eternal_state(self.state_if_unknown());
        }
        let best = self
            .timeline
            .iter()
            .filter_map(|(_, v)| num(v))
            .reduce(pick)
            .unwrap_or_else(|| panic!("numeric timeline with no entries"));
        Self::constant(best)
    }

    /// Rounds every known value to a multiple of `multiple`.
    ///
    /// Unknown entries pass through untouched.
    ///
    /// # Panics
    ///
    /// Panics if `multiple` is not positive.
    #[must_use]
    pub fn rounded(&self, multiple: Decimal, mode: RoundingMode) -> Self {
        assert!(
            multiple > Decimal::ZERO,
            "rounding multiple must be positive, got {multiple}"
        );
        let mut out: Option<Timeline> = None;
        for (at, v) in self.timeline.iter() {
            let rounded = match num(v) {
                Some(x) => EpistemicValue::known(round_to_multiple(x, multiple, mode)),
                None => EpistemicValue::of_state(v.state()),
            };
            match &mut out {
                None => out = Some(Timeline::eternal(rounded)),
                Some(t) => t.set(*at, rounded),
            }
        }
        Self {
            timeline: out
                .unwrap_or_else(|| panic!("numeric timeline with no entries"))
                .lean(),
        }
    }
}

fn round_to_multiple(value: Decimal, multiple: Decimal, mode: RoundingMode) -> Decimal {
    let quotient = (value / multiple).floor();
    let down = quotient * multiple;
    if down == value {
        return value;
    }
    let up = down + multiple;
    match mode {
        RoundingMode::Up => up,
        RoundingMode::Down => down,
        RoundingMode::NearestTiesUp | RoundingMode::NearestTiesDown => {
            let twice_offset = (value - down) * Decimal::TWO;
            if twice_offset > multiple {
                up
            } else if twice_offset < multiple {
                down
            } else if mode == RoundingMode::NearestTiesUp {
                up
            } else {
                down
            }
        }
    }
}

impl Temporal for TNumber {
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
            TValue::Number(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_stored(self) -> TValue {
        TValue::Number(self)
    }

    fn kind() -> &'static str {
        "number"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::date;
    use rust_decimal_macros::dec;

    #[test]
    fn test_arithmetic_pointwise() {
        let a = TNumber::constant(dec!(10));
        let b = TNumber::constant(dec!(4));
        assert_eq!(a.plus(&b).to_text(), "14");
        assert_eq!(a.minus(&b).to_text(), "6");
        assert_eq!(a.times(&b).to_text(), "40");
        assert_eq!(a.divided_by(&b).to_text(), "2.5");
        assert_eq!(a.remainder(&b).to_text(), "2");
    }

    #[test]
    fn test_unknowns_resolve_by_data_precedence() {
        let sum = TNumber::unstated().plus(&TNumber::stub());
        assert_eq!(sum.state_if_unknown(), Knowledge::Stub);
    }

    #[test]
    fn test_zero_short_circuits_multiplication() {
        // Known zero beats an unknown operand.
        let product = TNumber::zero().times(&TNumber::unstated());
        assert_eq!(product.to_text(), "0");
    }

    #[test]
    fn test_division_by_zero_is_known_zero() {
        let q = TNumber::constant(dec!(5)).divided_by(&TNumber::zero());
        assert_eq!(q.to_text(), "0");
    }

    #[test]
    fn test_comparisons() {
        let a = TNumber::constant(dec!(3));
        let b = TNumber::constant(dec!(5));
        assert_eq!(a.lt(&b).to_text(), "true");
        assert_eq!(a.ge(&b).to_text(), "false");
        assert_eq!(a.equals(&a.clone()).to_text(), "true");
        assert_eq!(
            a.gt(&TNumber::unstated()).state_if_unknown(),
            Knowledge::Unstated
        );
    }

    #[test]
    fn test_all_time_extrema() {
        let mut t = Timeline::eternal(EpistemicValue::known(dec!(3)));
        t.push(date(2015, 1, 1), EpistemicValue::known(dec!(9)));
        t.push(date(2016, 1, 1), EpistemicValue::known(dec!(1)));
        let n = TNumber::from_timeline(t);
        assert_eq!(n.all_time_max().to_text(), "9");
        assert_eq!(n.all_time_min().to_text(), "1");
    }

    #[test]
    fn test_extrema_short_circuit_on_unknown() {
        let mut t = Timeline::eternal(EpistemicValue::known(dec!(3)));
        t.push(date(2015, 1, 1), EpistemicValue::uncertain());
        let n = TNumber::from_timeline(t);
        assert_eq!(n.all_time_max().state_if_unknown(), Knowledge::Uncertain);
    }

    #[test]
    fn test_rounding_modes() {
        let n = TNumber::constant(dec!(12.5));
        assert_eq!(n.rounded(dec!(5), RoundingMode::NearestTiesUp).to_text(), "15");
        assert_eq!(n.rounded(dec!(5), RoundingMode::NearestTiesDown).to_text(), "10");
        assert_eq!(n.rounded(dec!(5), RoundingMode::Up).to_text(), "15");
        assert_eq!(n.rounded(dec!(5), RoundingMode::Down).to_text(), "10");

        let m = TNumber::constant(dec!(12.4));
        assert_eq!(m.rounded(dec!(5), RoundingMode::NearestTiesUp).to_text(), "10");
        assert_eq!(m.rounded(dec!(0.25), RoundingMode::Down).to_text(), "12.25");
    }

    #[test]
    fn test_rounding_exact_multiple_unchanged() {
        let n = TNumber::constant(dec!(15));
        assert_eq!(n.rounded(dec!(5), RoundingMode::Up).to_text(), "15");
    }
}
