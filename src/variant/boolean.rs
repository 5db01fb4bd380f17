//! The boolean timeline variant.

use serde::{Deserialize, Serialize};

use crate::algebra::map2;
use crate::state::{preceding_state_for_logic, Knowledge};
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TValue, Temporal};

/// A boolean-valued timeline.
///
/// AND/OR follow the decisive-value rule: a known `false` settles a
/// conjunction and a known `true` settles a disjunction regardless of
/// what else in the row is unknown. Only when no decisive value is
/// present do the unknown tags resolve, under *logic* precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TBool {
    timeline: Timeline,
}

impl TBool {
    /// A boolean constant for all of time.
    #[must_use]
    pub fn always(value: bool) -> Self {
        Self {
            timeline: Timeline::eternal(EpistemicValue::known(value)),
        }
    }

    /// The known boolean this variant holds for all time, if it is
    /// eternal and known.
    #[must_use]
    pub fn eternal_bool(&self) -> Option<bool> {
        if self.timeline.is_eternal() {
            self.timeline.first_value().payload().and_then(Value::as_bool)
        } else {
            None
        }
    }

    /// Pointwise conjunction.
    ///
    /// Short-circuits on a fully-eternal `false` operand without merging
    /// breakpoints.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        if self.eternal_bool() == Some(false) || other.eternal_bool() == Some(false) {
            return Self::always(false);
        }
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| {
                combine(a, b, false)
            }),
        }
    }

    /// Pointwise disjunction.
    ///
    /// Short-circuits on a fully-eternal `true` operand without merging
    /// breakpoints.
    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        if self.eternal_bool() == Some(true) || other.eternal_bool() == Some(true) {
            return Self::always(true);
        }
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| {
                combine(a, b, true)
            }),
        }
    }

    /// Pointwise negation; unknown states pass through untouched.
    #[must_use]
    pub fn not(&self) -> Self {
        let mut out: Option<Timeline> = None;
        for (at, v) in self.timeline.iter() {
            let flipped = match v.payload().and_then(Value::as_bool) {
                Some(b) => EpistemicValue::known(!b),
                None => EpistemicValue::of_state(v.state()),
            };
            match &mut out {
                None => out = Some(Timeline::eternal(flipped)),
                Some(t) => t.set(*at, flipped),
            }
        }
        Self {
            timeline: out
                .unwrap_or_else(|| panic!("negation of an empty timeline"))
                .lean(),
        }
    }

    /// True when the variant is known `true` at any instant.
    #[must_use]
    pub fn is_ever_true(&self) -> bool {
        self.timeline
            .iter()
            .any(|(_, v)| v.payload() == Some(&Value::Bool(true)))
    }

    /// True when the variant is known `true` at every instant.
    #[must_use]
    pub fn is_always_true(&self) -> bool {
        self.timeline
            .iter()
            .all(|(_, v)| v.payload() == Some(&Value::Bool(true)))
    }
}

/// One AND/OR row: decisive value first, then logic precedence, then
/// the non-decisive boolean.
fn combine(a: &EpistemicValue, b: &EpistemicValue, decisive: bool) -> EpistemicValue {
    let bools = [a.payload().and_then(Value::as_bool), b.payload().and_then(Value::as_bool)];
    if bools.contains(&Some(decisive)) {
        return EpistemicValue::known(decisive);
    }
    let state = preceding_state_for_logic([a.state(), b.state()]);
    if state == Knowledge::Known {
        EpistemicValue::known(!decisive)
    } else {
        EpistemicValue::of_state(state)
    }
}

impl Temporal for TBool {
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
            TValue::Bool(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_stored(self) -> TValue {
        TValue::Bool(self)
    }

    fn kind() -> &'static str {
        "bool"
    }
}
