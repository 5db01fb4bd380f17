//! The string timeline variant.

use serde::{Deserialize, Serialize};

use crate::algebra::map2;
use crate::state::preceding_state;
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TBool, TValue, Temporal};

/// A string-valued timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TText {
    timeline: Timeline,
}

fn text(v: &EpistemicValue) -> Option<&str> {
    v.payload().and_then(Value::as_text)
}

impl TText {
    /// A string constant for all of time.
    #[must_use]
    pub fn constant(value: impl Into<String>) -> Self {
        Self {
            timeline: Timeline::eternal(EpistemicValue::known(value.into())),
        }
    }

    /// Pointwise concatenation, `self` then `other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| {
                match (text(a), text(b)) {
                    (Some(x), Some(y)) => EpistemicValue::known(format!("{x}{y}")),
                    _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
                }
            }),
        }
    }

    /// Pointwise equality.
    #[must_use]
    pub fn equals(&self, other: &Self) -> TBool {
        TBool::from_timeline(map2(&self.timeline, &other.timeline, |a, b| {
            match (text(a), text(b)) {
                (Some(x), Some(y)) => EpistemicValue::known(x == y),
                _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
            }
        }))
    }
}

impl Temporal for TText {
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
            TValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_stored(self) -> TValue {
        TValue::Text(self)
    }

    fn kind() -> &'static str {
        "text"
    }
}
