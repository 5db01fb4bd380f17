//! Typed timeline variants.
//!
//! Each variant is a thin typed wrapper over a [`Timeline`] whose
//! payloads match its domain: boolean, numeric, date, string, or
//! entity-set. The generic algebra is parameterized over the
//! [`Temporal`] trait; the fact store holds variants behind the closed
//! [`TValue`] sum, so no machinery inspects payload types at run time.

mod boolean;
mod date;
mod number;
mod set;
mod text;

pub use boolean::TBool;
pub use date::TDate;
pub use number::{RoundingMode, TNumber};
pub use set::TSet;
pub use text::TText;

use serde::{Deserialize, Serialize};

use crate::state::Knowledge;
use crate::timeline::Timeline;
use crate::value::EpistemicValue;

/// The seam between the generic algebra and the five typed variants.
///
/// Implementations are a closed set; the trait exists so merge, Switch,
/// shift, and sampling can be written once.
pub trait Temporal: Clone + Sized {
    /// Wraps a timeline without inspecting payloads.
    #[must_use]
    fn from_timeline(timeline: Timeline) -> Self;

    /// The underlying timeline.
    fn timeline(&self) -> &Timeline;

    /// Unwraps into the underlying timeline.
    fn into_timeline(self) -> Timeline;

    /// Extracts this variant from a stored fact value; `None` on a
    /// variant mismatch (callers treat that as a fatal type error).
    fn from_stored(value: &TValue) -> Option<Self>;

    /// Wraps this variant for fact storage.
    fn into_stored(self) -> TValue;

    /// The variant name used in type-mismatch panics.
    fn kind() -> &'static str;

    /// An eternal timeline in a non-`Known` state.
    ///
    /// # Panics
    ///
    /// Panics if `state` is `Known` (a known value needs a payload).
    #[must_use]
    fn eternal_state(state: Knowledge) -> Self {
        Self::from_timeline(Timeline::eternal(EpistemicValue::of_state(state)))
    }

    /// The not-yet-asked variant.
    #[must_use]
    fn unstated() -> Self {
        Self::eternal_state(Knowledge::Unstated)
    }

    /// The asked-but-unanswered variant.
    #[must_use]
    fn uncertain() -> Self {
        Self::eternal_state(Knowledge::Uncertain)
    }

    /// The rule-logic-incomplete variant.
    #[must_use]
    fn stub() -> Self {
        Self::eternal_state(Knowledge::Stub)
    }

    /// True when any breakpoint carries a non-`Known` state.
    fn is_ever_unknown(&self) -> bool {
        self.timeline().is_ever_unknown()
    }

    /// Data-precedence fold over every breakpoint's state.
    fn state_if_unknown(&self) -> Knowledge {
        self.timeline().state_if_unknown()
    }

    /// True when constant for all of time.
    fn is_eternal(&self) -> bool {
        self.timeline().is_eternal()
    }

    /// The textual round-trip form of the underlying timeline.
    fn to_text(&self) -> String {
        self.timeline().to_text()
    }
}

/// The closed sum of the five variants, as stored in facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "timeline", rename_all = "snake_case")]
pub enum TValue {
    /// A boolean timeline.
    Bool(TBool),
    /// A numeric timeline.
    Number(TNumber),
    /// A date timeline.
    Date(TDate),
    /// A text timeline.
    Text(TText),
    /// An entity-set timeline.
    Set(TSet),
}

impl TValue {
    /// Wraps a single payload as the matching eternal variant.
    #[must_use]
    pub fn eternal(value: crate::value::Value) -> Self {
        Self::from_timeline_of(
            crate::value::Value::type_name(&value),
            Timeline::eternal(EpistemicValue::known(value)),
        )
    }

    /// Wraps a timeline as the variant named by `kind`.
    ///
    /// # Panics
    ///
    /// Panics on an unrecognized kind name; callers pass the names
    /// returned by [`TValue::kind`] and [`Value::type_name`].
    ///
    /// [`Value::type_name`]: crate::value::Value::type_name
    #[must_use]
    pub fn from_timeline_of(kind: &str, timeline: Timeline) -> Self {
        match kind {
            "bool" => Self::Bool(TBool::from_timeline(timeline)),
            "number" => Self::Number(TNumber::from_timeline(timeline)),
            "date" => Self::Date(TDate::from_timeline(timeline)),
            "text" => Self::Text(TText::from_timeline(timeline)),
            "set" | "members" => Self::Set(TSet::from_timeline(timeline)),
            other => panic!("unrecognized variant kind: {other}"),
        }
    }

    /// The underlying timeline, whichever variant holds it.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        match self {
            Self::Bool(v) => v.timeline(),
            Self::Number(v) => v.timeline(),
            Self::Date(v) => v.timeline(),
            Self::Text(v) => v.timeline(),
            Self::Set(v) => v.timeline(),
        }
    }

    /// The variant name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::Text(_) => "text",
            Self::Set(_) => "set",
        }
    }

    /// True when the stored value is eternally `Uncertain` - the one
    /// stored form the query protocol falls through instead of
    /// returning.
    #[must_use]
    pub fn is_eternally_uncertain(&self) -> bool {
        let t = self.timeline();
        t.is_eternal() && t.first_value().state() == Knowledge::Uncertain
    }

    /// The textual round-trip form.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.timeline().to_text()
    }
}

impl From<TBool> for TValue {
    fn from(v: TBool) -> Self {
        Self::Bool(v)
    }
}

impl From<TNumber> for TValue {
    fn from(v: TNumber) -> Self {
        Self::Number(v)
    }
}

impl From<TDate> for TValue {
    fn from(v: TDate) -> Self {
        Self::Date(v)
    }
}

impl From<TText> for TValue {
    fn from(v: TText) -> Self {
        Self::Text(v)
    }
}

impl From<TSet> for TValue {
    fn from(v: TSet) -> Self {
        Self::Set(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eternal_state_constructors() {
        assert_eq!(TBool::unstated().state_if_unknown(), Knowledge::Unstated);
        assert_eq!(TNumber::uncertain().state_if_unknown(), Knowledge::Uncertain);
        assert_eq!(TDate::stub().state_if_unknown(), Knowledge::Stub);
        assert!(TText::unstated().is_ever_unknown());
    }

    #[test]
    fn test_stored_round_trip() {
        let b = TBool::always(true);
        let stored = b.clone().into_stored();
        assert_eq!(stored.kind(), "bool");
        assert_eq!(TBool::from_stored(&stored), Some(b));
        assert_eq!(TNumber::from_stored(&stored), None);
    }

    #[test]
    fn test_eternally_uncertain_detection() {
        assert!(TBool::uncertain().into_stored().is_eternally_uncertain());
        assert!(!TBool::always(true).into_stored().is_eternally_uncertain());
        assert!(!TBool::unstated().into_stored().is_eternally_uncertain());
    }
}
