//! The timeline substrate: a piecewise-constant function over all of time.
//!
//! A `Timeline` is an ordered map from breakpoint to [`EpistemicValue`].
//! The first breakpoint is always the epoch minimum ("Dawn"); the value
//! at a breakpoint holds until the next one, and the last value holds
//! through the epoch maximum. Timelines are append-only during
//! construction and never mutated after being handed to a caller; every
//! derived computation returns a new, compacted timeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{preceding_state, Knowledge};
use crate::time::dawn;
use crate::value::EpistemicValue;

/// An ordered, breakpoint-keyed sequence of epistemic values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    entries: BTreeMap<DateTime<Utc>, EpistemicValue>,
}

impl Timeline {
    /// A timeline constant for all of time.
    #[must_use]
    pub fn eternal(value: EpistemicValue) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(dawn(), value);
        Self { entries }
    }

    /// Builds a timeline from explicit (breakpoint, value) points.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty, the first key is not Dawn, or keys
    /// are not strictly increasing. Malformed timelines are a bug in
    /// calling code, not a data condition.
    #[must_use]
    pub fn from_points(points: Vec<(DateTime<Utc>, EpistemicValue)>) -> Self {
        let mut iter = points.into_iter();
        let (first_key, first_value) = iter
            .next()
            .unwrap_or_else(|| panic!("a timeline must have at least one entry"));
        let mut out = Self::eternal(first_value);
        assert!(
            first_key == dawn(),
            "a timeline's first breakpoint must be Dawn, got {first_key}"
        );
        for (at, value) in iter {
            out.push(at, value);
        }
        out
    }

    /// Appends a breakpoint after all existing ones.
    ///
    /// # Panics
    ///
    /// Panics if `at` is not strictly after the current last breakpoint.
    pub fn push(&mut self, at: DateTime<Utc>, value: EpistemicValue) {
        let last = *self
            .entries
            .keys()
            .next_back()
            .unwrap_or_else(|| panic!("a timeline must have at least one entry"));
        assert!(
            at > last,
            "timeline breakpoints must be strictly increasing: {at} is not after {last}"
        );
        self.entries.insert(at, value);
    }

    /// The value in force at or immediately before `at`.
    ///
    /// Instants before Dawn read the Dawn entry; instants past the last
    /// breakpoint read the last entry.
    #[must_use]
    pub fn value_as_of(&self, at: DateTime<Utc>) -> &EpistemicValue {
        self.entries
            .range(..=at)
            .next_back()
            .map_or_else(|| self.first_value(), |(_, v)| v)
    }

    /// Compaction: drops adjacent entries with equal tag-and-payload.
    ///
    /// Idempotent, and never changes `value_as_of` at any instant. This
    /// is the canonical form of every derived timeline.
    #[must_use]
    pub fn lean(&self) -> Self {
        let mut entries = BTreeMap::new();
        let mut previous: Option<&EpistemicValue> = None;
        for (at, value) in &self.entries {
            if previous != Some(value) {
                entries.insert(*at, value.clone());
                previous = Some(value);
            }
        }
        Self { entries }
    }

    /// True when the timeline has exactly one entry.
    #[must_use]
    pub fn is_eternal(&self) -> bool {
        self.entries.len() == 1
    }

    /// True when the timeline is eternal and its single value is `Known`.
    #[must_use]
    pub fn is_eternally_known(&self) -> bool {
        self.is_eternal() && self.first_value().is_known()
    }

    /// True when any entry carries a non-`Known` state.
    #[must_use]
    pub fn is_ever_unknown(&self) -> bool {
        self.entries.values().any(|v| !v.is_known())
    }

    /// True when any entry carries the `Null` sentinel.
    #[must_use]
    pub fn has_null(&self) -> bool {
        self.entries.values().any(EpistemicValue::is_null)
    }

    /// Data-precedence fold over all entry states.
    ///
    /// `Known` when no entry is unknown; otherwise the dominating
    /// unknown state under data precedence.
    #[must_use]
    pub fn state_if_unknown(&self) -> Knowledge {
        preceding_state(self.entries.values().map(EpistemicValue::state))
    }

    /// Number of breakpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a timeline has at least one entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates (breakpoint, value) in time order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &EpistemicValue)> {
        self.entries.iter()
    }

    /// Iterates breakpoints in time order.
    pub fn keys(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.entries.keys()
    }

    /// The Dawn entry's value.
    ///
    /// # Panics
    ///
    /// Panics on an empty timeline, which violates the construction
    /// invariant.
    #[must_use]
    pub fn first_value(&self) -> &EpistemicValue {
        self.entries
            .values()
            .next()
            .unwrap_or_else(|| panic!("a timeline must have at least one entry"))
    }

    /// The last entry's value, in force through the epoch maximum.
    #[must_use]
    pub fn last_value(&self) -> &EpistemicValue {
        self.entries
            .values()
            .next_back()
            .unwrap_or_else(|| panic!("a timeline must have at least one entry"))
    }

    /// Overwrite-or-insert used by the algebra engine during
    /// construction of derived timelines. Not part of the public
    /// append-only surface.
    pub(crate) fn set(&mut self, at: DateTime<Utc>, value: EpistemicValue) {
        self.entries.insert(at, value);
    }

    /// The textual round-trip form.
    ///
    /// An eternal known timeline renders as its bare payload literal;
    /// anything else renders as `{Dawn: v; 2015-01-01: v2}` with the
    /// epoch-minimum key spelled `Dawn`, booleans lower-cased, and
    /// non-`Known` states by name.
    #[must_use]
    pub fn to_text(&self) -> String {
        if self.is_eternally_known() {
            return format!("{}", self.first_value());
        }
        let mut out = String::from("{");
        for (i, (at, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push_str("; ");
            }
            if *at == dawn() {
                out.push_str("Dawn");
            } else {
                out.push_str(&at.format("%Y-%m-%d").to_string());
            }
            out.push_str(": ");
            out.push_str(&format!("{value}"));
        }
        out.push('}');
        out
    }
}

impl std::fmt::Display for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
