//! Epistemic states and their precedence rules.
//!
//! Every value in Themis carries a tag explaining *why* it may be absent:
//! the rule logic is unfinished (`Stub`), the fact was asked but never
//! usefully answered (`Uncertain`), or the fact has simply not been asked
//! yet (`Unstated`). `Known` marks a concrete payload. `Null` is a
//! construction-only sentinel used by the multi-way conditional evaluator
//! and never escapes it.

use serde::{Deserialize, Serialize};

/// The epistemic tag attached to every timeline entry.
///
/// The variant order is load-bearing: it defines the fixed total order
/// `Stub < Uncertain < Unstated < Known < Null` that both precedence
/// rules are expressed against. Do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Knowledge {
    /// The rule logic needed to produce this value is not yet written.
    Stub,
    /// The fact was asked, but no usable answer was given.
    Uncertain,
    /// The fact has not been asked yet; an answer could still resolve it.
    Unstated,
    /// A concrete payload is present.
    Known,
    /// Construction sentinel for the Switch evaluator. Never escapes it.
    Null,
}

impl Knowledge {
    /// Returns true for any of the three user-visible unknown states.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Stub | Self::Uncertain | Self::Unstated)
    }

    /// Returns true if this tag carries a payload.
    #[must_use]
    pub const fn is_known(self) -> bool {
        matches!(self, Self::Known)
    }

    /// The canonical name used in timeline text and answer parsing.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stub => "Stub",
            Self::Uncertain => "Uncertain",
            Self::Unstated => "Unstated",
            Self::Known => "Known",
            Self::Null => "Null",
        }
    }

    /// Parses a state name as rendered by [`Knowledge::name`].
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Stub" => Some(Self::Stub),
            "Uncertain" => Some(Self::Uncertain),
            "Unstated" => Some(Self::Unstated),
            "Known" => Some(Self::Known),
            "Null" => Some(Self::Null),
            _ => None,
        }
    }
}

impl std::fmt::Display for Knowledge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Data precedence: the unknown state that dominates a mixed row for
/// arithmetic, comparison, equality, and whole-timeline unknown checks.
///
/// Picks the *minimum*-ranked unknown tag: `Stub` dominates `Uncertain`
/// dominates `Unstated`. A `Stub` blocks regardless of what else is
/// unknown; an `Uncertain` means no further questioning helps; an
/// `Unstated` is the only state a future answer could resolve.
///
/// Returns `Known` when no unknown tag is present.
pub fn preceding_state<I>(states: I) -> Knowledge
where
    I: IntoIterator<Item = Knowledge>,
{
    states
        .into_iter()
        .filter(|s| s.is_unknown())
        .min()
        .unwrap_or(Knowledge::Known)
}

/// Logic precedence: the unknown state that dominates a boolean AND/OR
/// row once the truth-value short-circuit has failed to apply.
///
/// Picks the *maximum*-ranked unknown tag: `Unstated` dominates
/// `Uncertain` dominates `Stub`. An unstated input might still be
/// answered and settle the conclusion, so it must not be suppressed by a
/// less-resolvable `Stub` elsewhere in the same expression.
///
/// Returns `Known` when no unknown tag is present.
pub fn preceding_state_for_logic<I>(states: I) -> Knowledge
where
    I: IntoIterator<Item = Knowledge>,
{
    states
        .into_iter()
        .filter(|s| s.is_unknown())
        .max()
        .unwrap_or(Knowledge::Known)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_total_order() {
        assert!(Knowledge::Stub < Knowledge::Uncertain);
        assert!(Knowledge::Uncertain < Knowledge::Unstated);
        assert!(Knowledge::Unstated < Knowledge::Known);
        assert!(Knowledge::Known < Knowledge::Null);
    }

    #[test]
    fn test_data_precedence_picks_minimum() {
        let states = [Knowledge::Unstated, Knowledge::Stub, Knowledge::Known];
        assert_eq!(preceding_state(states), Knowledge::Stub);
    }

    #[test]
    fn test_logic_precedence_picks_maximum() {
        let states = [Knowledge::Unstated, Knowledge::Stub, Knowledge::Known];
        assert_eq!(preceding_state_for_logic(states), Knowledge::Unstated);
    }

    #[test]
    fn test_precedence_asymmetry() {
        // The same multiset resolves differently under the two orders.
        let states = [Knowledge::Stub, Knowledge::Unstated];
        assert_eq!(preceding_state(states), Knowledge::Stub);
        assert_eq!(preceding_state_for_logic(states), Knowledge::Unstated);
    }

    #[test]
    fn test_precedence_all_known() {
        let states = [Knowledge::Known, Knowledge::Known];
        assert_eq!(preceding_state(states), Knowledge::Known);
        assert_eq!(preceding_state_for_logic(states), Knowledge::Known);
    }

    #[test]
    fn test_precedence_ignores_null() {
        let states = [Knowledge::Null, Knowledge::Uncertain];
        assert_eq!(preceding_state(states), Knowledge::Uncertain);
        assert_eq!(preceding_state_for_logic(states), Knowledge::Uncertain);
    }

    #[test]
    fn test_name_round_trip() {
        for s in [
            Knowledge::Stub,
            Knowledge::Uncertain,
            Knowledge::Unstated,
            Knowledge::Known,
            Knowledge::Null,
        ] {
            assert_eq!(Knowledge::parse(s.name()), Some(s));
        }
        assert_eq!(Knowledge::parse("bogus"), None);
    }
}
