//! The entity-set timeline variant.
//!
//! Payloads are ordered lists of entities with list-set semantics:
//! order is irrelevant to the set operators and duplicates are
//! suppressed by the operators, not by the timeline substrate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::algebra::map2;
use crate::entity::Entity;
use crate::state::preceding_state;
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::{TBool, TNumber, TValue, Temporal};

/// An entity-set-valued timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TSet {
    timeline: Timeline,
}

fn members(v: &EpistemicValue) -> Option<&[Entity]> {
    v.payload().and_then(Value::as_members)
}

fn dedup(list: Vec<Entity>) -> Vec<Entity> {
    let mut out: Vec<Entity> = Vec::with_capacity(list.len());
    for e in list {
        if !out.contains(&e) {
            out.push(e);
        }
    }
    out
}

impl TSet {
    /// A constant membership for all of time. Duplicates are dropped.
    #[must_use]
    pub fn of(entities: Vec<Entity>) -> Self {
        Self {
            timeline: Timeline::eternal(EpistemicValue::known(dedup(entities))),
        }
    }

    /// The eternally-empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::of(Vec::new())
    }

    /// Pointwise set union.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.combine(other, |a, b| {
            let mut out = a.to_vec();
            out.extend(b.iter().cloned());
            dedup(out)
        })
    }

    /// Pointwise set intersection.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.combine(other, |a, b| {
            dedup(a.iter().filter(|e| b.contains(e)).cloned().collect())
        })
    }

    /// Pointwise set difference, `self` minus `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.combine(other, |a, b| {
            dedup(a.iter().filter(|e| !b.contains(e)).cloned().collect())
        })
    }

    fn combine(&self, other: &Self, f: impl Fn(&[Entity], &[Entity]) -> Vec<Entity>) -> Self {
        Self {
            timeline: map2(&self.timeline, &other.timeline, |a, b| {
                match (members(a), members(b)) {
                    (Some(x), Some(y)) => EpistemicValue::known(f(x, y)),
                    _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
                }
            }),
        }
    }

    /// Pointwise subset test, order-irrelevant.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> TBool {
        self.relate(other, |a, b| a.iter().all(|e| b.contains(e)))
    }

    /// Pointwise set equality, order-irrelevant.
    #[must_use]
    pub fn set_equals(&self, other: &Self) -> TBool {
        self.relate(other, |a, b| {
            a.iter().all(|e| b.contains(e)) && b.iter().all(|e| a.contains(e))
        })
    }

    fn relate(&self, other: &Self, f: impl Fn(&[Entity], &[Entity]) -> bool) -> TBool {
        TBool::from_timeline(map2(&self.timeline, &other.timeline, |a, b| {
            match (members(a), members(b)) {
                (Some(x), Some(y)) => EpistemicValue::known(f(x, y)),
                _ => EpistemicValue::of_state(preceding_state([a.state(), b.state()])),
            }
        }))
    }

    /// Pointwise member count.
    #[must_use]
    pub fn count(&self) -> TNumber {
        let mut out: Option<Timeline> = None;
        for (at, v) in self.timeline.iter() {
            let counted = match members(v) {
                Some(list) => EpistemicValue::known(Decimal::from(dedup(list.to_vec()).len())),
                None => EpistemicValue::of_state(v.state()),
            };
            match &mut out {
                None => out = Some(Timeline::eternal(counted)),
                Some(t) => t.set(*at, counted),
            }
        }
        TNumber::from_timeline(
            out.unwrap_or_else(|| panic!("set timeline with no entries"))
                .lean(),
        )
    }

    /// Pointwise membership test for one entity.
    #[must_use]
    pub fn contains(&self, entity: &Entity) -> TBool {
        let mut out: Option<Timeline> = None;
        for (at, v) in self.timeline.iter() {
            let hit = match members(v) {
                Some(list) => EpistemicValue::known(list.contains(entity)),
                None => EpistemicValue::of_state(v.state()),
            };
            match &mut out {
                None => out = Some(Timeline::eternal(hit)),
                Some(t) => t.set(*at, hit),
            }
        }
        TBool::from_timeline(
            out.unwrap_or_else(|| panic!("set timeline with no entries"))
                .lean(),
        )
    }

    /// Every entity that is a member at any instant, in order of first
    /// appearance. An entity that later leaves the set still appears.
    #[must_use]
    pub fn ever_members(&self) -> Vec<Entity> {
        let mut out: Vec<Entity> = Vec::new();
        for (_, v) in self.timeline.iter() {
            if let Some(list) = members(v) {
                for e in list {
                    if !out.contains(e) {
                        out.push(e.clone());
                    }
                }
            }
        }
        out
    }
}

impl Temporal for TSet {
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
            TValue::Set(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_stored(self) -> TValue {
        TValue::Set(self)
    }

    fn kind() -> &'static str {
        "set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Knowledge;
    use crate::time::date;

    fn abc() -> (Entity, Entity, Entity) {
        (Entity::new("a"), Entity::new("b"), Entity::new("c"))
    }

    #[test]
    fn test_union_is_commutative() {
        let (a, b, c) = abc();
        let s1 = TSet::of(vec![a.clone(), b.clone()]);
        let s2 = TSet::of(vec![b.clone(), c.clone()]);
        let u12 = s1.union(&s2);
        let u21 = s2.union(&s1);
        assert_eq!(u12.set_equals(&u21).to_text(), "true");
        assert_eq!(u12.count().to_text(), "3");
    }

    #[test]
    fn test_intersection_is_associative() {
        let (a, b, c) = abc();
        let s1 = TSet::of(vec![a.clone(), b.clone(), c.clone()]);
        let s2 = TSet::of(vec![b.clone(), c.clone()]);
        let s3 = TSet::of(vec![c.clone()]);
        let left = s1.intersection(&s2.intersection(&s3));
        let right = s1.intersection(&s2).intersection(&s3);
        assert_eq!(left.set_equals(&right).to_text(), "true");
        assert_eq!(left.count().to_text(), "1");
    }

    #[test]
    fn test_difference_and_subset() {
        let (a, b, _) = abc();
        let s1 = TSet::of(vec![a.clone(), b.clone()]);
        let s2 = TSet::of(vec![b.clone()]);
        assert_eq!(s1.difference(&s2).count().to_text(), "1");
        assert_eq!(s2.is_subset_of(&s1).to_text(), "true");
        assert_eq!(s1.is_subset_of(&s2).to_text(), "false");
    }

    #[test]
    fn test_duplicates_suppressed() {
        let (a, _, _) = abc();
        let s = TSet::of(vec![a.clone(), a.clone()]);
        assert_eq!(s.count().to_text(), "1");
    }

    #[test]
    fn test_contains_over_time() {
        let (a, b, _) = abc();
        let mut t = Timeline::eternal(EpistemicValue::known(vec![a.clone()]));
        t.push(date(2015, 1, 1), EpistemicValue::known(vec![a.clone(), b.clone()]));
        let s = TSet::from_timeline(t);
        assert_eq!(s.contains(&b).to_text(), "{Dawn: false; 2015-01-01: true}");
        assert_eq!(s.ever_members(), vec![a, b]);
    }

    #[test]
    fn test_unknown_set_resolves_by_data_precedence() {
        let (a, _, _) = abc();
        let s = TSet::of(vec![a]);
        let u = s.union(&TSet::stub());
        assert_eq!(u.state_if_unknown(), Knowledge::Stub);
    }
}
