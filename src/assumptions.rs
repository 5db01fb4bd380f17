//! The static assumption table.
//!
//! An assumption is a declared "A implies B" pair between two relation
//! points. The table is loaded once at session construction and never
//! mutated; the session consults it after every assertion to chain
//! forward and contrapositive inferences.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::value::Value;
use crate::variant::TValue;

/// One side of an assumption: a relation, its argument slot mapping,
/// and a literal target value.
///
/// Slot entries are 1-based call-site positions; `0` leaves the
/// argument unbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePoint {
    relation: String,
    arg_slots: [u8; 3],
    value: Value,
}

impl RulePoint {
    /// Builds a relation point.
    ///
    /// # Panics
    ///
    /// Panics when a slot index exceeds 3.
    #[must_use]
    pub fn new(relation: impl Into<String>, arg_slots: [u8; 3], value: impl Into<Value>) -> Self {
        assert!(
            arg_slots.iter().all(|s| *s <= 3),
            "argument slots are 1-based positions up to 3, or 0 for unbound"
        );
        Self {
            relation: relation.into(),
            arg_slots,
            value: value.into(),
        }
    }

    /// The relation this point names.
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// The literal target value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// A declared implication between two relation points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    /// The antecedent.
    pub if_point: RulePoint,
    /// The consequent.
    pub then_point: RulePoint,
}

impl Assumption {
    /// Pairs an antecedent with its consequent.
    #[must_use]
    pub const fn new(if_point: RulePoint, then_point: RulePoint) -> Self {
        Self {
            if_point,
            then_point,
        }
    }
}

/// The compiled-in list of assumption pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumptionTable {
    pairs: Vec<Assumption>,
}

impl AssumptionTable {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Builds a table from declared pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<Assumption>) -> Self {
        Self { pairs }
    }

    /// Adds one pair.
    pub fn push(&mut self, assumption: Assumption) {
        self.pairs.push(assumption);
    }

    /// Number of declared pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no pairs are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs whose antecedent names `relation`.
    pub(crate) fn implications_from<'a>(
        &'a self,
        relation: &'a str,
    ) -> impl Iterator<Item = &'a Assumption> {
        self.pairs
            .iter()
            .filter(move |a| a.if_point.relation == relation)
    }

    /// Pairs whose consequent names `relation`.
    pub(crate) fn implications_into<'a>(
        &'a self,
        relation: &'a str,
    ) -> impl Iterator<Item = &'a Assumption> {
        self.pairs
            .iter()
            .filter(move |a| a.then_point.relation == relation)
    }
}

/// Remaps asserted arguments from one point's slot layout to another's.
///
/// The shared call-site slots are recovered from `from`, then laid out
/// per `to`; unbound positions stay empty.
pub(crate) fn remap_args(
    from: &RulePoint,
    args: [Option<EntityId>; 3],
    to: &RulePoint,
) -> [Option<EntityId>; 3] {
    let mut slots: [Option<EntityId>; 3] = [None; 3];
    for (pos, s) in from.arg_slots.iter().enumerate() {
        if *s > 0 {
            slots[usize::from(*s) - 1] = args[pos];
        }
    }
    let mut out: [Option<EntityId>; 3] = [None; 3];
    for (pos, s) in to.arg_slots.iter().enumerate() {
        if *s > 0 {
            out[pos] = slots[usize::from(*s) - 1];
        }
    }
    out
}

/// True when the stored value is eternally known and equal to `target`.
///
/// Assumption matching is only supported against eternally-constant
/// values; a time-varying match never fires.
pub(crate) fn eternally_equals(value: &TValue, target: &Value) -> bool {
    let t = value.timeline();
    t.is_eternal() && t.first_value().payload() == Some(target)
}

/// True when the stored value is eternally known and differs from
/// `target`, making the point's expression eternally false.
pub(crate) fn eternally_contradicts(value: &TValue, target: &Value) -> bool {
    let t = value.timeline();
    t.is_eternal()
        && t.first_value().is_known()
        && t.first_value().payload() != Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{TBool, Temporal};

    fn married_implies_not_single() -> Assumption {
        Assumption::new(
            RulePoint::new("is_married", [1, 2, 0], true),
            RulePoint::new("is_single", [1, 0, 0], false),
        )
    }

    #[test]
    fn test_table_filters_by_relation() {
        let table = AssumptionTable::from_pairs(vec![married_implies_not_single()]);
        assert_eq!(table.implications_from("is_married").count(), 1);
        assert_eq!(table.implications_from("is_single").count(), 0);
        assert_eq!(table.implications_into("is_single").count(), 1);
    }

    #[test]
    fn test_remap_selects_call_site_slots() {
        let a = married_implies_not_single();
        let jane = EntityId::new();
        let john = EntityId::new();

        let out = remap_args(&a.if_point, [Some(jane), Some(john), None], &a.then_point);
        assert_eq!(out, [Some(jane), None, None]);
    }

    #[test]
    fn test_remap_reverse_direction() {
        let a = married_implies_not_single();
        let jane = EntityId::new();

        // Contrapositive: recover the call site from the consequent.
        let out = remap_args(&a.then_point, [Some(jane), None, None], &a.if_point);
        assert_eq!(out, [Some(jane), None, None]);
    }

    #[test]
    fn test_eternal_matching() {
        let stored: TValue = TBool::always(true).into();
        assert!(eternally_equals(&stored, &Value::Bool(true)));
        assert!(!eternally_equals(&stored, &Value::Bool(false)));
        assert!(eternally_contradicts(&stored, &Value::Bool(false)));
        assert!(!eternally_contradicts(&TBool::unstated().into(), &Value::Bool(false)));
    }
}
