//! The investigation session.
//!
//! One session owns the fact store, the entity registry, the proof log,
//! the pending-question queue, and the assumption table. All mutation
//! during an investigation flows through a single session; the algebra
//! itself stays purely functional.

use std::collections::HashMap;

use crate::assumptions::{self, Assumption, AssumptionTable};
use crate::entity::Entity;
use crate::facts::{Fact, FactArgs, ProofNode, Question};
use crate::state::preceding_state;
use crate::value::Value;
use crate::variant::{TValue, Temporal};

enum Lookup {
    Hit(TValue),
    FallThrough,
    Miss,
}

/// Mutable per-investigation state plus the query protocol.
#[derive(Debug, Default)]
pub struct Session {
    facts: Vec<Fact>,
    entities: HashMap<String, Entity>,
    assumptions: AssumptionTable,
    proof: Vec<ProofNode>,
    pending: Vec<Question>,
    gather_unknowns: bool,
    depth: usize,
}

impl Session {
    /// A session with no assumptions declared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session with a compiled-in assumption table.
    #[must_use]
    pub fn with_assumptions(assumptions: AssumptionTable) -> Self {
        Self {
            assumptions,
            ..Self::default()
        }
    }

    /// Returns the registered entity with this name, creating it on
    /// first use. An empty name is never registered.
    pub fn entity(&mut self, name: &str) -> Entity {
        if name.is_empty() {
            return Entity::new(name);
        }
        self.entities
            .entry(name.to_string())
            .or_insert_with(|| Entity::new(name))
            .clone()
    }

    /// Asserts a fact and runs assumption inference over it.
    ///
    /// A pending question for the same tuple is considered answered and
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics when more than three arguments are supplied.
    pub fn assert_fact(&mut self, relation: &str, args: &[&Entity], value: impl Into<TValue>) {
        self.assert_ids(relation, arg_ids(args), value.into());
    }

    fn assert_ids(&mut self, relation: &str, args: FactArgs, value: TValue) {
        self.pending
            .retain(|q| !(q.relation() == relation && q.arg_ids() == args));
        self.facts.push(Fact::new(relation, args, value.clone()));
        self.infer(relation, args, &value);
    }

    /// True when a fact for this exact tuple is in the store.
    #[must_use]
    pub fn has_been_asserted(&self, relation: &str, args: &[&Entity]) -> bool {
        self.find(relation, arg_ids(args)).is_some()
    }

    /// [`has_been_asserted`](Self::has_been_asserted) for a symmetric
    /// relation, consulting both argument orders.
    #[must_use]
    pub fn has_been_asserted_symmetric(&self, relation: &str, args: &[&Entity]) -> bool {
        self.lookup_symmetric(relation, arg_ids(args)).is_some()
    }

    /// All asserted facts, in assertion order.
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Questions gathered but not yet answered, in discovery order.
    #[must_use]
    pub fn pending(&self) -> &[Question] {
        &self.pending
    }

    /// The proof log of the current investigation.
    #[must_use]
    pub fn proof(&self) -> &[ProofNode] {
        &self.proof
    }

    /// Drops all facts and the entity registry.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.entities.clear();
    }

    /// [`clear`](Self::clear) plus the proof log, pending questions,
    /// and evaluation flags.
    pub fn reset(&mut self) {
        self.clear();
        self.proof.clear();
        self.pending.clear();
        self.gather_unknowns = false;
        self.depth = 0;
    }

    pub(crate) fn reset_proof(&mut self) {
        self.proof.clear();
        self.depth = 0;
    }

    pub(crate) fn set_gather_unknowns(&mut self, on: bool) {
        self.gather_unknowns = on;
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Queries a relation as a user-facing question.
    ///
    /// Runs the short-circuit protocol; `rule` is the relation's own
    /// logic, entered only when no stored answer applies.
    ///
    /// # Panics
    ///
    /// Panics when more than three arguments are supplied, or when the
    /// stored fact's value is of a different variant than requested.
    pub fn ask<T, R>(&mut self, relation: &str, args: &[&Entity], rule: R) -> T
    where
        T: Temporal,
        R: FnOnce(&mut Self) -> T,
    {
        self.query(relation, args, false, true, rule)
    }

    /// [`ask`](Self::ask) for a symmetric relation: the store is
    /// consulted under both argument orders.
    pub fn ask_symmetric<T, R>(&mut self, relation: &str, args: &[&Entity], rule: R) -> T
    where
        T: Temporal,
        R: FnOnce(&mut Self) -> T,
    {
        self.query(relation, args, true, true, rule)
    }

    /// Queries an intermediate relation that is never asked of the
    /// user; a miss silently proceeds to the rule body.
    pub fn derive<T, R>(&mut self, relation: &str, args: &[&Entity], rule: R) -> T
    where
        T: Temporal,
        R: FnOnce(&mut Self) -> T,
    {
        self.query(relation, args, false, false, rule)
    }

    fn query<T, R>(
        &mut self,
        relation: &str,
        args: &[&Entity],
        symmetric: bool,
        question: bool,
        rule: R,
    ) -> T
    where
        T: Temporal,
        R: FnOnce(&mut Self) -> T,
    {
        // An unknown entity argument decides the call before the rule
        // body; several unknowns resolve under data precedence.
        let state = preceding_state(args.iter().filter_map(|e| e.id.knowledge()));
        if state.is_unknown() {
            return T::eternal_state(state);
        }

        let ids = arg_ids(args);
        self.record_visit(relation, ids);

        let lookup = {
            let found = if symmetric {
                self.lookup_symmetric(relation, ids)
            } else {
                self.find(relation, ids)
            };
            match found {
                Some(f) if f.value.is_eternally_uncertain() => Lookup::FallThrough,
                Some(f) => Lookup::Hit(f.value.clone()),
                None => Lookup::Miss,
            }
        };

        match lookup {
            Lookup::Hit(value) => {
                return T::from_stored(&value).unwrap_or_else(|| {
                    panic!(
                        "fact {relation} stores a {} value, caller requested {}",
                        value.kind(),
                        T::kind()
                    )
                });
            }
            Lookup::FallThrough => {}
            Lookup::Miss => {
                if question && self.gather_unknowns && !self.pre_ask(relation, ids) {
                    self.enqueue(relation, args);
                }
            }
        }

        self.depth += 1;
        let out = rule(self);
        self.depth -= 1;
        out
    }

    fn find(&self, relation: &str, args: FactArgs) -> Option<&Fact> {
        self.facts.iter().find(|f| f.matches(relation, args))
    }

    fn lookup_symmetric(&self, relation: &str, args: FactArgs) -> Option<&Fact> {
        self.find(relation, args)
            .or_else(|| self.find(relation, [args[1], args[0], args[2]]))
    }

    fn record_visit(&mut self, relation: &str, args: FactArgs) {
        if self
            .proof
            .iter()
            .any(|n| n.relation == relation && n.args == args)
        {
            return;
        }
        self.proof.push(ProofNode {
            relation: relation.to_string(),
            args,
            depth: self.depth,
        });
    }

    fn enqueue(&mut self, relation: &str, args: &[&Entity]) {
        let q = Question::new(relation, args.iter().map(|e| (*e).clone()).collect());
        if self
            .pending
            .iter()
            .any(|p| p.relation() == relation && p.arg_ids() == q.arg_ids())
        {
            return;
        }
        self.pending.push(q);
    }

    /// Tries to answer a would-be question from the assumption table
    /// before it reaches the user: if a declared consequence of the
    /// relation is already stored and eternally contradicts its target,
    /// the antecedent is asserted negated. The consequence is consulted
    /// by store lookup only, never chained further.
    fn pre_ask(&mut self, relation: &str, args: FactArgs) -> bool {
        let pairs: Vec<Assumption> = self.assumptions.implications_from(relation).cloned().collect();
        for a in pairs {
            let &Value::Bool(expected) = a.if_point.value() else {
                continue;
            };
            let then_args = assumptions::remap_args(&a.if_point, args, &a.then_point);
            self.record_visit(a.then_point.relation(), then_args);
            let contradicted = self
                .find(a.then_point.relation(), then_args)
                .is_some_and(|f| assumptions::eternally_contradicts(&f.value, a.then_point.value()));
            if contradicted {
                self.assert_ids(relation, args, TValue::eternal(Value::Bool(!expected)));
                return true;
            }
        }
        false
    }

    /// Forward and contrapositive chaining over one fresh assertion.
    fn infer(&mut self, relation: &str, args: FactArgs, value: &TValue) {
        let forward: Vec<Assumption> = self.assumptions.implications_from(relation).cloned().collect();
        for a in forward {
            if assumptions::eternally_equals(value, a.if_point.value()) {
                let target = assumptions::remap_args(&a.if_point, args, &a.then_point);
                if self.find(a.then_point.relation(), target).is_none() {
                    self.assert_ids(
                        a.then_point.relation(),
                        target,
                        TValue::eternal(a.then_point.value().clone()),
                    );
                }
            }
        }

        let reverse: Vec<Assumption> = self.assumptions.implications_into(relation).cloned().collect();
        for a in reverse {
            if !assumptions::eternally_contradicts(value, a.then_point.value()) {
                continue;
            }
            let &Value::Bool(b) = a.if_point.value() else {
                continue;
            };
            let target = assumptions::remap_args(&a.then_point, args, &a.if_point);
            if self.find(a.if_point.relation(), target).is_none() {
                self.assert_ids(a.if_point.relation(), target, TValue::eternal(Value::Bool(!b)));
            }
        }
    }
}

fn arg_ids(args: &[&Entity]) -> FactArgs {
    assert!(args.len() <= 3, "a relation takes at most three arguments");
    let mut out: FactArgs = [None; 3];
    for (slot, e) in out.iter_mut().zip(args) {
        *slot = Some(e.id);
    }
    out
}
