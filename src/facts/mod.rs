//! Facts, questions, and the proof log.

mod answer;
mod session;

pub use answer::{parse_answer, AnswerKind};
pub use session::Session;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Entity, EntityId};
use crate::variant::TValue;

/// Stable fact identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactId(Uuid);

impl FactId {
    /// Creates a new random fact ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Up to three positional entity arguments; unused slots stay empty.
pub type FactArgs = [Option<EntityId>; 3];

/// An asserted (relation, arguments, value) tuple.
///
/// The store never deduplicates identical tuples; the first match wins
/// on lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Stable identifier.
    pub id: FactId,
    /// Relation name.
    pub relation: String,
    /// Positional entity arguments.
    pub args: FactArgs,
    /// The fact's value over time.
    pub value: TValue,
}

impl Fact {
    /// Builds a fact with a fresh ID.
    #[must_use]
    pub fn new(relation: impl Into<String>, args: FactArgs, value: TValue) -> Self {
        Self {
            id: FactId::new(),
            relation: relation.into(),
            args,
            value,
        }
    }

    /// Positional match against a looked-up tuple, empty slots
    /// included.
    #[must_use]
    pub fn matches(&self, relation: &str, args: FactArgs) -> bool {
        self.relation == relation && self.args == args
    }
}

/// A user-facing question the engine could not answer from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    relation: String,
    args: Vec<Entity>,
}

impl Question {
    pub(crate) fn new(relation: impl Into<String>, args: Vec<Entity>) -> Self {
        Self {
            relation: relation.into(),
            args,
        }
    }

    /// The relation being asked about.
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// The entities the question concerns.
    #[must_use]
    pub fn args(&self) -> &[Entity] {
        &self.args
    }

    pub(crate) fn arg_ids(&self) -> FactArgs {
        let mut out: FactArgs = [None; 3];
        for (slot, e) in out.iter_mut().zip(&self.args) {
            *slot = Some(e.id);
        }
        out
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.relation)?;
        for (i, e) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, ")?")
    }
}

/// One visit in the per-investigation proof log.
///
/// Depth is an explicit counter threaded through nested rule
/// invocations, not a call-stack estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofNode {
    /// Relation visited.
    pub relation: String,
    /// Arguments at the visit.
    pub args: FactArgs,
    /// Nesting depth of the visit.
    pub depth: usize,
}
