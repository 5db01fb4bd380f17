//! Themis is a temporal-epistemic rule engine: a calculus of
//! step-functions-over-time whose values carry a tag explaining why
//! they may be unknown, plus the fact store and backward-chaining
//! machinery that drives question-by-question acquisition of missing
//! facts.
//!
//! The engine is domain-agnostic; it was built for rule-authoring over
//! legal and regulatory logic, where a proposition like "was eligible
//! on the filing date" depends on facts that change over time and may
//! not have been asked yet.
//!
//! The layers, bottom up:
//!
//! - [`Timeline`]: a piecewise-constant function over all of time,
//!   each piece an [`EpistemicValue`] ([`Knowledge`] tag plus optional
//!   payload).
//! - Typed variants [`TBool`], [`TNumber`], [`TDate`], [`TText`], and
//!   [`TSet`] with pointwise operators, all built on a shared
//!   breakpoint merge; [`switch`] is the lazy multi-way conditional.
//! - Set aggregation ([`exists`], [`sum`], [`optimal_subset`], ...)
//!   over entity-set timelines.
//! - The [`Session`]: fact store, assumption inference, the
//!   short-circuit query protocol, and the [`investigate`] loop that
//!   picks the next question to ask.
//!
//! # Example
//!
//! ```
//! use themis::{investigate, Goal, Session, TBool, Temporal};
//!
//! let mut session = Session::new();
//! let jane = session.entity("jane");
//!
//! let goal = {
//!     let jane = jane.clone();
//!     Goal::new("is_married", move |s| {
//!         s.ask("is_married", &[&jane], |_| TBool::unstated())
//!     })
//! };
//!
//! let report = investigate(&mut session, &[goal]);
//! assert!(!report.complete);
//! assert_eq!(report.next_question.unwrap().to_string(), "is_married(jane)?");
//!
//! session.assert_fact("is_married", &[&jane], TBool::always(true));
//! let married: TBool = session.ask("is_married", &[&jane], |_| TBool::unstated());
//! assert_eq!(married.to_text(), "true");
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]

mod aggregate;
mod algebra;
mod assumptions;
mod entity;
mod error;
mod facts;
mod investigation;
mod periodic;
mod state;
mod time;
mod timeline;
mod value;
mod variant;

pub use aggregate::{
    exists, filter, for_all, max_of, min_of, optimal_subset, order_by, sum,
};
pub use algebra::{period_end_values, shifted, switch, SwitchCase};
pub use assumptions::{Assumption, AssumptionTable, RulePoint};
pub use entity::{Entity, EntityId};
pub use error::{Result, ThemisError, ValidationError};
pub use facts::{
    parse_answer, AnswerKind, Fact, FactArgs, FactId, ProofNode, Question, Session,
};
pub use investigation::{investigate, Goal, GoalOutcome, InvestigationReport};
pub use periodic::{
    calendar_days, calendar_weeks, intervals_since, intervals_until, periods, recurrence,
    the_month, the_quarter, the_year,
};
pub use state::{preceding_state, preceding_state_for_logic, Knowledge};
pub use time::{add_months, add_years, date, dawn, end_of_time, Interval};
pub use timeline::Timeline;
pub use value::{EpistemicValue, Value};
pub use variant::{RoundingMode, TBool, TDate, TNumber, TSet, TText, TValue, Temporal};
