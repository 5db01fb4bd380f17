//! The top-level investigation loop.
//!
//! Goals are evaluated twice per round: a warming pass so nested rules
//! materialize their intermediate facts, then a gathering pass that
//! collects every question the store could not answer. The first
//! gathered question is the next one to put to the user.

use crate::facts::{Question, Session};
use crate::state::Knowledge;
use crate::variant::{TBool, Temporal};

/// A named top-level query to investigate.
pub struct Goal {
    name: String,
    eval: Box<dyn Fn(&mut Session) -> TBool>,
}

impl Goal {
    /// Names a goal and the rule evaluating it.
    pub fn new(name: impl Into<String>, eval: impl Fn(&mut Session) -> TBool + 'static) -> Self {
        Self {
            name: name.into(),
            eval: Box::new(eval),
        }
    }

    /// The goal's name, as reported in outcomes.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One goal's result after a round of investigation.
#[derive(Debug, Clone)]
pub struct GoalOutcome {
    /// The goal's name.
    pub name: String,
    /// True when no part of the goal's timeline is still unstated.
    pub determined: bool,
    /// The goal's value over time, as currently known.
    pub value: TBool,
}

/// The result of one investigation round.
#[derive(Debug, Clone)]
pub struct InvestigationReport {
    /// True when every goal is determined.
    pub complete: bool,
    /// The first unanswered question, when incomplete.
    pub next_question: Option<Question>,
    /// Rounded share of touched facts already asserted, 0 to 100.
    pub percent_complete: u8,
    /// Per-goal outcomes, in goal order.
    pub goals: Vec<GoalOutcome>,
}

/// Runs one round of investigation over `goals`.
///
/// A goal counts as undetermined if its timeline is `Unstated` at any
/// instant; `Uncertain` and `Stub` slices are as determined as they
/// will ever get. The warming pass is required so the gathering pass
/// sees facts nested rules materialize; rules whose intermediate
/// conditions sit many levels deep may still surface avoidable
/// duplicate questions.
pub fn investigate(session: &mut Session, goals: &[Goal]) -> InvestigationReport {
    session.reset_proof();

    for goal in goals {
        let _ = (goal.eval)(session);
    }

    session.set_gather_unknowns(true);
    session.clear_pending();
    let outcomes: Vec<GoalOutcome> = goals
        .iter()
        .map(|goal| {
            let value = (goal.eval)(session);
            let determined = !value
                .timeline()
                .iter()
                .any(|(_, v)| v.state() == Knowledge::Unstated);
            GoalOutcome {
                name: goal.name.clone(),
                determined,
                value,
            }
        })
        .collect();
    session.set_gather_unknowns(false);

    let complete = outcomes.iter().all(|g| g.determined);
    let next_question = if complete {
        None
    } else {
        session.pending().first().cloned()
    };

    InvestigationReport {
        complete,
        next_question,
        percent_complete: percent(session.facts().len(), session.pending().len()),
        goals: outcomes,
    }
}

/// Rounded `100 * asserted / (asserted + pending)`; an untouched
/// session counts as fully complete.
fn percent(asserted: usize, pending: usize) -> u8 {
    let total = asserted + pending;
    if total == 0 {
        return 100;
    }
    u8::try_from((200 * asserted + total) / (2 * total)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::facts::AnswerKind;

    fn eligible(session: &mut Session, person: &Entity) -> TBool {
        let p = person.clone();
        session.derive("is_eligible", &[person], move |s| {
            let married: TBool = s.ask("is_married", &[&p], |_| TBool::unstated());
            let resident: TBool = s.ask("is_resident", &[&p], |_| TBool::unstated());
            married.and(&resident)
        })
    }

    fn eligibility_goal(person: &Entity) -> Goal {
        let p = person.clone();
        Goal::new("is_eligible", move |s| eligible(s, &p))
    }

    #[test]
    fn test_investigation_walks_question_by_question() {
        let mut s = Session::new();
        let jane = s.entity("jane");
        let goals = vec![eligibility_goal(&jane)];

        let report = investigate(&mut s, &goals);
        assert!(!report.complete);
        let q1 = report.next_question.unwrap();
        assert_eq!(q1.to_string(), "is_married(jane)?");
        assert_eq!(report.percent_complete, 0);

        s.assert_answer(&q1, AnswerKind::Bool, "yes").unwrap();
        let report = investigate(&mut s, &goals);
        assert!(!report.complete);
        let q2 = report.next_question.unwrap();
        assert_eq!(q2.to_string(), "is_resident(jane)?");

        s.assert_answer(&q2, AnswerKind::Bool, "yes").unwrap();
        let report = investigate(&mut s, &goals);
        assert!(report.complete);
        assert!(report.next_question.is_none());
        assert_eq!(report.percent_complete, 100);
        assert_eq!(report.goals[0].value.to_text(), "true");
    }

    #[test]
    fn test_decisive_answer_settles_goal_early() {
        let mut s = Session::new();
        let jane = s.entity("jane");
        let goals = vec![eligibility_goal(&jane)];

        let report = investigate(&mut s, &goals);
        let q1 = report.next_question.unwrap();
        s.assert_answer(&q1, AnswerKind::Bool, "no").unwrap();

        // A false conjunct decides the goal; no more questions needed.
        let report = investigate(&mut s, &goals);
        assert!(report.complete);
        assert_eq!(report.goals[0].value.to_text(), "false");
    }

    #[test]
    fn test_uncertain_answers_leave_no_next_question() {
        let mut s = Session::new();
        let jane = s.entity("jane");
        let goals = vec![eligibility_goal(&jane)];

        let report = investigate(&mut s, &goals);
        let q1 = report.next_question.unwrap();
        s.assert_answer(&q1, AnswerKind::Bool, "Uncertain").unwrap();
        let report = investigate(&mut s, &goals);
        let q2 = report.next_question.unwrap();
        s.assert_answer(&q2, AnswerKind::Bool, "Uncertain").unwrap();

        // Both leaves were asked and came back unusable: the expected
        // steady state is an unresolved goal with nothing left to ask.
        let report = investigate(&mut s, &goals);
        assert!(!report.complete);
        assert!(report.next_question.is_none());
        assert_eq!(report.percent_complete, 100);
        assert!(!report.goals[0].value.is_ever_true());
    }

    #[test]
    fn test_shared_subquestion_is_asked_once() {
        let mut s = Session::new();
        let jane = s.entity("jane");
        let j1 = jane.clone();
        let j2 = jane.clone();
        let goals = vec![
            Goal::new("married_goal", move |s| {
                s.ask("is_married", &[&j1], |_| TBool::unstated())
            }),
            Goal::new("married_again_goal", move |s| {
                s.ask("is_married", &[&j2], |_| TBool::unstated())
            }),
        ];

        let report = investigate(&mut s, &goals);
        assert!(!report.complete);
        assert_eq!(s.pending().len(), 1);
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(1, 2), 33);
        assert_eq!(percent(1, 1), 50);
        assert_eq!(percent(2, 1), 67);
    }
}
