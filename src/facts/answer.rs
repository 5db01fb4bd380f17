//! Turning raw user answers into fact values.
//!
//! A raw answer is either a bare literal (an eternal known value), a
//! state name (`Unstated`, `Uncertain`, `Stub`), or a timeline literal
//! in the same form [`Timeline::to_text`] renders:
//! `{Dawn: v; 2015-06-12: v2}`.
//!
//! [`Timeline::to_text`]: crate::Timeline::to_text

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::ValidationError;
use crate::facts::{Question, Session};
use crate::state::Knowledge;
use crate::time::dawn;
use crate::timeline::Timeline;
use crate::value::{EpistemicValue, Value};
use crate::variant::TValue;

/// The variant an answer is expected to parse into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// `true`/`yes` or `false`/`no`.
    Bool,
    /// A decimal literal.
    Number,
    /// A `%Y-%m-%d` date.
    Date,
    /// Verbatim text.
    Text,
    /// A comma-separated entity list, optionally bracketed.
    Set,
}

impl AnswerKind {
    /// The variant name, matching [`TValue::kind`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Date => "date",
            Self::Text => "text",
            Self::Set => "set",
        }
    }
}

impl Session {
    /// Parses a raw answer to a pending question and asserts it.
    ///
    /// The assertion drops the question from the pending queue and runs
    /// assumption inference like any other assertion.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the raw text does not parse
    /// as `kind`; nothing is asserted in that case.
    pub fn assert_answer(
        &mut self,
        question: &Question,
        kind: AnswerKind,
        raw: &str,
    ) -> Result<(), ValidationError> {
        let value = parse_answer(kind, raw, &mut |name| self.entity(name))?;
        let args: Vec<&Entity> = question.args().iter().collect();
        self.assert_fact(question.relation(), &args, value);
        Ok(())
    }
}

/// Parses a raw answer into a fact value.
///
/// `resolve` maps entity names in a set answer to session entities.
///
/// # Errors
///
/// Returns a [`ValidationError`] on any literal that does not parse as
/// `kind`, or on a malformed timeline literal.
pub fn parse_answer(
    kind: AnswerKind,
    raw: &str,
    resolve: &mut dyn FnMut(&str) -> Entity,
) -> Result<TValue, ValidationError> {
    let trimmed = raw.trim();
    let timeline = if trimmed.starts_with('{') {
        parse_timeline_literal(kind, trimmed, resolve)?
    } else {
        Timeline::eternal(parse_entry(kind, trimmed, resolve)?)
    };
    Ok(TValue::from_timeline_of(kind.name(), timeline))
}

fn parse_timeline_literal(
    kind: AnswerKind,
    raw: &str,
    resolve: &mut dyn FnMut(&str) -> Entity,
) -> Result<Timeline, ValidationError> {
    let malformed = |reason: &str| ValidationError::TimelineLiteral {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };
    let inner = raw
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| malformed("missing closing brace"))?;

    let mut out: Option<Timeline> = None;
    let mut last: Option<DateTime<Utc>> = None;
    for segment in inner.split(';') {
        let (key, value) = segment
            .split_once(':')
            .ok_or_else(|| malformed("expected `<breakpoint>: <value>` segments"))?;
        let entry = parse_entry(kind, value.trim(), resolve)?;
        let at = parse_breakpoint(key.trim())?;
        match &mut out {
            None => {
                if at != dawn() {
                    return Err(malformed("the first breakpoint must be Dawn"));
                }
                out = Some(Timeline::eternal(entry));
            }
            Some(t) => {
                if last.is_some_and(|prev| at <= prev) {
                    return Err(malformed("breakpoints must be strictly increasing"));
                }
                t.push(at, entry);
            }
        }
        last = Some(at);
    }
    out.ok_or_else(|| malformed("no segments"))
}

fn parse_breakpoint(key: &str) -> Result<DateTime<Utc>, ValidationError> {
    if key == "Dawn" {
        return Ok(dawn());
    }
    parse_date(key).map_err(|_| ValidationError::Breakpoint {
        raw: key.to_string(),
    })
}

fn parse_entry(
    kind: AnswerKind,
    raw: &str,
    resolve: &mut dyn FnMut(&str) -> Entity,
) -> Result<EpistemicValue, ValidationError> {
    // A bare state name answers "I don't know" at any granularity; the
    // Switch sentinel is not accepted from outside.
    if let Some(state) = Knowledge::parse(raw) {
        if state.is_unknown() {
            return Ok(EpistemicValue::of_state(state));
        }
        return Err(answer_error(kind, raw));
    }
    let value = match kind {
        AnswerKind::Bool => Value::Bool(parse_bool(raw).ok_or_else(|| answer_error(kind, raw))?),
        AnswerKind::Number => Value::Number(
            raw.parse::<Decimal>()
                .map_err(|_| answer_error(kind, raw))?,
        ),
        AnswerKind::Date => Value::Date(parse_date(raw).map_err(|_| answer_error(kind, raw))?),
        AnswerKind::Text => Value::Text(raw.to_string()),
        AnswerKind::Set => parse_members(raw, resolve),
    };
    Ok(EpistemicValue::known(value))
}

fn answer_error(kind: AnswerKind, raw: &str) -> ValidationError {
    ValidationError::Answer {
        kind: kind.name(),
        raw: raw.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

fn parse_members(raw: &str, resolve: &mut dyn FnMut(&str) -> Entity) -> Value {
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(raw);
    let members: Vec<Entity> = inner
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| resolve(name))
        .collect();
    Value::Members(members)
}
