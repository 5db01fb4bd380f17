//! Payload values and the tagged epistemic value.
//!
//! A `Value` is the concrete datum a timeline entry can carry; an
//! `EpistemicValue` pairs a `Knowledge` tag with an optional payload.
//! The payload is present exactly when the tag is `Known` - constructors
//! enforce the invariant, violating it is a bug in calling code.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::state::Knowledge;

/// Possible payloads a timeline entry can hold.
///
/// This is a closed sum over the five variant domains; the generic
/// algebra never inspects payload types at run time outside of it.
///
/// # Examples
///
/// ```
/// use themis::Value;
/// use rust_decimal_macros::dec;
///
/// let b = Value::Bool(true);
/// let n = Value::Number(dec!(42.5));
///
/// assert!(b.is_bool());
/// assert_eq!(n.as_number(), Some(dec!(42.5)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A truth value.
    Bool(bool),
    /// An exact decimal number.
    Number(Decimal),
    /// A calendar instant.
    Date(DateTime<Utc>),
    /// Free text.
    Text(String),
    /// An entity-set membership.
    Members(Vec<Entity>),
}

impl Value {
    /// True for a `Bool` payload.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// True for a `Number` payload.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// True for a `Date` payload.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// True for a `Text` payload.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// True for a `Members` payload.
    #[must_use]
    pub const fn is_members(&self) -> bool {
        matches!(self, Self::Members(_))
    }

    /// The boolean inside a `Bool` payload.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The decimal inside a `Number` payload.
    #[must_use]
    pub const fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The instant inside a `Date` payload.
    #[must_use]
    pub const fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// The string inside a `Text` payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The membership inside a `Members` payload.
    #[must_use]
    pub fn as_members(&self) -> Option<&[Entity]> {
        match self {
            Self::Members(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::Text(_) => "text",
            Self::Members(_) => "members",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Text(v) => write!(f, "{v}"),
            Self::Members(v) => {
                write!(f, "[")?;
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// Explicit conversions only; rule code never coerces silently.
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Number(Decimal::from(v))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<Entity>> for Value {
    fn from(v: Vec<Entity>) -> Self {
        Self::Members(v)
    }
}

/// A `Knowledge` tag plus an optional payload.
///
/// Invariant: `payload` is `Some` exactly when `state` is `Known`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpistemicValue {
    state: Knowledge,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl EpistemicValue {
    /// Wraps a concrete payload as `Known`.
    #[must_use]
    pub fn known(payload: impl Into<Value>) -> Self {
        Self {
            state: Knowledge::Known,
            payload: Some(payload.into()),
        }
    }

    /// A payload-less value in one of the non-`Known` states.
    ///
    /// # Panics
    ///
    /// Panics if `state` is `Known`; a known value must carry a payload.
    #[must_use]
    pub fn of_state(state: Knowledge) -> Self {
        assert!(
            state != Knowledge::Known,
            "a Known epistemic value must carry a payload"
        );
        Self {
            state,
            payload: None,
        }
    }

    /// The not-yet-asked placeholder.
    #[must_use]
    pub fn unstated() -> Self {
        Self::of_state(Knowledge::Unstated)
    }

    /// The asked-but-unanswered placeholder.
    #[must_use]
    pub fn uncertain() -> Self {
        Self::of_state(Knowledge::Uncertain)
    }

    /// The rule-logic-incomplete placeholder.
    #[must_use]
    pub fn stub() -> Self {
        Self::of_state(Knowledge::Stub)
    }

    /// The Switch-construction sentinel.
    #[must_use]
    pub fn null() -> Self {
        Self::of_state(Knowledge::Null)
    }

    /// The epistemic tag.
    #[must_use]
    pub const fn state(&self) -> Knowledge {
        self.state
    }

    /// The payload, present only when `Known`.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Returns true if the tag is `Known`.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.state.is_known()
    }

    /// Returns true if the tag is one of the three unknown states.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.state.is_unknown()
    }

    /// Returns true if the tag is the `Null` sentinel.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.state == Knowledge::Null
    }

    /// The payload of a `Known` value.
    ///
    /// # Panics
    ///
    /// Panics when the value is not `Known`; callers check first.
    #[must_use]
    pub fn expect_payload(&self) -> &Value {
        self.payload
            .as_ref()
            .unwrap_or_else(|| panic!("{} value has no payload", self.state))
    }
}

impl std::fmt::Display for EpistemicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "{}", self.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::date;
    use rust_decimal_macros::dec;

    #[test]
    fn test_known_carries_payload() {
        let v = EpistemicValue::known(true);
        assert!(v.is_known());
        assert_eq!(v.payload(), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_unknown_states_carry_no_payload() {
        for v in [
            EpistemicValue::unstated(),
            EpistemicValue::uncertain(),
            EpistemicValue::stub(),
            EpistemicValue::null(),
        ] {
            assert!(v.payload().is_none());
            assert!(!v.is_known());
        }
    }

    #[test]
    #[should_panic(expected = "must carry a payload")]
    fn test_known_without_payload_panics() {
        let _ = EpistemicValue::of_state(Knowledge::Known);
    }

    #[test]
    fn test_display_booleans_lower_cased() {
        assert_eq!(format!("{}", EpistemicValue::known(true)), "true");
        assert_eq!(format!("{}", EpistemicValue::known(false)), "false");
    }

    #[test]
    fn test_display_dates_and_numbers() {
        assert_eq!(
            format!("{}", Value::Date(date(2015, 4, 15))),
            "2015-04-15"
        );
        assert_eq!(format!("{}", Value::Number(dec!(1000))), "1000");
    }

    #[test]
    fn test_display_unknowns_by_name() {
        assert_eq!(format!("{}", EpistemicValue::unstated()), "Unstated");
        assert_eq!(format!("{}", EpistemicValue::stub()), "Stub");
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::from("x").type_name(), "text");
        assert_eq!(Value::from(dec!(1)).type_name(), "number");
    }

    #[test]
    fn test_value_serialization_round_trip() {
        let v = Value::Number(dec!(12.75));
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
