//! Conditions and guards for IF/UNLESS combinators

use std::fmt;
use std::sync::Arc;

use crate::filter::{Filter, FilterExt, Step};
use crate::rule::Rule;
use crate::{ErrorKind, ErrorRecord, Validation, Value};

/// The distinguished condition of an IF/UNLESS combinator.
#[derive(Clone)]
pub enum Condition {
    /// A fixed value; must be a `Bool`
    Literal(Value),
    /// Holds when the rule evaluates to `true`
    Rule(Arc<dyn Rule>),
    /// Holds when the filter accepts the subject
    Filter(Step),
    /// Computed from the subject; must produce a `Bool`
    Computed(Arc<dyn Fn(&Value) -> Value + Send + Sync>),
}

impl Condition {
    /// A condition backed by a rule.
    pub fn rule<R: Rule + 'static>(rule: R) -> Self {
        Condition::Rule(Arc::new(rule))
    }

    /// A condition backed by a filter.
    pub fn filter<F: Filter + 'static>(filter: F) -> Self {
        Condition::Filter(Arc::new(filter))
    }

    /// A condition computed from the subject.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Condition::Computed(Arc::new(f))
    }

    /// Evaluate the condition against `subject`.
    ///
    /// A literal or computed condition that is not a `Bool` fails with
    /// `INVALID_CONDITION`. Faults from a rule or filter propagate unchanged.
    ///
    /// ```rust
    /// use sluice::combinator::Condition;
    /// use sluice::{ErrorKind, Value};
    ///
    /// let positive = Condition::rule(|v: &Value| v.as_int().is_some_and(|i| i > 0));
    /// assert_eq!(positive.holds(&Value::Int(3)), Ok(true));
    ///
    /// let broken = Condition::Literal(Value::from("yes"));
    /// assert_eq!(broken.holds(&Value::Null).unwrap_err().kind(), &ErrorKind::InvalidCondition);
    /// ```
    pub fn holds(&self, subject: &Value) -> Result<bool, ErrorRecord> {
        match self {
            Condition::Literal(value) => value
                .as_bool()
                .ok_or_else(|| ErrorRecord::invalid_condition(value)),
            Condition::Rule(rule) => rule.evaluate(subject),
            Condition::Filter(filter) => match filter.apply(subject.clone()) {
                Validation::Success(_) => Ok(true),
                Validation::Failure(err) if err.is_fault() => Err(err),
                Validation::Failure(_) => Ok(false),
            },
            Condition::Computed(f) => {
                let value = f(subject);
                value
                    .as_bool()
                    .ok_or_else(|| ErrorRecord::invalid_condition(&value))
            }
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Literal(Value::Bool(value))
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Condition::Literal(value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(value) => write!(f, "{}", value),
            Condition::Rule(rule) => f.write_str(&rule.describe()),
            Condition::Filter(filter) => f.write_str(&filter.describe()),
            Condition::Computed(_) => f.write_str("computed"),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Condition::Rule(rule) => f.debug_tuple("Rule").field(&rule.describe()).finish(),
            Condition::Filter(filter) => {
                f.debug_tuple("Filter").field(&filter.describe()).finish()
            }
            Condition::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Polarity of a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardKind {
    /// Members are checked only when the condition holds
    If,
    /// Members are checked only when the condition does not hold
    Unless,
}

impl GuardKind {
    /// The error kind reported when the guarded members fail.
    pub fn failure_kind(self) -> ErrorKind {
        match self {
            GuardKind::If => ErrorKind::NotIf,
            GuardKind::Unless => ErrorKind::NotUnless,
        }
    }
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardKind::If => f.write_str("IF"),
            GuardKind::Unless => f.write_str("UNLESS"),
        }
    }
}

/// A condition with a polarity, in front of guarded members.
#[derive(Debug, Clone)]
pub struct Guard {
    /// IF or UNLESS
    pub kind: GuardKind,
    /// The distinguished condition
    pub condition: Condition,
}

impl Guard {
    /// IF: guarded members apply when `condition` holds.
    pub fn when(condition: impl Into<Condition>) -> Self {
        Guard {
            kind: GuardKind::If,
            condition: condition.into(),
        }
    }

    /// UNLESS: guarded members apply when `condition` does not hold.
    pub fn unless(condition: impl Into<Condition>) -> Self {
        Guard {
            kind: GuardKind::Unless,
            condition: condition.into(),
        }
    }

    /// Whether the guarded members must be evaluated for `subject`.
    ///
    /// When this is `false` the combinator passes without looking at its
    /// members.
    pub fn engages(&self, subject: &Value) -> Result<bool, ErrorRecord> {
        let holds = self.condition.holds(subject)?;
        Ok(match self.kind {
            GuardKind::If => holds,
            GuardKind::Unless => !holds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Is;
    use crate::ValueKind;

    #[test]
    fn test_literal_condition() {
        assert_eq!(Condition::from(true).holds(&Value::Null), Ok(true));
        assert_eq!(Condition::from(false).holds(&Value::Null), Ok(false));
        assert_eq!(
            Condition::Literal(Value::Int(1))
                .holds(&Value::Null)
                .unwrap_err()
                .kind(),
            &ErrorKind::InvalidCondition
        );
    }

    #[test]
    fn test_filter_condition() {
        let is_int = Condition::filter(Is::new(ValueKind::Int));
        assert_eq!(is_int.holds(&Value::Int(3)), Ok(true));
        assert_eq!(is_int.holds(&Value::from("3")), Ok(false));
    }

    #[test]
    fn test_computed_condition_must_be_bool() {
        let flag = Condition::computed(|v: &Value| v.get("enabled").cloned().unwrap_or_default());
        let on = Value::record([("enabled", Value::Bool(true))]);
        let bad = Value::record([("enabled", Value::from("on"))]);

        assert_eq!(flag.holds(&on), Ok(true));
        assert_eq!(
            flag.holds(&bad).unwrap_err().kind(),
            &ErrorKind::InvalidCondition
        );
    }

    #[test]
    fn test_guard_polarity() {
        let subject = Value::Int(1);
        assert_eq!(Guard::when(true).engages(&subject), Ok(true));
        assert_eq!(Guard::when(false).engages(&subject), Ok(false));
        assert_eq!(Guard::unless(true).engages(&subject), Ok(false));
        assert_eq!(Guard::unless(false).engages(&subject), Ok(true));
    }
}
