//! Leaf filters bundled with the crate

use std::cmp::Ordering;

use super::Filter;
use crate::rule::{PredicateRule, Rule};
use crate::{ErrorKind, ErrorRecord, Value, ValueKind};

/// Accepts values within an inclusive range, unchanged.
///
/// Values that cannot be ordered against the bounds fail with `WRONG_TYPE`;
/// values outside the range fail with `NOT_BETWEEN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Between {
    min: Value,
    max: Value,
}

impl Between {
    /// Inclusive range `[min, max]`.
    pub fn new(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Between {
            min: min.into(),
            max: max.into(),
        }
    }

    fn rejection(&self, value: &Value) -> ErrorRecord {
        ErrorRecord::new(
            ErrorKind::NotBetween,
            format!("{} is not between {} and {}", value, self.min, self.max),
        )
        .with_context("min", self.min.clone())
        .with_context("max", self.max.clone())
    }
}

impl Filter for Between {
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        let (low, high) = match (value.compare(&self.min), value.compare(&self.max)) {
            (Some(low), Some(high)) => (low, high),
            _ => {
                return Err(ErrorRecord::new(
                    ErrorKind::WrongType,
                    format!("cannot range-check a {}", value.kind()),
                )
                .with_context("expected", self.min.kind().name()))
            }
        };

        if low != Ordering::Less && high != Ordering::Greater {
            Ok(value)
        } else {
            Err(self.rejection(&value))
        }
    }

    fn describe(&self) -> String {
        format!("between({}, {})", self.min, self.max)
    }
}

/// Accepts values of one kind, unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Is(ValueKind);

impl Is {
    /// Accept only values of `kind`.
    pub fn new(kind: ValueKind) -> Self {
        Is(kind)
    }

    /// The accepted kind.
    pub fn kind(&self) -> ValueKind {
        self.0
    }
}

impl Filter for Is {
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        if value.kind() == self.0 {
            Ok(value)
        } else {
            Err(ErrorRecord::new(
                ErrorKind::WrongType,
                format!("expected {}, got {}", self.0, value.kind()),
            )
            .with_context("expected", self.0.name()))
        }
    }

    fn describe(&self) -> String {
        format!("is({})", self.0)
    }
}

/// A predicate used as a filter.
///
/// `true` accepts the value unchanged, `false` rejects it with
/// `PREDICATE_FAILED`, and a failing invocable surfaces as `BAD_CALL`.
#[derive(Debug, Clone)]
pub struct PredicateFilter(PredicateRule);

impl PredicateFilter {
    /// Wrap `rule`.
    pub fn new(rule: PredicateRule) -> Self {
        PredicateFilter(rule)
    }

    /// The wrapped rule.
    pub fn rule(&self) -> &PredicateRule {
        &self.0
    }
}

impl Filter for PredicateFilter {
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        if self.0.evaluate(&value)? {
            Ok(value)
        } else {
            Err(ErrorRecord::new(
                ErrorKind::PredicateFailed,
                format!("{} rejected {}", self.0.describe(), value),
            )
            .with_context("predicate", self.0.name()))
        }
    }

    fn describe(&self) -> String {
        self.0.describe()
    }
}

impl From<PredicateRule> for PredicateFilter {
    fn from(rule: PredicateRule) -> Self {
        PredicateFilter(rule)
    }
}
