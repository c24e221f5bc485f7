//! Boolean rules and rulesets
//!
//! A [`Rule`] is a boolean test of a subject value. Leaf rules wrap an
//! invocable with bound arguments ([`PredicateRule`]); a [`Ruleset`] combines
//! rules under a pass-count [`Mode`](crate::combinator::Mode) or behind an
//! IF/UNLESS [`Guard`](crate::combinator::Guard).
//!
//! # Example
//!
//! ```rust
//! use sluice::rule::{greater_than, less_than, Ruleset};
//! use sluice::combinator::Mode;
//! use sluice::Value;
//!
//! let in_range = Ruleset::builder(Mode::All)
//!     .rule(greater_than(0))
//!     .rule(less_than(10))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(in_range.check(&Value::Int(5)), Ok(true));
//! assert_eq!(in_range.check(&Value::Int(15)), Ok(false));
//! ```

mod builtins;
mod predicate;
mod ruleset;

pub use builtins::{at_least, at_most, equal_to, greater_than, is_type, less_than, one_of};
pub use predicate::{PredicateFn, PredicateRule};
pub use ruleset::{Ruleset, RulesetBuilder};

pub(crate) use builtins::{builtin_predicates, ArgCheck};

use std::sync::Arc;

use crate::combinator::Mode;
use crate::{ErrorRecord, Value};

/// A boolean test of a subject value.
///
/// Returning `Ok(false)` is an ordinary outcome, never an error. `Err` is
/// reserved for faults such as a failing invocable (`BAD_CALL`) or a
/// non-boolean condition (`INVALID_CONDITION`).
pub trait Rule: Send + Sync {
    /// Evaluate the rule against `subject`.
    fn evaluate(&self, subject: &Value) -> Result<bool, ErrorRecord>;

    /// Short description used in error context and debug output.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

// Blanket impl for closures
impl<F> Rule for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    #[inline]
    fn evaluate(&self, subject: &Value) -> Result<bool, ErrorRecord> {
        Ok(self(subject))
    }
}

/// Extension methods for composing rules.
///
/// ```rust
/// use sluice::rule::{greater_than, less_than, RuleExt};
/// use sluice::Value;
///
/// let outside = greater_than(0).and(less_than(10)).not();
/// assert_eq!(outside.evaluate(&Value::Int(50)), Ok(true));
/// # use sluice::rule::Rule;
/// ```
pub trait RuleExt: Rule + Sized {
    /// Invert the rule.
    fn not(self) -> Not<Self> {
        Not(self)
    }

    /// Both rules must pass (ALL of the two).
    fn and<R: Rule + 'static>(self, other: R) -> Ruleset
    where
        Self: 'static,
    {
        Ruleset::pair(Mode::All, self.shared(), Arc::new(other))
    }

    /// Either rule must pass (ANY of the two).
    fn or<R: Rule + 'static>(self, other: R) -> Ruleset
    where
        Self: 'static,
    {
        Ruleset::pair(Mode::Any, self.shared(), Arc::new(other))
    }

    /// Move the rule behind an `Arc` so it can be a ruleset member.
    fn shared(self) -> Arc<dyn Rule>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<R: Rule> RuleExt for R {}

/// NOT combinator - inverts the inner rule's result.
///
/// The inner rule is evaluated exactly once; faults pass through unchanged.
#[derive(Clone, Copy, Debug)]
pub struct Not<R>(pub R);

impl<R: Rule> Rule for Not<R> {
    #[inline]
    fn evaluate(&self, subject: &Value) -> Result<bool, ErrorRecord> {
        self.0.evaluate(subject).map(|passed| !passed)
    }

    fn describe(&self) -> String {
        format!("not({})", self.0.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_as_rule() {
        let is_even = |v: &Value| v.as_int().is_some_and(|i| i % 2 == 0);
        assert_eq!(is_even.evaluate(&Value::Int(4)), Ok(true));
        assert_eq!(is_even.evaluate(&Value::Int(3)), Ok(false));
    }

    #[test]
    fn test_not_evaluates_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rule = move |_: &Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        };

        assert_eq!(rule.not().evaluate(&Value::Null), Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_not_keeps_faults() {
        let rule = PredicateRule::new("boom", |_: &Value, _: &[Value]| Err("boom".into()), vec![]);
        let err = rule.not().evaluate(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), &crate::ErrorKind::BadCall);
    }

    #[test]
    fn test_and_or() {
        let both = greater_than(0).and(less_than(10));
        let either = less_than(0).or(greater_than(100));

        assert_eq!(both.evaluate(&Value::Int(5)), Ok(true));
        assert_eq!(both.evaluate(&Value::Int(10)), Ok(false));
        assert_eq!(either.evaluate(&Value::Int(-5)), Ok(true));
        assert_eq!(either.evaluate(&Value::Int(50)), Ok(false));
    }

    #[test]
    fn test_describe_not() {
        assert_eq!(greater_than(0).not().describe(), "not(greater_than(0))");
    }
}
