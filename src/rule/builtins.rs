//! Leaf predicates bundled with the crate
//!
//! These cover comparisons and kind checks. Each constructor returns a
//! [`PredicateRule`] with its argument already bound; the same invocables are
//! registered by name in [`Registry::with_builtins`](crate::Registry::with_builtins).

use std::cmp::Ordering;
use std::sync::Arc;

use super::{PredicateFn, PredicateRule};
use crate::error::BoxError;
use crate::{Value, ValueKind};

/// Checks the bound arguments of a bundled predicate when it is built.
pub(crate) type ArgCheck = fn(&[Value]) -> Result<(), String>;

fn one_bound(args: &[Value]) -> Result<(), String> {
    match args.len() {
        1 => Ok(()),
        n => Err(format!("takes 1 argument, got {}", n)),
    }
}

fn list_bound(args: &[Value]) -> Result<(), String> {
    one_bound(args)?;
    match args[0].as_list() {
        Some(_) => Ok(()),
        None => Err(format!("needs a list of allowed values, got {}", args[0])),
    }
}

fn kind_bound(args: &[Value]) -> Result<(), String> {
    one_bound(args)?;
    match args[0].as_str().and_then(ValueKind::from_name) {
        Some(_) => Ok(()),
        None => Err(format!("needs a kind name, got {}", args[0])),
    }
}

fn bound<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, BoxError> {
    args.first()
        .ok_or_else(|| format!("{} needs one bound argument", name).into())
}

fn ordered(name: &'static str, accept: fn(Ordering) -> bool) -> PredicateFn {
    Arc::new(move |subject: &Value, args: &[Value]| -> Result<bool, BoxError> {
        let limit = bound(name, args)?;
        let ordering = subject.compare(limit).ok_or_else(|| {
            format!("cannot compare {} with {}", subject.kind(), limit.kind())
        })?;
        Ok(accept(ordering))
    })
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match a.compare(b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

fn equal_to_fn() -> PredicateFn {
    Arc::new(|subject: &Value, args: &[Value]| -> Result<bool, BoxError> {
        Ok(loosely_equal(subject, bound("equal_to", args)?))
    })
}

fn one_of_fn() -> PredicateFn {
    Arc::new(|subject: &Value, args: &[Value]| -> Result<bool, BoxError> {
        let allowed = bound("one_of", args)?
            .as_list()
            .ok_or("one_of needs a list of allowed values")?;
        Ok(allowed.iter().any(|candidate| loosely_equal(subject, candidate)))
    })
}

fn is_type_fn() -> PredicateFn {
    Arc::new(|subject: &Value, args: &[Value]| -> Result<bool, BoxError> {
        let name = bound("is_type", args)?
            .as_str()
            .ok_or("is_type needs a kind name")?;
        let kind = ValueKind::from_name(name).ok_or_else(|| format!("unknown kind '{}'", name))?;
        Ok(subject.kind() == kind)
    })
}

/// Name, invocable and argument check of every bundled predicate.
pub(crate) fn builtin_predicates() -> Vec<(&'static str, PredicateFn, ArgCheck)> {
    vec![
        ("greater_than", ordered("greater_than", Ordering::is_gt), one_bound),
        ("less_than", ordered("less_than", Ordering::is_lt), one_bound),
        ("at_least", ordered("at_least", Ordering::is_ge), one_bound),
        ("at_most", ordered("at_most", Ordering::is_le), one_bound),
        ("equal_to", equal_to_fn(), one_bound),
        ("one_of", one_of_fn(), list_bound),
        ("is_type", is_type_fn(), kind_bound),
    ]
}

/// Subject is strictly greater than `limit`.
pub fn greater_than(limit: impl Into<Value>) -> PredicateRule {
    PredicateRule::from_fn(
        "greater_than",
        ordered("greater_than", Ordering::is_gt),
        vec![limit.into()],
    )
}

/// Subject is strictly less than `limit`.
pub fn less_than(limit: impl Into<Value>) -> PredicateRule {
    PredicateRule::from_fn(
        "less_than",
        ordered("less_than", Ordering::is_lt),
        vec![limit.into()],
    )
}

/// Subject is greater than or equal to `limit`.
pub fn at_least(limit: impl Into<Value>) -> PredicateRule {
    PredicateRule::from_fn(
        "at_least",
        ordered("at_least", Ordering::is_ge),
        vec![limit.into()],
    )
}

/// Subject is less than or equal to `limit`.
pub fn at_most(limit: impl Into<Value>) -> PredicateRule {
    PredicateRule::from_fn(
        "at_most",
        ordered("at_most", Ordering::is_le),
        vec![limit.into()],
    )
}

/// Subject equals `expected`; `Int` and `Float` compare numerically.
pub fn equal_to(expected: impl Into<Value>) -> PredicateRule {
    PredicateRule::from_fn("equal_to", equal_to_fn(), vec![expected.into()])
}

/// Subject equals one of `allowed`.
pub fn one_of<I>(allowed: I) -> PredicateRule
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    PredicateRule::from_fn("one_of", one_of_fn(), vec![Value::list(allowed)])
}

/// Subject is of `kind`.
pub fn is_type(kind: ValueKind) -> PredicateRule {
    PredicateRule::from_fn("is_type", is_type_fn(), vec![Value::from(kind.name())])
}
