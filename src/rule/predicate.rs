//! Leaf rules backed by an invocable with bound arguments

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::Rule;
use crate::error::BoxError;
use crate::{ErrorRecord, Value};

/// An invocable predicate: `(subject, args) -> bool`.
///
/// Returning `Ok(false)` is an ordinary rejection. `Err` means the call itself
/// went wrong and surfaces as `BAD_CALL`.
pub type PredicateFn = Arc<dyn Fn(&Value, &[Value]) -> Result<bool, BoxError> + Send + Sync>;

/// A predicate plus the trailing arguments bound at construction.
///
/// # Argument merging
///
/// Call-time arguments are left-aligned against the bound defaults: position
/// `i` takes the call-time argument when one was supplied and the default
/// otherwise. Call-time arguments beyond the defaults are appended. The
/// subject is never part of the argument list; it is passed separately.
///
/// ```rust
/// use sluice::rule::PredicateRule;
/// use sluice::Value;
///
/// let between = PredicateRule::new(
///     "between",
///     |v: &Value, args: &[Value]| {
///         let v = v.as_int().ok_or("not an int")?;
///         let (lo, hi) = (args[0].as_int().ok_or("bad lo")?, args[1].as_int().ok_or("bad hi")?);
///         Ok(lo <= v && v <= hi)
///     },
///     vec![Value::Int(0), Value::Int(10)],
/// );
///
/// assert_eq!(between.merge_args(&[Value::Int(5)]), vec![Value::Int(5), Value::Int(10)]);
/// assert_eq!(between.call(&Value::Int(7), &[]), Ok(true));
/// assert_eq!(between.call(&Value::Int(3), &[Value::Int(5)]), Ok(false));
/// ```
#[derive(Clone)]
pub struct PredicateRule {
    name: Cow<'static, str>,
    func: PredicateFn,
    defaults: Vec<Value>,
}

impl PredicateRule {
    /// Wrap `func` under `name` with bound `defaults`.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, func: F, defaults: Vec<Value>) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        Self::from_fn(name, Arc::new(func), defaults)
    }

    /// Wrap an already shared predicate.
    pub fn from_fn(name: impl Into<Cow<'static, str>>, func: PredicateFn, defaults: Vec<Value>) -> Self {
        PredicateRule {
            name: name.into(),
            func,
            defaults,
        }
    }

    /// The predicate's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arguments bound at construction.
    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }

    /// The same predicate with different bound arguments.
    pub fn with_defaults(&self, defaults: Vec<Value>) -> Self {
        PredicateRule {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
            defaults,
        }
    }

    /// Merge call-time `args` with the bound defaults.
    pub fn merge_args(&self, args: &[Value]) -> Vec<Value> {
        let mut merged = args.to_vec();
        if merged.len() < self.defaults.len() {
            merged.extend_from_slice(&self.defaults[merged.len()..]);
        }
        merged
    }

    /// Invoke the predicate on `subject` with merged arguments.
    pub fn call(&self, subject: &Value, args: &[Value]) -> Result<bool, ErrorRecord> {
        let merged = if args.is_empty() {
            Cow::Borrowed(self.defaults.as_slice())
        } else {
            Cow::Owned(self.merge_args(args))
        };

        let args: &[Value] = &merged;

        (self.func)(subject, args).map_err(|source| {
            ErrorRecord::bad_call(&self.name, source)
                .with_value(subject.clone())
                .with_context("args", args.to_vec())
        })
    }
}

impl Rule for PredicateRule {
    fn evaluate(&self, subject: &Value) -> Result<bool, ErrorRecord> {
        self.call(subject, &[])
    }

    fn describe(&self) -> String {
        let args: Vec<String> = self.defaults.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, args.join(", "))
    }
}

impl fmt::Debug for PredicateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRule")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
