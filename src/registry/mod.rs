//! Name to factory registry
//!
//! A [`Registry`] maps names to filter factories and predicate invocables so
//! that definitions can be written as plain data (see [`Registry::filter_def`]
//! for the literal syntax). It is populated once at start-up and read-only
//! afterwards.
//!
//! # Example
//!
//! ```rust
//! use sluice::filter::FilterExt;
//! use sluice::{Registry, Value};
//!
//! let registry = Registry::with_builtins();
//! let between = registry.filter("between", &[Value::Int(1), Value::Int(10)]).unwrap();
//!
//! assert!(between.apply(Value::Int(4)).is_success());
//! assert!(registry.filter("no_such_filter", &[]).is_err());
//! ```

mod literal;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::filter::{Between, Conversion, FilterExt, Is, PredicateFilter, Step};
use crate::rule::{builtin_predicates, ArgCheck, PredicateFn, PredicateRule};
use crate::{ErrorRecord, Value, ValueKind};

/// Builds a filter step from its bound arguments.
pub type FilterFactory = Arc<dyn Fn(&[Value]) -> Result<Step, ErrorRecord> + Send + Sync>;

/// Named filters and predicates.
#[derive(Clone, Default)]
pub struct Registry {
    filters: HashMap<String, FilterFactory>,
    predicates: HashMap<String, PredicateFn>,
    checks: HashMap<String, ArgCheck>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the bundled conversions, leaf filters and predicates.
    ///
    /// | Name | Kind | Arguments |
    /// |---|---|---|
    /// | `to_int`, `to_float`, `to_string`, `to_bool` | filter | none |
    /// | `between` | filter | `min, max` |
    /// | `is` | filter | kind name |
    /// | `greater_than`, `less_than`, `at_least`, `at_most`, `equal_to` | predicate | limit |
    /// | `one_of` | predicate | list of values |
    /// | `is_type` | predicate | kind name |
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        for conversion in [
            Conversion::ToInt,
            Conversion::ToFloat,
            Conversion::ToStr,
            Conversion::ToBool,
        ] {
            registry.register_filter(conversion.name(), move |args: &[Value]| {
                expect_args(conversion.name(), args, 0)?;
                Ok(conversion.shared())
            });
        }

        registry.register_filter("between", |args: &[Value]| {
            expect_args("between", args, 2)?;
            Ok(Between::new(args[0].clone(), args[1].clone()).shared())
        });

        registry.register_filter("is", |args: &[Value]| {
            expect_args("is", args, 1)?;
            let kind = args[0]
                .as_str()
                .and_then(ValueKind::from_name)
                .ok_or_else(|| {
                    ErrorRecord::invalid_definition(format!("'is' needs a kind name, got {}", args[0]))
                })?;
            Ok(Is::new(kind).shared())
        });

        for (name, func, check) in builtin_predicates() {
            registry.predicates.insert(name.to_string(), func);
            registry.checks.insert(name.to_string(), check);
        }

        registry
    }

    /// Register a filter factory under `name`, replacing any previous one.
    pub fn register_filter<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Step, ErrorRecord> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(factory));
        self
    }

    /// Register a predicate invocable under `name`, replacing any previous one.
    ///
    /// ```rust
    /// use sluice::rule::Rule;
    /// use sluice::{Registry, Value};
    ///
    /// let mut registry = Registry::new();
    /// registry.register_predicate("even", |v: &Value, _: &[Value]| {
    ///     Ok(v.as_int().ok_or("not an int")? % 2 == 0)
    /// });
    ///
    /// let even = registry.rule("even", &[]).unwrap();
    /// assert_eq!(even.evaluate(&Value::Int(4)), Ok(true));
    /// ```
    pub fn register_predicate<F>(&mut self, name: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&Value, &[Value]) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.checks.remove(&name);
        self.predicates.insert(name, Arc::new(func));
        self
    }

    /// `true` if a filter factory is registered under `name`.
    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// `true` if a predicate is registered under `name`.
    pub fn has_predicate(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Build the filter `name` with bound `args`.
    ///
    /// Predicates are usable as filters: when no filter factory is registered
    /// under `name`, a predicate of that name is wrapped in a
    /// [`PredicateFilter`].
    pub fn filter(&self, name: &str, args: &[Value]) -> Result<Step, ErrorRecord> {
        if let Some(factory) = self.filters.get(name) {
            return factory(args).map_err(|err| err.with_context("filter", name));
        }
        if self.has_predicate(name) {
            return Ok(PredicateFilter::new(self.rule(name, args)?).shared());
        }
        Err(unknown_name("filter", name))
    }

    /// Build the predicate rule `name` with bound `args`.
    ///
    /// Bundled predicates check their arguments here and fail with
    /// `INVALID_DEFINITION`; predicates registered by the caller take any.
    pub fn rule(&self, name: &str, args: &[Value]) -> Result<PredicateRule, ErrorRecord> {
        let func = self
            .predicates
            .get(name)
            .ok_or_else(|| unknown_name("predicate", name))?;

        if let Some(check) = self.checks.get(name) {
            check(args).map_err(|reason| {
                ErrorRecord::invalid_definition(format!("'{}' {}", name, reason))
                    .with_context("predicate", name)
                    .with_context("args", args.to_vec())
            })?;
        }

        Ok(PredicateRule::from_fn(name.to_string(), Arc::clone(func), args.to_vec()))
    }
}

fn unknown_name(what: &str, name: &str) -> ErrorRecord {
    ErrorRecord::invalid_definition(format!("no {} registered as '{}'", what, name))
        .with_context("name", name)
}

fn expect_args(name: &str, args: &[Value], count: usize) -> Result<(), ErrorRecord> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ErrorRecord::invalid_definition(format!(
            "'{}' takes {} argument(s), got {}",
            name,
            count,
            args.len()
        ))
        .with_context("args", args.to_vec()))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        let mut predicates: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        filters.sort_unstable();
        predicates.sort_unstable();
        f.debug_struct("Registry")
            .field("filters", &filters)
            .field("predicates", &predicates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use crate::ErrorKind;

    #[test]
    fn test_builtins_registered() {
        let registry = Registry::with_builtins();
        for name in ["to_int", "to_float", "to_string", "to_bool", "between", "is"] {
            assert!(registry.has_filter(name), "missing filter {}", name);
        }
        for name in ["greater_than", "less_than", "one_of", "is_type"] {
            assert!(registry.has_predicate(name), "missing predicate {}", name);
        }
    }

    #[test]
    fn test_conversion_rejects_args() {
        let registry = Registry::with_builtins();
        let err = registry.filter("to_int", &[Value::Int(1)]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidDefinition);
        assert_eq!(err.context_value("filter"), Some(&Value::from("to_int")));
    }

    #[test]
    fn test_is_needs_known_kind() {
        let registry = Registry::with_builtins();
        assert!(registry.filter("is", &[Value::from("int")]).is_ok());
        assert_eq!(
            registry.filter("is", &[Value::from("integer")]).unwrap_err().kind(),
            &ErrorKind::InvalidDefinition
        );
    }

    #[test]
    fn test_bundled_predicate_arguments_checked_when_built() {
        let registry = Registry::with_builtins();

        let err = registry.rule("greater_than", &[]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidDefinition);
        assert_eq!(err.context_value("predicate"), Some(&Value::from("greater_than")));

        let err = registry.filter("is_type", &[Value::from("integer")]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidDefinition);
        assert!(registry.rule("one_of", &[Value::Int(1)]).is_err());
        assert!(registry.rule("is_type", &[Value::from("int")]).is_ok());
    }

    #[test]
    fn test_predicate_as_filter() {
        let registry = Registry::with_builtins();
        let positive = registry.filter("greater_than", &[Value::Int(0)]).unwrap();
        assert!(positive.apply(Value::Int(1)).is_success());
        assert_eq!(
            positive.apply(Value::Int(-1)).err().unwrap().kind(),
            &ErrorKind::PredicateFailed
        );
    }

    #[test]
    fn test_unknown_names() {
        let registry = Registry::new();
        assert_eq!(
            registry.filter("to_int", &[]).unwrap_err().kind(),
            &ErrorKind::InvalidDefinition
        );
        assert!(registry.rule("greater_than", &[]).is_err());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::with_builtins();
        registry.register_predicate("greater_than", |_: &Value, _: &[Value]| Ok(true));
        let rule = registry.rule("greater_than", &[Value::Int(100)]).unwrap();
        assert_eq!(rule.evaluate(&Value::Int(1)), Ok(true));
    }

    #[test]
    fn test_debug_lists_names() {
        let debug = format!("{:?}", Registry::with_builtins());
        assert!(debug.contains("between"));
        assert!(debug.contains("one_of"));
    }
}
