//! Definitions written as plain data
//!
//! | Literal | Meaning |
//! |---|---|
//! | `"name"` | registered filter or predicate, no bound arguments |
//! | `1` ... `4` | built-in conversion by code |
//! | `["name", arg, ...]` | registered filter or predicate with bound arguments |
//! | `[def, def, ...]` | nested list, applied as a chain |
//! | `{"all": [def, ...]}` | also `any`, `none`, `one` |
//! | `{"at_least": {"count": n, "members": [def, ...]}}` | also `at_most`, `exactly` |
//! | `{"if": {"condition": def, "then": [def, ...]}}` | also `unless` |
//! | `{"not": def}` | rules only |
//!
//! A list whose head is a string is always an invocation, so a chain that
//! starts with a named filter must wrap it: `[["to_int"], ["between", 0, 9]]`.
//! A condition may also be a literal `true` or `false`.

use std::sync::Arc;

use super::Registry;
use crate::combinator::{Condition, Guard, Mode};
use crate::filter::{FilterChain, FilterCombinator, FilterDef, FilterMap, FilterMapBuilder};
use crate::rule::{Rule, Ruleset};
use crate::{ErrorRecord, Record, Value};

impl Registry {
    /// Parse a filter definition.
    ///
    /// ```rust
    /// use sluice::filter::FilterExt;
    /// use sluice::{ErrorKind, Registry, Value};
    ///
    /// let registry = Registry::with_builtins();
    /// let literal = Value::list([Value::Int(1), Value::list([Value::from("between"), 1.into(), 10.into()])]);
    /// let chain = registry.filter_def(&literal).unwrap().normalize().unwrap();
    ///
    /// assert_eq!(chain.try_apply(Value::from("7")), Ok(Value::Int(7)));
    /// assert_eq!(chain.try_apply(Value::from("50")).unwrap_err().kind(), &ErrorKind::NotBetween);
    /// ```
    pub fn filter_def(&self, literal: &Value) -> Result<FilterDef, ErrorRecord> {
        match literal {
            Value::Str(name) => Ok(FilterDef::Leaf(self.filter(name, &[])?)),
            Value::Int(code) => Ok(FilterDef::Conversion(*code)),
            Value::List(items) => match items.split_first() {
                Some((Value::Str(name), args)) => Ok(FilterDef::Leaf(self.filter(name, args)?)),
                _ => Ok(FilterDef::List(self.filter_defs(literal)?)),
            },
            Value::Map(fields) => {
                let (key, body) = single_entry(fields)?;
                let combinator = match key {
                    "if" | "unless" => {
                        let (condition, then) = guard_parts(key, body)?;
                        let condition = match condition {
                            Value::Bool(b) => Condition::from(*b),
                            other => Condition::Filter(self.filter_def(other)?.normalize()?),
                        };
                        let guard = if key == "if" {
                            Guard::when(condition)
                        } else {
                            Guard::unless(condition)
                        };
                        FilterCombinator::guarded(guard, self.filter_defs(then)?)?
                    }
                    _ => {
                        let (mode, members) = counted_parts(key, body)?;
                        FilterCombinator::new(mode, self.filter_defs(members)?)?
                    }
                };
                Ok(FilterDef::from(combinator))
            }
            other => Err(malformed("filter", other)),
        }
    }

    /// Parse a list of filter definitions.
    pub fn filter_defs(&self, literal: &Value) -> Result<Vec<FilterDef>, ErrorRecord> {
        literal
            .as_list()
            .ok_or_else(|| malformed("filter list", literal))?
            .iter()
            .map(|item| self.filter_def(item))
            .collect()
    }

    /// Parse a filter chain from a single definition or a list of them.
    pub fn filter_chain(&self, literal: &Value) -> Result<FilterChain, ErrorRecord> {
        FilterChain::new([self.filter_def(literal)?])
    }

    /// Parse a record of field definitions into a map builder, so the
    /// strategy can still be configured.
    pub fn filter_map_builder(&self, literal: &Value) -> Result<FilterMapBuilder, ErrorRecord> {
        let fields = literal
            .as_record()
            .ok_or_else(|| malformed("filter map", literal))?;

        let mut builder = FilterMap::builder();
        for (field, def) in fields {
            let chain = self
                .filter_chain(def)
                .map_err(|err| err.with_context("field", field.as_str()))?;
            builder = builder.chain(field.as_str(), chain);
        }
        Ok(builder)
    }

    /// Parse a record of field definitions into a partial [`FilterMap`].
    ///
    /// ```rust
    /// use sluice::filter::FilterExt;
    /// use sluice::{Registry, Value};
    ///
    /// let registry = Registry::with_builtins();
    /// let person = registry
    ///     .filter_map(&Value::record([
    ///         ("age", Value::list([Value::Int(1), Value::list([Value::from("between"), 0.into(), 120.into()])])),
    ///         ("name", Value::from("to_string")),
    ///     ]))
    ///     .unwrap();
    ///
    /// let out = person.try_apply(Value::record([("age", Value::from("30")), ("name", Value::from(42))]));
    /// assert_eq!(out, Ok(Value::record([("age", Value::Int(30)), ("name", Value::from("42"))])));
    /// ```
    pub fn filter_map(&self, literal: &Value) -> Result<FilterMap, ErrorRecord> {
        self.filter_map_builder(literal)?.build()
    }

    /// Parse a rule definition.
    ///
    /// A bare list of rules is ALL of them.
    ///
    /// ```rust
    /// use sluice::rule::Rule;
    /// use sluice::{Registry, Value};
    ///
    /// let registry = Registry::with_builtins();
    /// let in_range = registry
    ///     .rule_def(&Value::record([(
    ///         "all",
    ///         Value::list([
    ///             Value::list([Value::from("greater_than"), 0.into()]),
    ///             Value::list([Value::from("less_than"), 10.into()]),
    ///         ]),
    ///     )]))
    ///     .unwrap();
    ///
    /// assert_eq!(in_range.evaluate(&Value::Int(5)), Ok(true));
    /// assert_eq!(in_range.evaluate(&Value::Int(15)), Ok(false));
    /// ```
    pub fn rule_def(&self, literal: &Value) -> Result<Arc<dyn Rule>, ErrorRecord> {
        match literal {
            Value::Str(name) => Ok(Arc::new(self.rule(name, &[])?)),
            Value::List(items) => match items.split_first() {
                Some((Value::Str(name), args)) => Ok(Arc::new(self.rule(name, args)?)),
                _ => Ok(Arc::new(Ruleset::new(Mode::All, self.rule_defs(literal)?)?)),
            },
            Value::Map(fields) => {
                let (key, body) = single_entry(fields)?;
                match key {
                    // NONE of a single rule is its negation
                    "not" => Ok(Arc::new(Ruleset::new(Mode::None, vec![self.rule_def(body)?])?)),
                    "if" | "unless" => {
                        let (condition, then) = guard_parts(key, body)?;
                        let condition = match condition {
                            Value::Bool(b) => Condition::from(*b),
                            other => Condition::Rule(self.rule_def(other)?),
                        };
                        let guard = if key == "if" {
                            Guard::when(condition)
                        } else {
                            Guard::unless(condition)
                        };
                        Ok(Arc::new(Ruleset::guarded(guard, self.rule_defs(then)?)))
                    }
                    _ => {
                        let (mode, members) = counted_parts(key, body)?;
                        Ok(Arc::new(Ruleset::new(mode, self.rule_defs(members)?)?))
                    }
                }
            }
            other => Err(malformed("rule", other)),
        }
    }

    /// Parse a list of rule definitions.
    pub fn rule_defs(&self, literal: &Value) -> Result<Vec<Arc<dyn Rule>>, ErrorRecord> {
        literal
            .as_list()
            .ok_or_else(|| malformed("rule list", literal))?
            .iter()
            .map(|item| self.rule_def(item))
            .collect()
    }
}

fn malformed(what: &str, literal: &Value) -> ErrorRecord {
    ErrorRecord::invalid_definition(format!("malformed {} definition: {}", what, literal))
        .with_value(literal.clone())
}

fn single_entry(fields: &Record) -> Result<(&str, &Value), ErrorRecord> {
    let mut entries = fields.iter();
    match (entries.next(), entries.next()) {
        (Some((key, body)), None) => Ok((key.as_str(), body)),
        _ => Err(ErrorRecord::invalid_definition(format!(
            "a combinator literal needs exactly one key, got {}",
            fields.len()
        ))
        .with_context("keys", Value::list(fields.keys().cloned()))),
    }
}

fn field<'a>(body: &'a Value, key: &'static str, combinator: &str) -> Result<&'a Value, ErrorRecord> {
    body.get(key).ok_or_else(|| {
        ErrorRecord::invalid_definition(format!("'{}' needs a '{}' entry", combinator, key))
            .with_value(body.clone())
    })
}

fn guard_parts<'a>(key: &str, body: &'a Value) -> Result<(&'a Value, &'a Value), ErrorRecord> {
    Ok((field(body, "condition", key)?, field(body, "then", key)?))
}

fn counted_parts<'a>(key: &str, body: &'a Value) -> Result<(Mode, &'a Value), ErrorRecord> {
    let count = || -> Result<usize, ErrorRecord> {
        let raw = field(body, "count", key)?;
        raw.as_int()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                ErrorRecord::invalid_definition(format!("'{}' count must be a non-negative int", key))
                    .with_value(raw.clone())
            })
    };

    match key {
        "all" => Ok((Mode::All, body)),
        "any" => Ok((Mode::Any, body)),
        "none" => Ok((Mode::None, body)),
        "one" => Ok((Mode::One, body)),
        "at_least" => Ok((Mode::AtLeast(count()?), field(body, "members", key)?)),
        "at_most" => Ok((Mode::AtMost(count()?), field(body, "members", key)?)),
        "exactly" => Ok((Mode::Exactly(count()?), field(body, "members", key)?)),
        other => Err(
            ErrorRecord::invalid_definition(format!("unknown combinator '{}'", other))
                .with_context("combinator", other),
        ),
    }
}
