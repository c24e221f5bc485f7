//! Per-field filtering of records

use std::collections::BTreeMap;
use std::fmt;

use super::{Filter, FilterChain, FilterDef, FilterExt};
use crate::{ErrorKind, ErrorRecord, Record, Semigroup, Validation, Value};

/// What the [`Filter`] impl of a [`FilterMap`] does with field failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapStrategy {
    /// Return the record of fields that passed
    #[default]
    Partial,
    /// Fail the whole record with `INVALID_FIELDS` if any field fails
    Strict,
}

/// What to do with input fields that have no registered chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFields {
    /// Fail with `NO_MATCHING_FILTER`
    #[default]
    Reject,
    /// Leave them out of the result
    Drop,
    /// Copy them into the result unchanged
    Keep,
}

/// A field that failed its chain.
///
/// Record-level failures (input is not a record, unknown field) use an empty
/// field name when reported through [`FilterMap::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The field name
    pub field: String,
    /// The chain's error
    pub error: ErrorRecord,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The outcome of [`FilterMap::apply_fields`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldResults {
    /// Filtered values of the fields that passed
    pub fields: Record,
    /// Failures of the fields that did not, in field order
    pub errors: Vec<FieldError>,
}

impl FieldResults {
    /// `true` if no field failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn passed(field: &str, value: Value) -> Self {
        let mut fields = Record::new();
        fields.insert(field.to_string(), value);
        FieldResults {
            fields,
            errors: Vec::new(),
        }
    }

    fn failed(field: &str, error: ErrorRecord) -> Self {
        FieldResults {
            fields: Record::new(),
            errors: vec![FieldError {
                field: field.to_string(),
                error,
            }],
        }
    }
}

impl Semigroup for FieldResults {
    fn combine(self, other: Self) -> Self {
        FieldResults {
            fields: self.fields.combine(other.fields),
            errors: self.errors.combine(other.errors),
        }
    }
}

/// A filter chain per record field.
///
/// Each field passes through its own chain independently; one field failing
/// does not affect the others. How failures shape the result is configured
/// with [`MapStrategy`].
///
/// # Example
///
/// ```rust
/// use sluice::filter::{to_int, to_str, Between, FilterExt, FilterMap};
/// use sluice::{filters, ErrorKind, Value};
///
/// let person = FilterMap::builder()
///     .field("age", filters![to_int(), Between::new(0, 120)])
///     .field("name", filters![to_str()])
///     .build()
///     .unwrap();
///
/// let clean = person
///     .try_apply(Value::record([("age", Value::from("30")), ("name", Value::from(42))]))
///     .unwrap();
/// assert_eq!(clean, Value::record([("age", Value::Int(30)), ("name", Value::from("42"))]));
///
/// let results = person
///     .apply_fields(&Value::record([("age", Value::from("x")), ("name", Value::from(42))]))
///     .unwrap();
/// assert_eq!(results.errors[0].field, "age");
/// assert_eq!(results.errors[0].error.kind(), &ErrorKind::Inconvertable);
/// assert_eq!(results.fields.get("name"), Some(&Value::from("42")));
/// ```
#[derive(Clone, Default)]
pub struct FilterMap {
    chains: BTreeMap<String, FilterChain>,
    strategy: MapStrategy,
    unknown: UnknownFields,
}

impl FilterMap {
    /// Start building a map.
    pub fn builder() -> FilterMapBuilder {
        FilterMapBuilder::default()
    }

    /// A partial map rejecting unknown fields, from `(field, definitions)`
    /// pairs.
    pub fn new<K, I>(fields: I) -> Result<Self, ErrorRecord>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<FilterDef>)>,
    {
        fields
            .into_iter()
            .fold(FilterMap::builder(), |builder, (name, defs)| builder.field(name, defs))
            .build()
    }

    /// The chain registered for `field`.
    pub fn chain(&self, field: &str) -> Option<&FilterChain> {
        self.chains.get(field)
    }

    /// Registered field names, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    /// The configured strategy.
    pub fn strategy(&self) -> MapStrategy {
        self.strategy
    }

    /// Filter every field of `record`.
    ///
    /// Fails outright when `record` is not a record (`NOT_A_RECORD`), when
    /// an unknown field is rejected (`NO_MATCHING_FILTER`), or when a chain
    /// faults. Ordinary field rejections are collected in the result.
    pub fn apply_fields(&self, record: &Value) -> Result<FieldResults, ErrorRecord> {
        let input = record.as_record().ok_or_else(|| {
            ErrorRecord::new(
                ErrorKind::NotARecord,
                format!("expected a record, got {}", record.kind()),
            )
            .with_value(record.clone())
        })?;

        if self.unknown == UnknownFields::Reject {
            if let Some(field) = input.keys().find(|k| !self.chains.contains_key(*k)) {
                return Err(ErrorRecord::new(
                    ErrorKind::NoMatchingFilter,
                    format!("no filter registered for field '{}'", field),
                )
                .with_context("field", field.as_str())
                .with_value(record.clone()));
            }
        }

        let mut results = FieldResults::default();
        for (field, value) in input {
            let Some(chain) = self.chains.get(field) else {
                if self.unknown == UnknownFields::Keep {
                    results = results.combine(FieldResults::passed(field, value.clone()));
                }
                continue;
            };

            let partial = match chain.apply(value.clone()) {
                Validation::Success(filtered) => FieldResults::passed(field, filtered),
                Validation::Failure(err) if err.is_fault() => {
                    return Err(err.with_context("field", field.as_str()));
                }
                Validation::Failure(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(field = %field, kind = %err.kind(), "field rejected");

                    FieldResults::failed(field, err)
                }
            };
            results = results.combine(partial);
        }

        Ok(results)
    }

    /// Filter every field, accumulating all failures.
    ///
    /// ```rust
    /// use sluice::filter::{to_int, FilterMap};
    /// use sluice::{filters, Value};
    ///
    /// let ints = FilterMap::new([("a", filters![to_int()]), ("b", filters![to_int()])]).unwrap();
    /// let errors = ints
    ///     .validate(&Value::record([("a", Value::from("x")), ("b", Value::from("y"))]))
    ///     .err()
    ///     .unwrap();
    /// assert_eq!(errors.len(), 2);
    /// ```
    pub fn validate(&self, record: &Value) -> Validation<Record, Vec<FieldError>> {
        match self.apply_fields(record) {
            Ok(results) if results.is_clean() => Validation::Success(results.fields),
            Ok(results) => Validation::Failure(results.errors),
            Err(error) => Validation::Failure(vec![FieldError {
                field: String::new(),
                error,
            }]),
        }
    }
}

impl Filter for FilterMap {
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        let results = self.apply_fields(&value)?;

        match (self.strategy, results.errors.first()) {
            (MapStrategy::Strict, Some(first)) => {
                let failed = Value::list(results.errors.iter().map(|e| e.field.clone()));
                Err(ErrorRecord::new(
                    ErrorKind::InvalidFields,
                    format!("{} field(s) failed", results.errors.len()),
                )
                .with_context("fields", failed)
                .with_value(value)
                .with_cause(first.error.clone()))
            }
            _ => Ok(Value::Map(results.fields)),
        }
    }

    fn invertible(&self) -> bool {
        self.chains.values().all(|chain| chain.invertible())
    }

    fn describe(&self) -> String {
        let fields: Vec<String> = self
            .chains
            .iter()
            .map(|(name, chain)| format!("{}: {}", name, chain.describe()))
            .collect();
        format!("map{{{}}}", fields.join(", "))
    }
}

impl fmt::Debug for FilterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterMap")
            .field("chains", &self.chains)
            .field("strategy", &self.strategy)
            .field("unknown", &self.unknown)
            .finish()
    }
}

/// Builder for [`FilterMap`].
///
/// Definitions are normalized as they are added; the first malformed one is
/// reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct FilterMapBuilder {
    map: FilterMap,
    invalid: Option<ErrorRecord>,
}

impl FilterMapBuilder {
    /// Register `defs` as the chain for `field`.
    pub fn field(self, field: impl Into<String>, defs: Vec<FilterDef>) -> Self {
        let field = field.into();
        match FilterChain::new(defs) {
            Ok(chain) => self.chain(field, chain),
            Err(err) => self.fail(err.with_context("field", field)),
        }
    }

    /// Register an existing chain for `field`.
    pub fn chain(mut self, field: impl Into<String>, chain: FilterChain) -> Self {
        let field = field.into();
        if self.map.chains.contains_key(&field) {
            let err = ErrorRecord::invalid_definition(format!("field '{}' registered twice", field))
                .with_context("field", field);
            return self.fail(err);
        }
        self.map.chains.insert(field, chain);
        self
    }

    /// Use [`MapStrategy::Strict`].
    pub fn strict(self) -> Self {
        self.strategy(MapStrategy::Strict)
    }

    /// Set the strategy.
    pub fn strategy(mut self, strategy: MapStrategy) -> Self {
        self.map.strategy = strategy;
        self
    }

    /// Set the handling of unknown fields.
    pub fn unknown_fields(mut self, unknown: UnknownFields) -> Self {
        self.map.unknown = unknown;
        self
    }

    /// Finish the map.
    pub fn build(self) -> Result<FilterMap, ErrorRecord> {
        match self.invalid {
            Some(err) => Err(err),
            None => Ok(self.map),
        }
    }

    fn fail(mut self, err: ErrorRecord) -> Self {
        self.invalid.get_or_insert(err);
        self
    }
}
