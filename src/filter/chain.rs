//! Sequential composition of filters

use std::fmt;

use super::definition::normalize_all;
use super::{Filter, FilterDef, FilterExt, Step};
use crate::{ErrorRecord, Validation, Value};

/// Filters applied in order, each step feeding the next.
///
/// The first rejection aborts the chain and discards partial work. The
/// returned error keeps the failing step's kind and adds the step index
/// (`step`) and the pre-chain value (`input`) to its context. An empty chain
/// is the identity.
///
/// # Example
///
/// ```rust
/// use sluice::filter::{to_int, Between, FilterChain, FilterExt};
/// use sluice::{filters, ErrorKind, Value};
///
/// let chain = FilterChain::new(filters![to_int(), Between::new(1, 10)]).unwrap();
///
/// let err = chain.try_apply(Value::from("50")).unwrap_err();
/// assert_eq!(err.kind(), &ErrorKind::NotBetween);
/// assert_eq!(err.context_value("step"), Some(&Value::Int(1)));
/// assert_eq!(err.context_value("input"), Some(&Value::from("50")));
/// ```
#[derive(Clone, Default)]
pub struct FilterChain {
    steps: Vec<Step>,
}

impl FilterChain {
    /// Normalize `defs` into a chain.
    pub fn new<I>(defs: I) -> Result<Self, ErrorRecord>
    where
        I: IntoIterator<Item = FilterDef>,
    {
        Ok(FilterChain::from_steps(normalize_all(defs)?))
    }

    /// A chain over already normalized steps.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        FilterChain { steps }
    }

    /// The empty chain.
    pub fn identity() -> Self {
        FilterChain::default()
    }

    /// Append one step.
    pub fn then<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.steps.push(filter.shared());
        self
    }

    /// Append all steps of `other`.
    pub fn append(mut self, other: FilterChain) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// The steps, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// `true` for the identity chain.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Filter for FilterChain {
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        let input = value.clone();
        let mut current = value;

        for (index, step) in self.steps.iter().enumerate() {
            current = match step.apply(current) {
                Validation::Success(next) => next,
                Validation::Failure(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(step = index, kind = %err.kind(), "chain aborted");

                    return Err(err
                        .with_context("step", index as i64)
                        .with_context("input", input));
                }
            };
        }

        Ok(current)
    }

    fn invertible(&self) -> bool {
        self.steps.iter().all(|step| step.invertible())
    }

    fn describe(&self) -> String {
        let steps: Vec<String> = self.steps.iter().map(|s| s.describe()).collect();
        format!("chain[{}]", steps.join(", "))
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.steps.iter().map(|s| s.describe()).collect();
        f.debug_struct("FilterChain").field("steps", &steps).finish()
    }
}
