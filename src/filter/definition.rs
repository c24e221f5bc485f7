//! Filter definitions and their normalization

use std::fmt;
use std::sync::Arc;

use super::{
    Between, Conversion, Filter, FilterChain, FilterCombinator, FilterMap, Is, PredicateFilter,
    Step,
};
use crate::rule::PredicateRule;
use crate::ErrorRecord;

/// One element of a filter definition, before normalization.
///
/// Definitions are normalized once, when the owning chain, combinator or map
/// is built. A malformed definition fails there with `INVALID_DEFINITION`
/// and never reaches evaluation.
#[derive(Clone)]
pub enum FilterDef {
    /// An already constructed filter
    Leaf(Step),
    /// A predicate with bound arguments, used as a filter
    Predicate(PredicateRule),
    /// A built-in conversion by code
    Conversion(i64),
    /// A nested definition list, normalized into a chain
    List(Vec<FilterDef>),
}

impl FilterDef {
    /// Wrap any filter.
    pub fn leaf<F: Filter + 'static>(filter: F) -> Self {
        FilterDef::Leaf(Arc::new(filter))
    }

    /// Wrap a predicate.
    pub fn predicate(rule: PredicateRule) -> Self {
        FilterDef::Predicate(rule)
    }

    /// Resolve the definition into a single step.
    ///
    /// ```rust
    /// use sluice::filter::{FilterDef, FilterExt};
    /// use sluice::{ErrorKind, Value};
    ///
    /// let step = FilterDef::Conversion(1).normalize().unwrap();
    /// assert_eq!(step.try_apply(Value::from("3")), Ok(Value::Int(3)));
    ///
    /// let err = FilterDef::Conversion(9).normalize().unwrap_err();
    /// assert_eq!(err.kind(), &ErrorKind::InvalidDefinition);
    /// ```
    pub fn normalize(self) -> Result<Step, ErrorRecord> {
        match self {
            FilterDef::Leaf(step) => Ok(step),
            FilterDef::Predicate(rule) => Ok(Arc::new(PredicateFilter::new(rule))),
            FilterDef::Conversion(code) => Conversion::from_code(code)
                .map(|conversion| Arc::new(conversion) as Step)
                .ok_or_else(|| {
                    ErrorRecord::invalid_definition(format!("unknown conversion code {}", code))
                        .with_context("code", code)
                }),
            FilterDef::List(defs) => Ok(Arc::new(FilterChain::new(defs)?)),
        }
    }
}

/// Normalize every definition, stopping at the first malformed one.
pub(crate) fn normalize_all<I>(defs: I) -> Result<Vec<Step>, ErrorRecord>
where
    I: IntoIterator<Item = FilterDef>,
{
    defs.into_iter()
        .enumerate()
        .map(|(index, def)| {
            def.normalize()
                .map_err(|err| err.with_context("definition", index as i64))
        })
        .collect()
}

impl fmt::Debug for FilterDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterDef::Leaf(step) => f.debug_tuple("Leaf").field(&step.describe()).finish(),
            FilterDef::Predicate(rule) => f.debug_tuple("Predicate").field(rule).finish(),
            FilterDef::Conversion(code) => f.debug_tuple("Conversion").field(code).finish(),
            FilterDef::List(defs) => f.debug_tuple("List").field(defs).finish(),
        }
    }
}

impl From<Step> for FilterDef {
    fn from(step: Step) -> Self {
        FilterDef::Leaf(step)
    }
}

impl From<PredicateRule> for FilterDef {
    fn from(rule: PredicateRule) -> Self {
        FilterDef::Predicate(rule)
    }
}

impl From<Vec<FilterDef>> for FilterDef {
    fn from(defs: Vec<FilterDef>) -> Self {
        FilterDef::List(defs)
    }
}

macro_rules! leaf_def {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for FilterDef {
                fn from(filter: $ty) -> Self {
                    FilterDef::leaf(filter)
                }
            }
        )+
    };
}

leaf_def!(Conversion, Between, Is, PredicateFilter, FilterChain, FilterCombinator, FilterMap);
