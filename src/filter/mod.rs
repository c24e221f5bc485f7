//! Value-transforming filters
//!
//! A [`Filter`] accepts a value, possibly normalizing it (`"7"` becomes `7`),
//! or rejects it with a structured [`ErrorRecord`]. Filters compose:
//!
//! - [`FilterChain`] threads a value through steps in order;
//! - [`FilterCombinator`] applies the combinator modes over filters;
//! - [`FilterMap`] applies a chain per field of a record.
//!
//! Implementers only write [`Filter::filter`]. Callers use [`FilterExt`],
//! which turns each call into a [`Validation`] (`Success(value)` or
//! `Failure(error)`) and adds inversion and batch application.
//!
//! # Example
//!
//! ```rust
//! use sluice::filter::{to_int, Between, FilterChain, FilterExt};
//! use sluice::{filters, ErrorKind, Value};
//!
//! let chain = FilterChain::new(filters![to_int(), Between::new(1, 10)]).unwrap();
//!
//! assert_eq!(chain.apply(Value::from("7")).ok(), Some(Value::Int(7)));
//!
//! let err = chain.apply(Value::from("50")).err().unwrap();
//! assert_eq!(err.kind(), &ErrorKind::NotBetween);
//! ```

mod chain;
mod convert;
mod definition;
mod leaf;
mod logic;
mod map;

pub use chain::FilterChain;
pub use convert::{to_bool, to_float, to_int, to_str, Conversion};
pub use definition::FilterDef;
pub use leaf::{Between, Is, PredicateFilter};
pub use logic::FilterCombinator;
pub use map::{FieldError, FieldResults, FilterMap, FilterMapBuilder, MapStrategy, UnknownFields};

use std::sync::Arc;

use crate::{ErrorKind, ErrorRecord, Validation, Value};

/// A normalized filter step.
pub type Step = Arc<dyn Filter>;

/// A value-transforming test.
///
/// Return the accepted (possibly normalized) value, or an error describing
/// the rejection. Never signal rejection through a special value; turning
/// errors into outcomes is the job of [`FilterExt`].
pub trait Filter: Send + Sync {
    /// Accept and normalize `value`, or reject it.
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord>;

    /// Whether [`FilterExt::invert`] is meaningful for this filter.
    ///
    /// Pure type coercions return `false`.
    fn invertible(&self) -> bool {
        true
    }

    /// Short description used in error context and debug output.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl std::fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

// Blanket impl for closures
impl<F> Filter for F
where
    F: Fn(Value) -> Result<Value, ErrorRecord> + Send + Sync,
{
    #[inline]
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        self(value)
    }
}

/// Caller-facing operations over any [`Filter`].
///
/// Each operation comes in two forms: the plain form reports rejection as
/// [`Validation::Failure`] (or silently drops the value, for the batch
/// forms), and the `try_` form returns it as `Err`.
pub trait FilterExt: Filter {
    /// Apply the filter. The error carries the failing value.
    fn apply(&self, value: Value) -> Validation<Value, ErrorRecord> {
        let original = value.clone();
        match self.filter(value) {
            Ok(accepted) => Validation::Success(accepted),
            Err(err) => Validation::Failure(err.or_value(original)),
        }
    }

    /// Apply the filter, returning rejection as `Err`.
    fn try_apply(&self, value: Value) -> Result<Value, ErrorRecord> {
        self.apply(value).into_result()
    }

    /// Apply to each value, keeping only the accepted ones, in order.
    fn apply_each<I>(&self, values: I) -> Vec<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        values
            .into_iter()
            .filter_map(|value| self.apply(value).ok())
            .collect()
    }

    /// Apply to each value, stopping at the first rejection.
    fn try_apply_each<I>(&self, values: I) -> Result<Vec<Value>, ErrorRecord>
    where
        I: IntoIterator<Item = Value>,
    {
        values.into_iter().map(|value| self.try_apply(value)).collect()
    }

    /// Succeed with the original value exactly when the filter rejects it.
    ///
    /// Non-invertible filters always fail with `INVERT_DISALLOWED`. Faults
    /// from the filter are returned, not treated as a rejection.
    ///
    /// ```rust
    /// use sluice::filter::{to_int, Is, FilterExt};
    /// use sluice::{ErrorKind, Value, ValueKind};
    ///
    /// let not_int = Is::new(ValueKind::Int);
    /// assert_eq!(not_int.invert(Value::from("x")).ok(), Some(Value::from("x")));
    /// assert_eq!(not_int.invert(Value::Int(1)).err().unwrap().kind(), &ErrorKind::InvertedMatch);
    ///
    /// let err = to_int().invert(Value::from("x")).err().unwrap();
    /// assert_eq!(err.kind(), &ErrorKind::InvertDisallowed);
    /// ```
    fn invert(&self, value: Value) -> Validation<Value, ErrorRecord> {
        if !self.invertible() {
            return Validation::Failure(
                ErrorRecord::new(
                    ErrorKind::InvertDisallowed,
                    format!("{} cannot be inverted", self.describe()),
                )
                .with_value(value),
            );
        }

        match self.filter(value.clone()) {
            Ok(_) => Validation::Failure(
                ErrorRecord::new(
                    ErrorKind::InvertedMatch,
                    format!("value was accepted by inverted {}", self.describe()),
                )
                .with_value(value),
            ),
            Err(err) if err.is_fault() => Validation::Failure(err.or_value(value)),
            Err(_) => Validation::Success(value),
        }
    }

    /// Invert, returning rejection as `Err`.
    fn try_invert(&self, value: Value) -> Result<Value, ErrorRecord> {
        self.invert(value).into_result()
    }

    /// Invert each value, keeping only the ones the filter rejects.
    fn invert_each<I>(&self, values: I) -> Vec<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        values
            .into_iter()
            .filter_map(|value| self.invert(value).ok())
            .collect()
    }

    /// Invert each value, stopping at the first one the filter accepts.
    fn try_invert_each<I>(&self, values: I) -> Result<Vec<Value>, ErrorRecord>
    where
        I: IntoIterator<Item = Value>,
    {
        values.into_iter().map(|value| self.try_invert(value)).collect()
    }

    /// Move the filter behind an `Arc` so it can be used as a [`Step`].
    fn shared(self) -> Step
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<F: Filter + ?Sized> FilterExt for F {}

/// Build a `Vec<FilterDef>` from heterogeneous definitions.
///
/// Each element is converted with `FilterDef::from`.
///
/// ```rust
/// use sluice::filter::{to_int, Between, FilterDef};
/// use sluice::filters;
///
/// let defs: Vec<FilterDef> = filters![to_int(), Between::new(0, 120)];
/// assert_eq!(defs.len(), 2);
/// ```
#[macro_export]
macro_rules! filters {
    () => {
        ::std::vec::Vec::<$crate::filter::FilterDef>::new()
    };
    ($($def:expr),+ $(,)?) => {
        ::std::vec![$($crate::filter::FilterDef::from($def)),+]
    };
}
