//! Merging partial evaluation results
//!
//! Record filtering produces one partial result per field. [`Semigroup`]
//! is how those partials are folded together: filtered fields merge into one
//! record and field failures concatenate in order.
//!
//! `combine` must be associative, so a fold gives the same answer however
//! the partials are grouped:
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```

use crate::value::Record;

/// Associative merge of two partial results.
///
/// ```
/// use sluice::{Record, Semigroup, Value};
///
/// let mut left = Record::new();
/// left.insert("age".into(), Value::Int(30));
/// let mut right = Record::new();
/// right.insert("name".into(), Value::from("ann"));
///
/// let merged = left.combine(right);
/// assert_eq!(merged.len(), 2);
/// ```
pub trait Semigroup: Sized {
    /// Merge `other` into `self`.
    fn combine(self, other: Self) -> Self;
}

impl<T> Semigroup for Vec<T> {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}

// A field present in both keeps the right-hand value.
impl Semigroup for Record {
    #[inline]
    fn combine(mut self, other: Self) -> Self {
        self.extend(other);
        self
    }
}
