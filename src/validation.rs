//! Per-call filter outcomes
//!
//! Applying a filter yields a [`Validation`]: `Success` with the value the
//! filter produced, or `Failure` with the reason it was rejected. The reason
//! travels with the outcome rather than being stored on the filter, so one
//! filter can serve any number of callers at once.
//!
//! ```
//! use sluice::filter::{to_int, FilterExt};
//! use sluice::{ErrorKind, Validation, Value};
//!
//! match to_int().apply(Value::from("forty")) {
//!     Validation::Success(v) => panic!("unexpected {}", v),
//!     Validation::Failure(err) => assert_eq!(err.kind(), &ErrorKind::Inconvertable),
//! }
//!
//! // the sentinel view: a rejection is just `None`
//! assert_eq!(to_int().apply(Value::from("40")).ok(), Some(Value::Int(40)));
//! ```

/// Outcome of a single evaluation.
///
/// `T` is what an accepted input turns into and `E` describes a rejection.
/// Filters use `Validation<Value, ErrorRecord>`; a
/// [`FilterMap`](crate::filter::FilterMap) reports
/// `Validation<Record, Vec<FieldError>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<T, E> {
    /// The input was accepted
    Success(T),
    /// The input was rejected
    Failure(E),
}

impl<T, E> Validation<T, E> {
    /// An accepted outcome.
    #[inline]
    pub fn success(value: T) -> Self {
        Validation::Success(value)
    }

    /// A rejected outcome.
    #[inline]
    pub fn failure(error: E) -> Self {
        Validation::Failure(error)
    }

    /// Lift a raising call into an outcome.
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Validation::Success(value),
            Err(error) => Validation::Failure(error),
        }
    }

    /// The raising view, for use with `?`.
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(error),
        }
    }

    /// `true` if accepted.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Validation::Success(_))
    }

    /// `true` if rejected.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Validation::Failure(_))
    }

    /// The accepted value, `None` on rejection.
    #[inline]
    pub fn ok(self) -> Option<T> {
        match self {
            Validation::Success(value) => Some(value),
            Validation::Failure(_) => None,
        }
    }

    /// The rejection, `None` on success.
    #[inline]
    pub fn err(self) -> Option<E> {
        match self {
            Validation::Success(_) => None,
            Validation::Failure(error) => Some(error),
        }
    }

    /// Borrow the rejection without consuming the outcome.
    ///
    /// ```
    /// use sluice::filter::{Between, FilterExt};
    /// use sluice::{ErrorKind, Value};
    ///
    /// let outcome = Between::new(1, 5).apply(Value::Int(9));
    /// let err = outcome.error().unwrap();
    /// assert_eq!(err.kind(), &ErrorKind::NotBetween);
    /// assert!(outcome.is_failure());
    /// ```
    #[inline]
    pub fn error(&self) -> Option<&E> {
        match self {
            Validation::Success(_) => None,
            Validation::Failure(error) => Some(error),
        }
    }

    /// Transform an accepted value.
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Validation::Success(value) => Validation::Success(f(value)),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }

    /// Transform a rejection, e.g. to attach a field name.
    ///
    /// ```
    /// use sluice::filter::{to_int, FieldError, FilterExt};
    /// use sluice::Value;
    ///
    /// let outcome = to_int()
    ///     .apply(Value::Null)
    ///     .map_err(|error| FieldError { field: "age".into(), error });
    /// assert_eq!(outcome.err().unwrap().field, "age");
    /// ```
    #[inline]
    pub fn map_err<E2, F>(self, f: F) -> Validation<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Validation::Success(value) => Validation::Success(value),
            Validation::Failure(error) => Validation::Failure(f(error)),
        }
    }

    /// Continue with `f` only if accepted.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> Validation<U, E>,
    {
        match self {
            Validation::Success(value) => f(value),
            Validation::Failure(error) => Validation::Failure(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Validation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Validation::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{to_int, Between, FilterExt};
    use crate::{ErrorKind, ErrorRecord, Value};

    fn rejected() -> Validation<Value, ErrorRecord> {
        Validation::failure(ErrorRecord::new(ErrorKind::NotBetween, "out of range"))
    }

    #[test]
    fn test_outcome_views_agree() {
        let accepted = to_int().apply(Value::from("3"));
        assert!(accepted.is_success());
        assert_eq!(accepted.error(), None);
        assert_eq!(accepted.clone().into_result(), Ok(Value::Int(3)));
        assert_eq!(accepted.ok(), Some(Value::Int(3)));

        let outcome = rejected();
        assert!(outcome.is_failure());
        assert_eq!(outcome.error().map(|e| e.kind()), Some(&ErrorKind::NotBetween));
        assert_eq!(outcome.clone().ok(), None);
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_from_raising_call() {
        let outcome: Validation<Value, ErrorRecord> = to_int().try_apply(Value::Null).into();
        assert_eq!(
            outcome.err().map(|e| e.kind().clone()),
            Some(ErrorKind::UnsupportedConversion)
        );
    }

    #[test]
    fn test_map_leaves_rejection_alone() {
        let doubled = rejected().map(|v| Value::Int(v.as_int().unwrap_or(0) * 2));
        assert!(doubled.is_failure());

        let kinds = rejected().map_err(|e| e.kind().clone());
        assert_eq!(kinds, Validation::Failure(ErrorKind::NotBetween));
    }

    #[test]
    fn test_and_then_feeds_next_filter() {
        let digit = Between::new(0, 9);
        let outcome = to_int()
            .apply(Value::from("7"))
            .and_then(|v| digit.apply(v));
        assert_eq!(outcome, Validation::Success(Value::Int(7)));

        let outcome = to_int()
            .apply(Value::from("x"))
            .and_then(|v| digit.apply(v));
        assert_eq!(
            outcome.err().map(|e| e.kind().clone()),
            Some(ErrorKind::Inconvertable)
        );
    }
}
