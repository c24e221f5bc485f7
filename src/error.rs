//! Structured errors for rule and filter evaluation
//!
//! Every failure in this crate is an [`ErrorRecord`]: a kind, a stable numeric
//! code, a human-readable message, a context map, the failing value, and an
//! optional cause. Composite rules and filters wrap the failures of their
//! members instead of discarding them, so the full trail is reachable through
//! [`std::error::Error::source`].
//!
//! # Example
//!
//! ```rust
//! use sluice::{ErrorKind, ErrorRecord, Value};
//!
//! let err = ErrorRecord::new(ErrorKind::NotBetween, "50 is not between 1 and 10")
//!     .with_value(Value::Int(50))
//!     .with_context("min", 1)
//!     .with_context("max", 10);
//!
//! assert_eq!(err.kind(), &ErrorKind::NotBetween);
//! assert_eq!(err.code(), 600);
//! assert_eq!(err.to_string(), "NOT_BETWEEN: 50 is not between 1 and 10");
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::Value;

/// Boxed error returned by external invocables.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The kind of an [`ErrorRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A rule or filter definition was malformed (raised at construction)
    InvalidDefinition,
    /// An underlying invocable failed unexpectedly
    BadCall,
    /// An IF/UNLESS condition did not evaluate to a boolean
    InvalidCondition,
    /// The value's type cannot be converted to the requested type at all
    UnsupportedConversion,
    /// The value's type is convertible but this particular value is not
    Inconvertable,
    /// The filter is a pure coercion and cannot be inverted
    InvertDisallowed,
    /// An inverted filter matched the value
    InvertedMatch,
    /// A record field has no registered filter
    NoMatchingFilter,
    /// A record filter received something other than a record
    NotARecord,
    /// One or more record fields failed under the strict strategy
    InvalidFields,
    /// ALL combinator failed
    NotAll,
    /// ANY combinator failed
    NotAny,
    /// NONE combinator failed
    NotNone,
    /// ONE combinator failed
    NotOne,
    /// AT_LEAST combinator failed
    NotAtLeast,
    /// AT_MOST combinator failed
    NotAtMost,
    /// EXACTLY combinator failed
    NotExactly,
    /// IF combinator failed (condition held, guarded members did not)
    NotIf,
    /// UNLESS combinator failed (condition failed, guarded members did not)
    NotUnless,
    /// Value outside an inclusive range
    NotBetween,
    /// Value is not of the expected kind
    WrongType,
    /// A predicate used as a filter returned `false`
    PredicateFailed,
    /// Kind defined by an external leaf filter
    Custom(Cow<'static, str>),
}

impl ErrorKind {
    /// Stable SCREAMING_CASE name of this kind.
    pub fn name(&self) -> &str {
        match self {
            ErrorKind::InvalidDefinition => "INVALID_DEFINITION",
            ErrorKind::BadCall => "BAD_CALL",
            ErrorKind::InvalidCondition => "INVALID_CONDITION",
            ErrorKind::UnsupportedConversion => "UNSUPPORTED_CONVERSION",
            ErrorKind::Inconvertable => "INCONVERTABLE",
            ErrorKind::InvertDisallowed => "INVERT_DISALLOWED",
            ErrorKind::InvertedMatch => "INVERTED_MATCH",
            ErrorKind::NoMatchingFilter => "NO_MATCHING_FILTER",
            ErrorKind::NotARecord => "NOT_A_RECORD",
            ErrorKind::InvalidFields => "INVALID_FIELDS",
            ErrorKind::NotAll => "NOT_ALL",
            ErrorKind::NotAny => "NOT_ANY",
            ErrorKind::NotNone => "NOT_NONE",
            ErrorKind::NotOne => "NOT_ONE",
            ErrorKind::NotAtLeast => "NOT_AT_LEAST",
            ErrorKind::NotAtMost => "NOT_AT_MOST",
            ErrorKind::NotExactly => "NOT_EXACTLY",
            ErrorKind::NotIf => "NOT_IF",
            ErrorKind::NotUnless => "NOT_UNLESS",
            ErrorKind::NotBetween => "NOT_BETWEEN",
            ErrorKind::WrongType => "WRONG_TYPE",
            ErrorKind::PredicateFailed => "PREDICATE_FAILED",
            ErrorKind::Custom(name) => name,
        }
    }

    /// Stable numeric code of this kind.
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::InvalidDefinition => 100,
            ErrorKind::BadCall => 101,
            ErrorKind::InvalidCondition => 102,
            ErrorKind::UnsupportedConversion => 200,
            ErrorKind::Inconvertable => 201,
            ErrorKind::InvertDisallowed => 300,
            ErrorKind::InvertedMatch => 301,
            ErrorKind::NoMatchingFilter => 400,
            ErrorKind::NotARecord => 401,
            ErrorKind::InvalidFields => 402,
            ErrorKind::NotAll => 500,
            ErrorKind::NotAny => 501,
            ErrorKind::NotNone => 502,
            ErrorKind::NotOne => 503,
            ErrorKind::NotAtLeast => 504,
            ErrorKind::NotAtMost => 505,
            ErrorKind::NotExactly => 506,
            ErrorKind::NotIf => 507,
            ErrorKind::NotUnless => 508,
            ErrorKind::NotBetween => 600,
            ErrorKind::WrongType => 601,
            ErrorKind::PredicateFailed => 602,
            ErrorKind::Custom(_) => 900,
        }
    }

    /// Faults are failures of the machinery rather than a rejected value.
    ///
    /// Combinators and inversion never count a fault as an ordinary
    /// "member failed" outcome; they propagate it.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidDefinition | ErrorKind::BadCall | ErrorKind::InvalidCondition
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A structured evaluation failure.
///
/// Records are immutable values returned from each call; nothing is latched
/// on the rule or filter that produced them.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    kind: ErrorKind,
    message: String,
    context: BTreeMap<String, Value>,
    value: Option<Value>,
    cause: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl ErrorRecord {
    /// Create a record with an empty context.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ErrorRecord {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
            value: None,
            cause: None,
        }
    }

    /// A malformed definition, detected at construction.
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDefinition, message)
    }

    /// An invocable named `name` failed with `source`.
    pub fn bad_call(name: &str, source: BoxError) -> Self {
        #[cfg(feature = "tracing")]
        tracing::warn!("Invocable '{}' failed: {}", name, source);

        Self::new(ErrorKind::BadCall, format!("call to '{}' failed: {}", name, source))
            .with_context("callee", name)
            .with_boxed_cause(source)
    }

    /// A condition produced `value` instead of a boolean.
    pub fn invalid_condition(value: &Value) -> Self {
        Self::new(
            ErrorKind::InvalidCondition,
            format!("condition must be a bool, got {}", value.kind()),
        )
        .with_value(value.clone())
    }

    /// Attach a context entry, replacing any previous entry with that key.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attach the failing value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Attach a cause.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Attach an already boxed cause.
    pub fn with_boxed_cause(mut self, cause: BoxError) -> Self {
        self.cause = Some(Arc::from(cause));
        self
    }

    pub(crate) fn or_value(mut self, value: Value) -> Self {
        if self.value.is_none() {
            self.value = Some(value);
        }
        self
    }

    /// The kind of failure.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Numeric code of [`kind`](Self::kind).
    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// All context entries.
    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    /// A single context entry.
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// The value that failed, when known.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The wrapped cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The wrapped cause when it is itself an `ErrorRecord`.
    pub fn cause_record(&self) -> Option<&ErrorRecord> {
        self.cause
            .as_deref()
            .and_then(|cause| cause.downcast_ref::<ErrorRecord>())
    }

    /// Follow `ErrorRecord` causes down to the innermost record.
    ///
    /// ```rust
    /// use sluice::{ErrorKind, ErrorRecord};
    ///
    /// let inner = ErrorRecord::new(ErrorKind::Inconvertable, "not a number");
    /// let outer = ErrorRecord::new(ErrorKind::NotAll, "member failed").with_cause(inner);
    /// assert_eq!(outer.root_record().kind(), &ErrorKind::Inconvertable);
    /// ```
    pub fn root_record(&self) -> &ErrorRecord {
        let mut current = self;
        while let Some(next) = current.cause_record() {
            current = next;
        }
        current
    }

    /// Shorthand for `self.kind().is_fault()`.
    pub fn is_fault(&self) -> bool {
        self.kind.is_fault()
    }
}

impl PartialEq for ErrorRecord {
    // causes are opaque trait objects and are not compared
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.message == other.message
            && self.context == other.context
            && self.value == other.value
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for ErrorRecord {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_kind_name() {
        let err = ErrorRecord::new(ErrorKind::NoMatchingFilter, "no filter for 'x'");
        assert_eq!(err.to_string(), "NO_MATCHING_FILTER: no filter for 'x'");
    }

    #[test]
    fn test_custom_kind() {
        let kind = ErrorKind::Custom(Cow::Borrowed("NOT_EMAIL"));
        assert_eq!(kind.name(), "NOT_EMAIL");
        assert_eq!(kind.code(), 900);
        assert!(!kind.is_fault());
    }

    #[test]
    fn test_faults() {
        assert!(ErrorKind::BadCall.is_fault());
        assert!(ErrorKind::InvalidCondition.is_fault());
        assert!(ErrorKind::InvalidDefinition.is_fault());
        assert!(!ErrorKind::NotAll.is_fault());
        assert!(!ErrorKind::Inconvertable.is_fault());
    }

    #[test]
    fn test_bad_call_keeps_source() {
        let source: BoxError = "division by zero".into();
        let err = ErrorRecord::bad_call("ratio", source);

        assert_eq!(err.kind(), &ErrorKind::BadCall);
        assert_eq!(err.context_value("callee"), Some(&Value::from("ratio")));
        assert_eq!(err.cause().map(|c| c.to_string()), Some("division by zero".into()));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_cause_record_chain() {
        let root = ErrorRecord::new(ErrorKind::NotBetween, "out of range");
        let mid = ErrorRecord::new(ErrorKind::NotAll, "member 1 failed").with_cause(root.clone());
        let top = ErrorRecord::new(ErrorKind::NotIf, "guarded rules failed").with_cause(mid);

        assert_eq!(top.cause_record().map(|r| r.kind()), Some(&ErrorKind::NotAll));
        assert_eq!(top.root_record(), &root);
    }

    #[test]
    fn test_or_value_keeps_existing() {
        let err = ErrorRecord::new(ErrorKind::WrongType, "bad")
            .with_value(Value::Int(1))
            .or_value(Value::Int(2));
        assert_eq!(err.value(), Some(&Value::Int(1)));

        let err = ErrorRecord::new(ErrorKind::WrongType, "bad").or_value(Value::Int(2));
        assert_eq!(err.value(), Some(&Value::Int(2)));
    }

    #[test]
    fn test_invalid_condition_reports_kind() {
        let err = ErrorRecord::invalid_condition(&Value::from("yes"));
        assert_eq!(err.kind(), &ErrorKind::InvalidCondition);
        assert!(err.message().contains("string"));
        assert_eq!(err.value(), Some(&Value::from("yes")));
    }
}
