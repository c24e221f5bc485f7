//! Test helpers for filter outcomes
//!
//! Assertion macros that read a [`Validation`](crate::Validation) the way a
//! filter test wants to, plus (with the `proptest` feature) strategies for
//! generating [`Value`](crate::Value) inputs.
//!
//! ```rust
//! use sluice::filter::{to_int, FilterExt};
//! use sluice::{assert_failure, assert_failure_kind, assert_success, ErrorKind, Value};
//!
//! assert_success!(to_int().apply(Value::from("4")));
//! assert_success!(to_int().apply(Value::from("4")), Value::Int(4));
//!
//! assert_failure!(to_int().apply(Value::from("four")));
//! assert_failure_kind!(to_int().apply(Value::from("four")), ErrorKind::Inconvertable);
//! ```

#[cfg(feature = "proptest")]
use crate::Value;
#[cfg(feature = "proptest")]
use proptest::prelude::*;

/// Assert the filter accepted its input, optionally checking the output.
#[macro_export]
macro_rules! assert_success {
    ($outcome:expr) => {
        if let $crate::Validation::Failure(err) = $outcome {
            panic!("filter rejected its input: {}", err);
        }
    };
    ($outcome:expr, $expected:expr) => {
        match $outcome {
            $crate::Validation::Success(out) => assert_eq!(out, $expected),
            $crate::Validation::Failure(err) => {
                panic!("expected {:?}, filter rejected its input: {}", $expected, err)
            }
        }
    };
}

/// Assert the filter rejected its input.
#[macro_export]
macro_rules! assert_failure {
    ($outcome:expr) => {
        if let $crate::Validation::Success(out) = $outcome {
            panic!("filter accepted its input as {:?}", out);
        }
    };
}

/// Assert the filter rejected its input with the given [`ErrorKind`](crate::ErrorKind).
#[macro_export]
macro_rules! assert_failure_kind {
    ($outcome:expr, $kind:expr) => {
        match $outcome {
            $crate::Validation::Failure(err) => {
                assert_eq!(err.kind(), &$kind, "rejected for another reason: {}", err)
            }
            $crate::Validation::Success(out) => {
                panic!("expected {} rejection, filter accepted {:?}", $kind, out)
            }
        }
    };
}

/// Scalar values, with numeric strings over-represented so conversions are
/// exercised on both sides.
#[cfg(feature = "proptest")]
pub fn scalar_value() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::Int),
        (-1000.0f64..1000.0).prop_map(Value::Float),
        "-?[0-9]{1,4}".prop_map(Value::Str),
        "[a-z ]{0,8}".prop_map(Value::Str),
    ]
    .boxed()
}

#[cfg(feature = "proptest")]
impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        scalar_value()
            .prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                    prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(Value::Map),
                ]
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::{to_int, Between, FilterExt};
    use crate::{ErrorKind, Value};

    #[test]
    fn test_success_macros() {
        assert_success!(Between::new(0, 9).apply(Value::Int(3)));
        assert_success!(to_int().apply(Value::from("7")), Value::Int(7));
    }

    #[test]
    fn test_failure_macros() {
        assert_failure!(Between::new(0, 9).apply(Value::Int(30)));
        assert_failure_kind!(to_int().apply(Value::Null), ErrorKind::UnsupportedConversion);
    }

    #[test]
    #[should_panic(expected = "filter rejected its input")]
    fn test_success_panics_on_rejection() {
        assert_success!(to_int().apply(Value::from("x")));
    }

    #[test]
    #[should_panic(expected = "filter accepted its input")]
    fn test_failure_panics_on_acceptance() {
        assert_failure!(to_int().apply(Value::Int(1)));
    }

    #[test]
    #[should_panic(expected = "rejected for another reason")]
    fn test_failure_kind_panics_on_other_kind() {
        assert_failure_kind!(to_int().apply(Value::from("x")), ErrorKind::NotAll);
    }

    #[cfg(feature = "proptest")]
    mod strategies {
        use crate::filter::{to_str, FilterExt};
        use crate::testing::scalar_value;
        use crate::Value;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_scalars_always_stringify(value in scalar_value()) {
                prop_assume!(!value.is_null());
                prop_assert!(to_str().apply(value).is_success());
            }

            #[test]
            fn prop_nested_values_display(value in any::<Value>()) {
                prop_assert!(!value.to_string().is_empty());
            }
        }
    }
}
