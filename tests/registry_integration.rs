//! Building pipelines from literal definitions

use sluice::filter::{FilterExt, MapStrategy, UnknownFields};
use sluice::rule::Rule;
use sluice::{
    assert_failure_kind, assert_success, ErrorKind, ErrorRecord, Registry, Value, ValueKind,
};

fn call(name: &str, args: impl IntoIterator<Item = Value>) -> Value {
    Value::List(std::iter::once(Value::from(name)).chain(args).collect())
}

#[test]
fn test_custom_filter_and_predicate() {
    let mut registry = Registry::with_builtins();
    registry
        .register_predicate("divisible_by", |v: &Value, args: &[Value]| {
            let n = v.as_int().ok_or("not an int")?;
            let d = args.first().and_then(Value::as_int).ok_or("missing divisor")?;
            Ok(d != 0 && n % d == 0)
        })
        .register_filter("trim", |_: &[Value]| {
            let trim = |v: Value| -> Result<Value, ErrorRecord> {
                match v {
                    Value::Str(s) => Ok(Value::Str(s.trim().to_string())),
                    other => Ok(other),
                }
            };
            Ok(std::sync::Arc::new(trim))
        });

    let literal = Value::list([
        call("trim", []),
        Value::Int(1),
        call("divisible_by", [Value::Int(3)]),
    ]);
    let chain = registry.filter_chain(&literal).unwrap();

    assert_success!(chain.apply(Value::from("  9 ")), Value::Int(9));
    assert_failure_kind!(chain.apply(Value::from("10")), ErrorKind::PredicateFailed);
}

#[test]
fn test_predicate_fault_surfaces_as_bad_call() {
    let registry = Registry::with_builtins();
    let chain = registry
        .filter_chain(&call("greater_than", [Value::Int(0)]))
        .unwrap();

    let err = chain.try_apply(Value::list([1, 2])).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::BadCall);
    assert!(err.is_fault());
}

#[test]
fn test_map_literal_with_strategy() {
    let registry = Registry::with_builtins();
    let literal = Value::record([
        ("age", Value::list([Value::Int(1), call("between", [0.into(), 120.into()])])),
        ("kind", call("is", [Value::from("string")])),
    ]);

    let partial = registry
        .filter_map_builder(&literal)
        .unwrap()
        .unknown_fields(UnknownFields::Drop)
        .build()
        .unwrap();
    assert_eq!(partial.strategy(), MapStrategy::Partial);

    let out = partial
        .try_apply(Value::record([
            ("age", Value::from("130")),
            ("kind", Value::from("cat")),
            ("extra", Value::Null),
        ]))
        .unwrap();
    assert_eq!(out, Value::record([("kind", Value::from("cat"))]));
}

#[test]
fn test_rule_literal_combinators() {
    let registry = Registry::with_builtins();
    let literal = Value::record([(
        "if",
        Value::record([
            ("condition", call("is_type", [Value::from(ValueKind::Int.name())])),
            (
                "then",
                Value::list([call("at_least", [0.into()]), call("at_most", [9.into()])]),
            ),
        ]),
    )]);
    let digit_if_int = registry.rule_def(&literal).unwrap();

    assert_eq!(digit_if_int.evaluate(&Value::Int(7)), Ok(true));
    assert_eq!(digit_if_int.evaluate(&Value::Int(70)), Ok(false));
    assert_eq!(digit_if_int.evaluate(&Value::from("x")), Ok(true));
}

#[test]
fn test_malformed_definitions_fail_at_construction() {
    let registry = Registry::with_builtins();

    let bad = [
        Value::Int(0),
        call("between", [Value::Int(1)]),
        call("is_type", [Value::from("integer")]),
        Value::from("greater_than"),
        Value::record([("any", Value::list(Vec::<Value>::new()))]),
    ];
    for literal in &bad {
        let err = registry.filter_chain(literal).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidDefinition, "{}", literal);
    }

    assert_eq!(
        registry.rule_def(&call("to_int", [])).unwrap_err().kind(),
        &ErrorKind::InvalidDefinition
    );
    assert_eq!(
        registry.rule_def(&Value::from("greater_than")).unwrap_err().kind(),
        &ErrorKind::InvalidDefinition
    );
}

#[cfg(feature = "serde")]
mod json {
    use super::*;

    #[test]
    fn test_map_from_json() {
        let definition: Value = serde_json::from_str(
            r#"{"age": [1, ["between", 0, 120]], "name": 3, "tags": {"all": [["is", "list"]]}}"#,
        )
        .unwrap();
        let registry = Registry::with_builtins();
        let map = registry.filter_map(&definition).unwrap();

        let input: Value = serde_json::json!({"age": "30", "name": 42, "tags": ["a"]}).into();
        let out = map.try_apply(input).unwrap();

        let expected = serde_json::json!({"age": 30, "name": "42", "tags": ["a"]});
        assert_eq!(serde_json::Value::from(out), expected);
    }

    #[test]
    fn test_value_round_trips_through_json() {
        let value = Value::record([
            ("n", Value::Int(1)),
            ("x", Value::Float(1.5)),
            ("s", Value::from("s")),
            ("l", Value::list([Value::Null, Value::Bool(true)])),
        ]);
        let text = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
