//! Pipelines run under an installed subscriber

use sluice::combinator::Mode;
use sluice::filter::{to_int, Between, FilterCombinator, FilterExt, FilterMap};
use sluice::rule::{greater_than, Rule, Ruleset};
use sluice::{filters, ErrorKind, Value};

fn init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_events_do_not_change_outcomes() {
    init();

    let any = FilterCombinator::any(filters![to_int(), Between::new(0, 1)]).unwrap();
    assert_eq!(any.try_apply(Value::from("3")), Ok(Value::Int(3)));

    let map = FilterMap::new([("n", filters![to_int()])]).unwrap();
    let results = map.apply_fields(&Value::record([("n", Value::from("x"))])).unwrap();
    assert_eq!(results.errors.len(), 1);

    let rules = Ruleset::builder(Mode::AtLeast(1))
        .rule(greater_than(0))
        .build()
        .unwrap();
    assert_eq!(
        rules.evaluate(&Value::from("text")).unwrap_err().kind(),
        &ErrorKind::BadCall
    );
}
