//! Property-based tests for the combinator modes over rules

use proptest::prelude::*;
use sluice::combinator::Mode;
use sluice::rule::{Rule, Ruleset};
use sluice::Value;
use std::sync::Arc;

fn constant(outcome: bool) -> Arc<dyn Rule> {
    Arc::new(move |_: &Value| outcome)
}

fn ruleset(mode: Mode, outcomes: &[bool]) -> Ruleset {
    Ruleset::new(mode, outcomes.iter().map(|&b| constant(b)).collect())
        .expect("valid arity")
}

fn check(mode: Mode, outcomes: &[bool]) -> bool {
    ruleset(mode, outcomes)
        .check(&Value::Null)
        .expect("constant rules never fault")
}

fn outcomes() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..12)
}

proptest! {
    #[test]
    fn prop_all_iff_every_member_passes(outcomes in outcomes()) {
        prop_assert_eq!(check(Mode::All, &outcomes), outcomes.iter().all(|b| *b));
    }

    #[test]
    fn prop_all_flips_on_any_single_failure(len in 1usize..12, idx in any::<prop::sample::Index>()) {
        let mut outcomes = vec![true; len];
        prop_assert!(check(Mode::All, &outcomes));

        outcomes[idx.index(len)] = false;
        prop_assert!(!check(Mode::All, &outcomes));
    }

    #[test]
    fn prop_any_is_not_none(outcomes in outcomes()) {
        prop_assert_eq!(check(Mode::Any, &outcomes), !check(Mode::None, &outcomes));
    }

    #[test]
    fn prop_at_least_is_monotone(outcomes in outcomes(), k in 1usize..12) {
        let k = k.min(outcomes.len());
        if check(Mode::AtLeast(k), &outcomes) {
            prop_assert!(check(Mode::AtLeast(k - 1), &outcomes));
        }
    }

    #[test]
    fn prop_thresholds_agree_with_count(outcomes in outcomes()) {
        let passed = outcomes.iter().filter(|b| **b).count();

        prop_assert!(check(Mode::Exactly(passed), &outcomes));
        prop_assert!(check(Mode::AtLeast(passed), &outcomes));
        prop_assert!(check(Mode::AtMost(passed), &outcomes));
        prop_assert_eq!(check(Mode::One, &outcomes), passed == 1);
    }

    #[test]
    fn prop_all_stops_at_first_failure(outcomes in outcomes()) {
        let t = ruleset(Mode::All, &outcomes).tally(&Value::Null).unwrap();
        let expected = outcomes
            .iter()
            .position(|b| !*b)
            .map_or(outcomes.len(), |i| i + 1);
        prop_assert_eq!(t.evaluated, expected);
    }

    #[test]
    fn prop_exhaustive_modes_see_every_member(outcomes in outcomes()) {
        let t = ruleset(Mode::AtMost(0), &outcomes).tally(&Value::Null).unwrap();
        prop_assert_eq!(t.evaluated, outcomes.len());
    }

    #[test]
    fn prop_threshold_above_member_count_is_rejected(len in 0usize..8, extra in 1usize..4) {
        let members: Vec<Arc<dyn Rule>> = (0..len).map(|_| constant(true)).collect();
        prop_assert!(Ruleset::new(Mode::Exactly(len + extra), members).is_err());
    }
}
