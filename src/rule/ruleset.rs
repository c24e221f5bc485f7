//! Boolean combinators over rules

use std::fmt;
use std::sync::Arc;

use super::Rule;
use crate::combinator::{tally, Condition, Guard, Logic, Mode, Tally};
use crate::{ErrorRecord, Value};

/// An ordered list of rules combined under a [`Logic`].
///
/// Members see the same subject, left to right. Construction checks the
/// member count against the mode, so an invalid ruleset never exists.
///
/// # Example
///
/// ```rust
/// use sluice::combinator::Condition;
/// use sluice::rule::{equal_to, greater_than, Ruleset};
/// use sluice::Value;
///
/// // only validate positive numbers; everything else passes
/// let guarded = Ruleset::when(Condition::rule(greater_than(0)))
///     .rule(equal_to(42))
///     .build()
///     .unwrap();
///
/// assert_eq!(guarded.check(&Value::Int(-3)), Ok(true));
/// assert_eq!(guarded.check(&Value::Int(42)), Ok(true));
/// assert_eq!(guarded.check(&Value::Int(7)), Ok(false));
/// ```
#[derive(Clone)]
pub struct Ruleset {
    logic: Logic,
    members: Vec<Arc<dyn Rule>>,
}

impl Ruleset {
    /// A counted ruleset; fails with `INVALID_DEFINITION` if `members` does
    /// not satisfy `mode`.
    pub fn new(mode: Mode, members: Vec<Arc<dyn Rule>>) -> Result<Self, ErrorRecord> {
        mode.check_arity(members.len())?;
        Ok(Ruleset {
            logic: Logic::Counted(mode),
            members,
        })
    }

    /// An IF/UNLESS ruleset; zero guarded members is allowed.
    pub fn guarded(guard: Guard, members: Vec<Arc<dyn Rule>>) -> Self {
        Ruleset {
            logic: Logic::Guarded(guard),
            members,
        }
    }

    pub(crate) fn pair(mode: Mode, first: Arc<dyn Rule>, second: Arc<dyn Rule>) -> Self {
        Ruleset {
            logic: Logic::Counted(mode),
            members: vec![first, second],
        }
    }

    /// Start building a counted ruleset.
    pub fn builder(mode: Mode) -> RulesetBuilder {
        RulesetBuilder::new(Logic::Counted(mode))
    }

    /// Start building an IF ruleset.
    pub fn when(condition: impl Into<Condition>) -> RulesetBuilder {
        RulesetBuilder::new(Logic::Guarded(Guard::when(condition)))
    }

    /// Start building an UNLESS ruleset.
    pub fn unless(condition: impl Into<Condition>) -> RulesetBuilder {
        RulesetBuilder::new(Logic::Guarded(Guard::unless(condition)))
    }

    /// How members are combined.
    pub fn logic(&self) -> &Logic {
        &self.logic
    }

    /// The member rules, in evaluation order.
    pub fn members(&self) -> &[Arc<dyn Rule>] {
        &self.members
    }

    /// Evaluate against `subject`.
    pub fn check(&self, subject: &Value) -> Result<bool, ErrorRecord> {
        self.evaluate(subject)
    }

    /// Evaluate against each subject in turn, stopping at the first fault.
    pub fn check_each<'a, I>(&self, subjects: I) -> Result<Vec<bool>, ErrorRecord>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        subjects
            .into_iter()
            .map(|subject| self.evaluate(subject))
            .collect()
    }

    /// The raw pass count of the members against `subject`.
    ///
    /// For a guarded ruleset whose guard does not engage, nothing is
    /// evaluated and the tally is empty.
    pub fn tally(&self, subject: &Value) -> Result<Tally, ErrorRecord> {
        let policy = match &self.logic {
            Logic::Counted(mode) => mode.policy(),
            Logic::Guarded(guard) => {
                if !guard.engages(subject)? {
                    return Ok(Tally {
                        total: self.members.len(),
                        ..Tally::default()
                    });
                }
                Mode::All.policy()
            }
        };

        tally(&self.members, policy, |_, member| member.evaluate(subject))
    }
}

impl Rule for Ruleset {
    fn evaluate(&self, subject: &Value) -> Result<bool, ErrorRecord> {
        let outcome = match &self.logic {
            Logic::Counted(mode) => {
                let t = self.tally(subject)?;
                let passed = mode.accepts(t.passed, t.total);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    mode = %mode,
                    passed = t.passed,
                    evaluated = t.evaluated,
                    total = t.total,
                    outcome = passed,
                    "ruleset settled"
                );

                passed
            }
            Logic::Guarded(guard) => {
                if !guard.engages(subject)? {
                    return Ok(true);
                }
                let t = tally(&self.members, Mode::All.policy(), |_, member| {
                    member.evaluate(subject)
                })?;

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    guard = %guard.kind,
                    passed = t.passed,
                    total = t.total,
                    "guarded ruleset settled"
                );

                t.passed == t.total
            }
        };
        Ok(outcome)
    }

    fn describe(&self) -> String {
        let members: Vec<String> = self.members.iter().map(|m| m.describe()).collect();
        format!("{}[{}]", self.logic, members.join(", "))
    }
}

impl fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.members.iter().map(|m| m.describe()).collect();
        f.debug_struct("Ruleset")
            .field("logic", &self.logic)
            .field("members", &members)
            .finish()
    }
}

/// Builder for [`Ruleset`].
pub struct RulesetBuilder {
    logic: Logic,
    members: Vec<Arc<dyn Rule>>,
}

impl RulesetBuilder {
    /// Start with no members.
    pub fn new(logic: Logic) -> Self {
        RulesetBuilder {
            logic,
            members: Vec::new(),
        }
    }

    /// Append a member rule.
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.members.push(Arc::new(rule));
        self
    }

    /// Append an already shared member rule.
    pub fn shared(mut self, rule: Arc<dyn Rule>) -> Self {
        self.members.push(rule);
        self
    }

    /// Validate the member count and build the ruleset.
    pub fn build(self) -> Result<Ruleset, ErrorRecord> {
        match self.logic {
            Logic::Counted(mode) => Ruleset::new(mode, self.members),
            Logic::Guarded(guard) => Ok(Ruleset::guarded(guard, self.members)),
        }
    }
}

impl fmt::Debug for RulesetBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulesetBuilder")
            .field("logic", &self.logic)
            .field("members", &self.members.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{greater_than, less_than, PredicateRule, RuleExt};
    use crate::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(result: bool, calls: &Arc<AtomicUsize>) -> Arc<dyn Rule> {
        let calls = Arc::clone(calls);
        Arc::new(move |_: &Value| {
            calls.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    #[test]
    fn test_all_in_range() {
        let rs = Ruleset::builder(Mode::All)
            .rule(greater_than(0))
            .rule(less_than(10))
            .build()
            .unwrap();

        assert_eq!(rs.check(&Value::Int(5)), Ok(true));
        assert_eq!(rs.check(&Value::Int(15)), Ok(false));
    }

    #[test]
    fn test_guards_describe_their_condition() {
        let positive = Ruleset::when(Condition::rule(greater_than(0)))
            .rule(less_than(10))
            .build()
            .unwrap();
        let negative = Ruleset::when(Condition::rule(less_than(0)))
            .rule(less_than(10))
            .build()
            .unwrap();

        assert_eq!(positive.describe(), "IF(greater_than(0))[less_than(10)]");
        assert_ne!(positive.describe(), negative.describe());
        assert!(format!("{:?}", negative).contains("less_than(0)"));
    }

    #[test]
    fn test_all_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rs = Ruleset::new(
            Mode::All,
            vec![counting(false, &calls), counting(true, &calls)],
        )
        .unwrap();

        assert_eq!(rs.check(&Value::Null), Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_any_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rs = Ruleset::new(
            Mode::Any,
            vec![counting(true, &calls), counting(false, &calls)],
        )
        .unwrap();

        assert_eq!(rs.check(&Value::Null), Ok(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exactly_is_exhaustive() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rs = Ruleset::new(
            Mode::Exactly(1),
            vec![
                counting(true, &calls),
                counting(false, &calls),
                counting(true, &calls),
            ],
        )
        .unwrap();

        assert_eq!(rs.check(&Value::Null), Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_none_and_one() {
        let none = Ruleset::builder(Mode::None)
            .rule(greater_than(10))
            .rule(less_than(0))
            .build()
            .unwrap();
        assert_eq!(none.check(&Value::Int(5)), Ok(true));
        assert_eq!(none.check(&Value::Int(50)), Ok(false));

        let one = Ruleset::builder(Mode::One)
            .rule(greater_than(0))
            .rule(greater_than(10))
            .build()
            .unwrap();
        assert_eq!(one.check(&Value::Int(5)), Ok(true));
        assert_eq!(one.check(&Value::Int(50)), Ok(false));
    }

    #[test]
    fn test_invalid_definitions() {
        let err = Ruleset::builder(Mode::Any).build().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidDefinition);

        let err = Ruleset::builder(Mode::AtLeast(3))
            .rule(greater_than(0))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidDefinition);
    }

    #[test]
    fn test_if_condition_fails_passes() {
        let rs = Ruleset::when(false).rule(|_: &Value| false).build().unwrap();
        assert_eq!(rs.check(&Value::Null), Ok(true));
    }

    #[test]
    fn test_unless() {
        let skip_nulls = Ruleset::unless(Condition::rule(|v: &Value| v.is_null()))
            .rule(greater_than(0))
            .build()
            .unwrap();

        assert_eq!(skip_nulls.check(&Value::Null), Ok(true));
        assert_eq!(skip_nulls.check(&Value::Int(1)), Ok(true));
        assert_eq!(skip_nulls.check(&Value::Int(-1)), Ok(false));
    }

    #[test]
    fn test_guard_with_no_members() {
        let rs = Ruleset::when(true).build().unwrap();
        assert_eq!(rs.check(&Value::Int(1)), Ok(true));
    }

    #[test]
    fn test_non_boolean_condition() {
        let rs = Ruleset::when(Condition::Literal(Value::from("maybe")))
            .rule(greater_than(0))
            .build()
            .unwrap();

        let err = rs.check(&Value::Int(1)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidCondition);
    }

    #[test]
    fn test_nested_failure_is_wrapped() {
        let boom = PredicateRule::new(
            "boom",
            |_: &Value, _: &[Value]| Err("kaboom".into()),
            vec![],
        );
        let rs = Ruleset::builder(Mode::Any)
            .rule(|_: &Value| false)
            .rule(boom)
            .build()
            .unwrap();

        let err = rs.check(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BadCall);
        assert_eq!(err.context_value("member"), Some(&Value::Int(1)));
        assert!(err.root_record().message().contains("kaboom"));
    }

    #[test]
    fn test_nested_rulesets() {
        let small = greater_than(0).and(less_than(10));
        let large = greater_than(100).and(less_than(1000));
        let either = small.or(large);

        assert_eq!(either.check(&Value::Int(5)), Ok(true));
        assert_eq!(either.check(&Value::Int(500)), Ok(true));
        assert_eq!(either.check(&Value::Int(50)), Ok(false));
    }

    #[test]
    fn test_check_each() {
        let rs = Ruleset::builder(Mode::All).rule(greater_than(0)).build().unwrap();
        let subjects = [Value::Int(1), Value::Int(-1), Value::Int(2)];
        assert_eq!(rs.check_each(&subjects), Ok(vec![true, false, true]));
    }

    #[test]
    fn test_tally_reports_counts() {
        let rs = Ruleset::builder(Mode::AtLeast(1))
            .rule(greater_than(0))
            .rule(greater_than(5))
            .rule(greater_than(10))
            .build()
            .unwrap();

        let t = rs.tally(&Value::Int(7)).unwrap();
        assert_eq!((t.passed, t.evaluated, t.total), (2, 3, 3));
    }

    #[test]
    fn test_describe() {
        let rs = greater_than(0).and(less_than(10));
        assert_eq!(rs.describe(), "ALL[greater_than(0), less_than(10)]");
    }
}
