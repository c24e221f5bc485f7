//! Combinator modes over filters

use std::fmt;
use std::mem;

use super::definition::normalize_all;
use super::{Filter, FilterDef, FilterExt, Step};
use crate::combinator::{tally, Condition, Guard, Logic, Mode, Tally};
use crate::{ErrorKind, ErrorRecord, Validation, Value};

/// Filters combined under a [`Logic`].
///
/// A member passes when its `apply` succeeds. What comes out depends on the
/// logic:
///
/// - `All` threads the value through every member, like a chain;
/// - `Any`, `One` and the threshold modes run every member on the original
///   input and return the output of the first member that passed (or the
///   input when none had to);
/// - `None` returns the input unchanged;
/// - a guard returns the input untouched when it does not engage, and
///   otherwise threads the input through every member.
///
/// Rejection uses the mode's kind (`NOT_ALL`, `NOT_NONE`, ...) with the
/// member descriptions, the pass count and the input as context, and the
/// first member rejection as cause.
///
/// # Example
///
/// ```rust
/// use sluice::filter::{FilterCombinator, FilterExt, Is};
/// use sluice::{filters, ErrorKind, Value, ValueKind};
///
/// let neither = FilterCombinator::none(filters![
///     Is::new(ValueKind::Int),
///     Is::new(ValueKind::Str),
/// ])
/// .unwrap();
///
/// assert_eq!(neither.try_apply(Value::Float(3.5)), Ok(Value::Float(3.5)));
/// assert_eq!(neither.try_apply(Value::Int(3)).unwrap_err().kind(), &ErrorKind::NotNone);
/// ```
#[derive(Clone)]
pub struct FilterCombinator {
    logic: Logic,
    members: Vec<Step>,
}

impl FilterCombinator {
    /// A counted combinator; fails with `INVALID_DEFINITION` if a definition
    /// is malformed or the member count does not satisfy `mode`.
    pub fn new<I>(mode: Mode, defs: I) -> Result<Self, ErrorRecord>
    where
        I: IntoIterator<Item = FilterDef>,
    {
        let members = normalize_all(defs)?;
        mode.check_arity(members.len())?;
        Ok(FilterCombinator {
            logic: Logic::Counted(mode),
            members,
        })
    }

    /// An IF/UNLESS combinator; zero guarded members is allowed.
    pub fn guarded<I>(guard: Guard, defs: I) -> Result<Self, ErrorRecord>
    where
        I: IntoIterator<Item = FilterDef>,
    {
        Ok(FilterCombinator {
            logic: Logic::Guarded(guard),
            members: normalize_all(defs)?,
        })
    }

    /// ALL of `defs`.
    pub fn all<I: IntoIterator<Item = FilterDef>>(defs: I) -> Result<Self, ErrorRecord> {
        Self::new(Mode::All, defs)
    }

    /// ANY of `defs`.
    pub fn any<I: IntoIterator<Item = FilterDef>>(defs: I) -> Result<Self, ErrorRecord> {
        Self::new(Mode::Any, defs)
    }

    /// NONE of `defs`.
    pub fn none<I: IntoIterator<Item = FilterDef>>(defs: I) -> Result<Self, ErrorRecord> {
        Self::new(Mode::None, defs)
    }

    /// ONE of `defs`.
    pub fn one<I: IntoIterator<Item = FilterDef>>(defs: I) -> Result<Self, ErrorRecord> {
        Self::new(Mode::One, defs)
    }

    /// AT_LEAST `k` of `defs`.
    pub fn at_least<I: IntoIterator<Item = FilterDef>>(k: usize, defs: I) -> Result<Self, ErrorRecord> {
        Self::new(Mode::AtLeast(k), defs)
    }

    /// AT_MOST `k` of `defs`.
    pub fn at_most<I: IntoIterator<Item = FilterDef>>(k: usize, defs: I) -> Result<Self, ErrorRecord> {
        Self::new(Mode::AtMost(k), defs)
    }

    /// EXACTLY `k` of `defs`.
    pub fn exactly<I: IntoIterator<Item = FilterDef>>(k: usize, defs: I) -> Result<Self, ErrorRecord> {
        Self::new(Mode::Exactly(k), defs)
    }

    /// IF `condition` holds, ALL of `defs`.
    pub fn when<I>(condition: impl Into<Condition>, defs: I) -> Result<Self, ErrorRecord>
    where
        I: IntoIterator<Item = FilterDef>,
    {
        Self::guarded(Guard::when(condition), defs)
    }

    /// UNLESS `condition` holds, ALL of `defs`.
    pub fn unless<I>(condition: impl Into<Condition>, defs: I) -> Result<Self, ErrorRecord>
    where
        I: IntoIterator<Item = FilterDef>,
    {
        Self::guarded(Guard::unless(condition), defs)
    }

    /// How members are combined.
    pub fn logic(&self) -> &Logic {
        &self.logic
    }

    /// The member steps, in evaluation order.
    pub fn members(&self) -> &[Step] {
        &self.members
    }

    // Sequential application; output of one member feeds the next.
    fn thread(&self, input: Value, kind: ErrorKind) -> Result<Value, ErrorRecord> {
        let mut current = input.clone();
        let mut rejection = None;

        let t = tally(&self.members, Mode::All.policy(), |_, member| {
            match member.apply(mem::take(&mut current)) {
                Validation::Success(next) => {
                    current = next;
                    Ok(true)
                }
                Validation::Failure(err) if err.is_fault() => Err(err),
                Validation::Failure(err) => {
                    rejection = Some(err);
                    Ok(false)
                }
            }
        })?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            logic = %self.logic,
            passed = t.passed,
            evaluated = t.evaluated,
            total = t.total,
            outcome = t.passed == t.total,
            "filter combinator settled"
        );

        if t.passed == t.total {
            Ok(current)
        } else {
            Err(self.rejection(kind, input, &t, rejection))
        }
    }

    // Independent application; every member sees the original input.
    fn select(&self, mode: Mode, input: Value) -> Result<Value, ErrorRecord> {
        let mut selected = None;
        let mut rejection = None;

        let t = tally(&self.members, mode.policy(), |_, member| {
            match member.apply(input.clone()) {
                Validation::Success(output) => {
                    selected.get_or_insert(output);
                    Ok(true)
                }
                Validation::Failure(err) if err.is_fault() => Err(err),
                Validation::Failure(err) => {
                    rejection.get_or_insert(err);
                    Ok(false)
                }
            }
        })?;
        let accepted = mode.accepts(t.passed, t.total);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            logic = %self.logic,
            passed = t.passed,
            evaluated = t.evaluated,
            total = t.total,
            outcome = accepted,
            "filter combinator settled"
        );

        match (accepted, mode, selected) {
            // too many passed: no member rejection explains the failure
            (false, _, _) if mode.overshoots(t.passed) => {
                let err = self.rejection(mode.failure_kind(), input, &t, None);
                Err(match t.first_pass {
                    Some(index) => err.with_context("first_pass", index as i64),
                    None => err,
                })
            }
            (false, _, _) => Err(self.rejection(mode.failure_kind(), input, &t, rejection)),
            (true, Mode::None, _) | (true, _, None) => Ok(input),
            (true, _, Some(output)) => Ok(output),
        }
    }

    fn rejection(
        &self,
        kind: ErrorKind,
        input: Value,
        t: &Tally,
        cause: Option<ErrorRecord>,
    ) -> ErrorRecord {
        let members = Value::list(self.members.iter().map(|m| m.describe()));
        let err = ErrorRecord::new(
            kind,
            format!("{}: {} of {} members passed", self.logic, t.passed, t.total),
        )
        .with_context("members", members)
        .with_context("passed", t.passed as i64)
        .with_context("input", input.clone())
        .with_value(input);

        match cause {
            Some(cause) => err.with_cause(cause),
            None => err,
        }
    }
}

impl Filter for FilterCombinator {
    fn filter(&self, value: Value) -> Result<Value, ErrorRecord> {
        match &self.logic {
            Logic::Counted(Mode::All) => self.thread(value, ErrorKind::NotAll),
            Logic::Counted(mode) => self.select(*mode, value),
            Logic::Guarded(guard) => {
                if !guard.engages(&value)? {
                    return Ok(value);
                }
                self.thread(value, guard.kind.failure_kind())
            }
        }
    }

    fn invertible(&self) -> bool {
        self.members.iter().all(|member| member.invertible())
    }

    fn describe(&self) -> String {
        let members: Vec<String> = self.members.iter().map(|m| m.describe()).collect();
        format!("{}[{}]", self.logic, members.join(", "))
    }
}

impl fmt::Debug for FilterCombinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.members.iter().map(|m| m.describe()).collect();
        f.debug_struct("FilterCombinator")
            .field("logic", &self.logic)
            .field("members", &members)
            .finish()
    }
}
