//! Combinator engine shared by rulesets and logic filters
//!
//! A combinator evaluates an ordered list of members against one subject,
//! counting how many pass. Each [`Mode`] reduces to a short-circuit
//! [`Policy`] (stop at the first failure, stop at the first success, or
//! evaluate everything) plus a final comparison on the pass count.
//!
//! | Mode | Policy | Passes when |
//! |---|---|---|
//! | `All` | halt on failure | `passed == total` |
//! | `Any` | halt on success | `passed > 0` |
//! | `None` | halt on success | `passed == 0` |
//! | `One` | exhaustive | `passed == 1` |
//! | `AtLeast(k)` | exhaustive | `passed >= k` |
//! | `AtMost(k)` | exhaustive | `passed <= k` |
//! | `Exactly(k)` | exhaustive | `passed == k` |
//!
//! IF/UNLESS are not modes: they are a [`Guard`] (a condition plus a
//! polarity) in front of members that must all pass.
//!
//! # Example
//!
//! ```rust
//! use sluice::combinator::{tally, Mode};
//!
//! let members = [3, 8, 12];
//! let t = tally(&members, Mode::Any.policy(), |_, m| Ok(*m > 5)).unwrap();
//!
//! // ANY stops at the first success
//! assert_eq!(t.evaluated, 2);
//! assert!(Mode::Any.accepts(t.passed, t.total));
//! ```

mod condition;

pub use condition::{Condition, Guard, GuardKind};

use std::fmt;

use crate::{ErrorKind, ErrorRecord};

/// Pass-count policy of a combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Every member must pass
    All,
    /// At least one member must pass
    Any,
    /// No member may pass
    None,
    /// Exactly one member must pass
    One,
    /// At least `k` members must pass
    AtLeast(usize),
    /// At most `k` members may pass
    AtMost(usize),
    /// Exactly `k` members must pass
    Exactly(usize),
}

/// Short-circuit control bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    /// Stop at the first failing member
    pub halt_on_failure: bool,
    /// Stop at the first passing member
    pub halt_on_success: bool,
}

impl Policy {
    /// Evaluate every member.
    pub const EXHAUSTIVE: Policy = Policy {
        halt_on_failure: false,
        halt_on_success: false,
    };
}

impl Mode {
    /// The short-circuit policy for this mode.
    pub fn policy(self) -> Policy {
        match self {
            Mode::All => Policy {
                halt_on_failure: true,
                halt_on_success: false,
            },
            Mode::Any | Mode::None => Policy {
                halt_on_failure: false,
                halt_on_success: true,
            },
            Mode::One | Mode::AtLeast(_) | Mode::AtMost(_) | Mode::Exactly(_) => {
                Policy::EXHAUSTIVE
            }
        }
    }

    /// Decide the outcome from `passed` out of `total` members.
    ///
    /// `passed` only counts members that were evaluated; under a halting
    /// policy the unevaluated remainder can never change the outcome.
    pub fn accepts(self, passed: usize, total: usize) -> bool {
        match self {
            Mode::All => passed == total,
            Mode::Any => passed > 0,
            Mode::None => passed == 0,
            Mode::One => passed == 1,
            Mode::AtLeast(k) => passed >= k,
            Mode::AtMost(k) => passed <= k,
            Mode::Exactly(k) => passed == k,
        }
    }

    /// `true` if a failure with `passed` members is due to too many passing.
    ///
    /// NONE and AT_MOST only fail this way; ONE and EXACTLY can fail either
    /// way.
    pub fn overshoots(self, passed: usize) -> bool {
        match self {
            Mode::None => passed > 0,
            Mode::One => passed > 1,
            Mode::AtMost(k) | Mode::Exactly(k) => passed > k,
            Mode::All | Mode::Any | Mode::AtLeast(_) => false,
        }
    }

    /// Check the member count against this mode's invariants.
    ///
    /// `All`, `Any`, `None` and `One` need at least one member; the threshold
    /// modes need `k <= members`.
    pub fn check_arity(self, members: usize) -> Result<(), ErrorRecord> {
        match self {
            Mode::All | Mode::Any | Mode::None | Mode::One if members == 0 => Err(
                ErrorRecord::invalid_definition(format!("{} needs at least one member", self)),
            ),
            Mode::AtLeast(k) | Mode::AtMost(k) | Mode::Exactly(k) if k > members => {
                Err(ErrorRecord::invalid_definition(format!(
                    "{} needs a count between 0 and {}",
                    self, members
                ))
                .with_context("count", k as i64)
                .with_context("members", members as i64))
            }
            _ => Ok(()),
        }
    }

    /// The error kind reported when this mode fails.
    pub fn failure_kind(self) -> ErrorKind {
        match self {
            Mode::All => ErrorKind::NotAll,
            Mode::Any => ErrorKind::NotAny,
            Mode::None => ErrorKind::NotNone,
            Mode::One => ErrorKind::NotOne,
            Mode::AtLeast(_) => ErrorKind::NotAtLeast,
            Mode::AtMost(_) => ErrorKind::NotAtMost,
            Mode::Exactly(_) => ErrorKind::NotExactly,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::All => f.write_str("ALL"),
            Mode::Any => f.write_str("ANY"),
            Mode::None => f.write_str("NONE"),
            Mode::One => f.write_str("ONE"),
            Mode::AtLeast(k) => write!(f, "AT_LEAST({})", k),
            Mode::AtMost(k) => write!(f, "AT_MOST({})", k),
            Mode::Exactly(k) => write!(f, "EXACTLY({})", k),
        }
    }
}

/// How a combinator combines its members.
#[derive(Debug, Clone)]
pub enum Logic {
    /// Pass-count policy over all members
    Counted(Mode),
    /// Condition in front of members that must all pass
    Guarded(Guard),
}

impl From<Mode> for Logic {
    fn from(mode: Mode) -> Self {
        Logic::Counted(mode)
    }
}

impl From<Guard> for Logic {
    fn from(guard: Guard) -> Self {
        Logic::Guarded(guard)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Counted(mode) => write!(f, "{}", mode),
            Logic::Guarded(guard) => write!(f, "{}({})", guard.kind, guard.condition),
        }
    }
}

/// Pass count of one combinator evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    /// Members that passed
    pub passed: usize,
    /// Members that were evaluated before the policy halted
    pub evaluated: usize,
    /// Members in the combinator
    pub total: usize,
    /// Index of the first passing member
    pub first_pass: Option<usize>,
    /// Index of the first failing member
    pub first_fail: Option<usize>,
}

impl Tally {
    /// `true` if evaluation stopped before the last member.
    pub fn halted(&self) -> bool {
        self.evaluated < self.total
    }
}

/// Evaluate `members` left to right under `policy`.
///
/// `probe` returns `Ok(true)` for a passing member and `Ok(false)` for an
/// ordinary failure. An `Err` from `probe` aborts evaluation and is returned
/// as `BAD_CALL` with the original error attached as cause.
pub fn tally<M, F>(members: &[M], policy: Policy, mut probe: F) -> Result<Tally, ErrorRecord>
where
    F: FnMut(usize, &M) -> Result<bool, ErrorRecord>,
{
    let mut t = Tally {
        total: members.len(),
        ..Tally::default()
    };

    for (index, member) in members.iter().enumerate() {
        let passed = probe(index, member).map_err(|cause| {
            ErrorRecord::new(
                ErrorKind::BadCall,
                format!("member {} raised: {}", index, cause),
            )
            .with_context("member", index as i64)
            .with_cause(cause)
        })?;
        t.evaluated += 1;

        if passed {
            t.passed += 1;
            t.first_pass.get_or_insert(index);
            if policy.halt_on_success {
                break;
            }
        } else {
            t.first_fail.get_or_insert(index);
            if policy.halt_on_failure {
                break;
            }
        }
    }

    Ok(t)
}
