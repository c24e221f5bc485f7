//! # Sluice
//!
//! Composable rule and filter evaluation over dynamic values.
//!
//! - **Rules** answer a yes/no question about a value. Leaf rules wrap an
//!   invocable with bound arguments; rulesets combine rules under a
//!   pass-count mode (`ALL`, `ANY`, `NONE`, `ONE`, `AT_LEAST(k)`,
//!   `AT_MOST(k)`, `EXACTLY(k)`) or behind an `IF`/`UNLESS` guard, with
//!   short-circuit evaluation.
//! - **Filters** accept a value, possibly normalizing it, or reject it with a
//!   structured [`ErrorRecord`]. They compose sequentially
//!   ([`FilterChain`](filter::FilterChain)), under the same modes as rules
//!   ([`FilterCombinator`](filter::FilterCombinator)), and per record field
//!   ([`FilterMap`](filter::FilterMap)).
//!
//! Every call returns its own outcome: a boolean for rules, and a
//! [`Validation`] (`Success(value)` or `Failure(error)`) for filters. No
//! error state is kept on the rule or filter, so instances can be shared
//! freely between threads.
//!
//! ## Quick Example
//!
//! ```rust
//! use sluice::prelude::*;
//! use sluice::filters;
//!
//! // Rules
//! let in_range = Ruleset::builder(Mode::All)
//!     .rule(greater_than(0))
//!     .rule(less_than(10))
//!     .build()
//!     .unwrap();
//! assert_eq!(in_range.check(&Value::Int(5)), Ok(true));
//! assert_eq!(in_range.check(&Value::Int(15)), Ok(false));
//!
//! // Filters
//! let age = FilterChain::new(filters![to_int(), Between::new(1, 10)]).unwrap();
//! assert_eq!(age.apply(Value::from("7")).ok(), Some(Value::Int(7)));
//!
//! match age.apply(Value::from("50")) {
//!     Validation::Success(v) => println!("accepted {}", v),
//!     Validation::Failure(err) => assert_eq!(err.kind(), &ErrorKind::NotBetween),
//! }
//! ```
//!
//! ## Features
//!
//! - `tracing`: debug events when combinators settle, chains abort and map
//!   fields fail; a warning whenever an invocable raises.
//! - `serde`: `Serialize`/`Deserialize` for [`Value`] and conversions to and
//!   from `serde_json::Value`.
//! - `proptest`: `Value` strategies in [`testing`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod combinator;
pub mod error;
pub mod filter;
pub mod registry;
pub mod rule;
pub mod semigroup;
pub mod testing;
pub mod validation;
pub mod value;

// Re-exports
pub use error::{BoxError, ErrorKind, ErrorRecord};
pub use registry::Registry;
pub use semigroup::Semigroup;
pub use validation::Validation;
pub use value::{Record, Value, ValueKind};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::combinator::{Condition, Guard, Mode};
    pub use crate::error::{ErrorKind, ErrorRecord};
    pub use crate::filter::{
        to_bool, to_float, to_int, to_str, Between, Filter, FilterChain, FilterCombinator,
        FilterDef, FilterExt, FilterMap, Is, MapStrategy, UnknownFields,
    };
    pub use crate::registry::Registry;
    pub use crate::rule::{
        at_least, at_most, equal_to, greater_than, is_type, less_than, one_of, PredicateRule, Rule,
        RuleExt, Ruleset,
    };
    pub use crate::semigroup::Semigroup;
    pub use crate::validation::Validation;
    pub use crate::value::{Record, Value, ValueKind};
}
