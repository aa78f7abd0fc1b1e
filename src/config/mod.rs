//! Declarative configuration.
//!
//! A [`RuleSet`] carries everything an application loads at startup:
//! - `variables`: names and initial values, declared in order
//! - `rules`: named gates with their operation lists
//! - `script`: limits for the built-in evaluator
//!
//! Rule sets are plain serde data. They load from JSON or bincode and are
//! upgraded to [`CURRENT_VERSION`] as part of loading. A v1 set predates
//! the operation raise flag; upgrading turns every flag on once and bumps
//! the version, so later edits to the flags are never overwritten.

mod rule_set;

pub use rule_set::{ConfigError, Rule, RuleSet, VariableDef, CURRENT_VERSION};
