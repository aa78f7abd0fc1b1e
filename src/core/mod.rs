//! Core data model: values, variables, the variable store, and references.
//!
//! Everything else in the crate reads and writes variables through these
//! types. Variables are owned by a [`VariableStore`] and addressed by
//! [`VariableId`]; references either hold a literal or point at a variable.

pub mod value;
pub mod variable;
pub mod store;
pub mod reference;

pub use value::{Number, NumberKind, Value, VariableKind, VectorShape, VectorValue};
pub use variable::{Variable, VariableId};
pub use store::{Observer, SubscriptionId, VariableStore};
pub use reference::{BoolReference, NumberReference, VectorReference};
