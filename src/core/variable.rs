//! Variables: named, typed value cells.
//!
//! ## Usage
//!
//! ```
//! use reactive_rules::core::{Value, Variable};
//!
//! let mut gold = Variable::new("Gold", 10);
//! assert_eq!(gold.value(), Value::from(10));
//!
//! // Kind is fixed at creation
//! assert!(gold.assign(Value::from(true)).is_err());
//! assert!(gold.assign(Value::from(25)).is_ok());
//! assert_eq!(gold.to_string(), "Gold = 25");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

use super::value::{Value, VariableKind};

/// Identifier of a variable within a [`VariableStore`](super::VariableStore).
///
/// Ids are dense indices handed out in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariableId(pub u32);

impl VariableId {
    /// Create a new variable ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({})", self.0)
    }
}

/// A named value cell whose kind never changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    value: Value,
}

impl Variable {
    /// Create a variable. Its kind is the kind of `value`.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> Value {
        self.value
    }

    /// Declared kind.
    #[must_use]
    pub fn kind(&self) -> VariableKind {
        self.value.kind()
    }

    /// Replace the value, keeping the kind.
    ///
    /// Returns [`EngineError::KindMismatch`] and leaves the variable
    /// untouched if `value` has a different kind.
    pub fn assign(&mut self, value: Value) -> Result<()> {
        self.expect_kind(value.kind())?;
        self.value = value;
        Ok(())
    }

    /// Fail with [`EngineError::KindMismatch`] unless this variable is `expected`.
    pub(crate) fn expect_kind(&self, expected: VariableKind) -> Result<()> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(self.mismatch(&expected))
        }
    }

    pub(crate) fn mismatch(&self, expected: &dyn fmt::Display) -> EngineError {
        EngineError::KindMismatch {
            variable: self.name.clone(),
            expected: expected.to_string(),
            found: self.kind(),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}
