//! Rule sets: variables plus the rules that act on them.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::batch::{BatchExecutor, BatchReport};
use crate::conditions::{Condition, PassConditions};
use crate::core::{BoolReference, Value, VariableStore};
use crate::error::{EngineError, Result};
use crate::operations::{
    BoolOperation, NumberOperation, Operation, ScriptedNumberOperation, VectorOperation,
};
use crate::script::{ExpressionEvaluator, ScriptConfig, ScriptEngine};

/// Schema version written by this crate.
///
/// - v1: operations have no raise flag
/// - v2: operations carry `raise_event`
pub const CURRENT_VERSION: u32 = 2;

/// Errors loading or checking a rule set.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rule set JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid binary rule set: {0}")]
    Binary(#[from] bincode::Error),

    #[error("unsupported rule set version {found} (this build reads 1..={supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A rule refers to variables or expressions that do not check out.
    #[error("rule '{rule}': {source}")]
    InvalidRule {
        rule: String,
        #[source]
        source: EngineError,
    },

    #[error("duplicate rule name: '{0}'")]
    DuplicateRule(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A variable declaration. The initial value fixes the kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub value: Value,
}

impl VariableDef {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named action: a gate plus ordered operation lists.
///
/// `is_available` answers "may this run now?" and `run` performs it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// `None` always passes, like an empty list.
    #[serde(default)]
    pub gate: Option<Vec<Condition>>,
    /// Lists run in order; see [`BatchExecutor`].
    #[serde(default)]
    pub operations: Vec<Vec<Operation>>,
}

impl Rule {
    /// Create a rule with no gate and no operations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gate: None,
            operations: Vec::new(),
        }
    }

    /// Build a rule from the four operation families.
    ///
    /// The lists run bools first, then numbers, then scripted numbers, then
    /// vectors.
    pub fn from_families(
        name: impl Into<String>,
        bools: Vec<BoolOperation>,
        numbers: Vec<NumberOperation>,
        scripted: Vec<ScriptedNumberOperation>,
        vectors: Vec<VectorOperation>,
    ) -> Self {
        Self {
            name: name.into(),
            gate: None,
            operations: vec![
                bools.into_iter().map(Operation::from).collect(),
                numbers.into_iter().map(Operation::from).collect(),
                scripted.into_iter().map(Operation::from).collect(),
                vectors.into_iter().map(Operation::from).collect(),
            ],
        }
    }

    /// Set the gate (builder pattern).
    #[must_use]
    pub fn with_gate(mut self, gate: Vec<Condition>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Append an operation list (builder pattern).
    #[must_use]
    pub fn with_operations(mut self, operations: Vec<Operation>) -> Self {
        self.operations.push(operations);
        self
    }

    /// Whether the gate currently passes.
    pub fn is_available(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<bool> {
        self.gate.as_deref().pass_conditions(store, evaluator)
    }

    /// Run the rule through a [`BatchExecutor`].
    pub fn run(
        &self,
        store: &mut VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<BatchReport> {
        debug!(target: "config", rule = %self.name, "running rule");
        BatchExecutor::run(self.gate.as_deref(), &self.operations, store, evaluator)
    }

    /// Check every condition and operation against a store.
    pub fn validate(
        &self,
        store: &VariableStore,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<()> {
        for condition in self.gate.iter().flatten() {
            condition.validate(store, evaluator)?;
        }
        for operation in self.operations.iter().flatten() {
            operation.validate(store, evaluator)?;
        }
        Ok(())
    }

    fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        self.operations.iter_mut().flatten()
    }
}

/// A complete, versioned configuration.
///
/// Variable ids in references are indices into `variables`, which is also
/// the order [`RuleSet::build_store`] declares them in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub version: u32,
    #[serde(default)]
    pub script: ScriptConfig,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            script: ScriptConfig::default(),
            variables: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl RuleSet {
    /// Create an empty rule set at the current version.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable (builder pattern).
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.push(VariableDef::new(name, value));
        self
    }

    /// Add a rule (builder pattern).
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse JSON and upgrade to the current version.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let mut rule_set: Self = serde_json::from_str(json)?;
        rule_set.upgrade()?;
        Ok(rule_set)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> std::result::Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode the binary form and upgrade to the current version.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, ConfigError> {
        let mut rule_set: Self = bincode::deserialize(bytes)?;
        rule_set.upgrade()?;
        Ok(rule_set)
    }

    /// Encode the binary form.
    pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, ConfigError> {
        Ok(bincode::serialize(self)?)
    }

    /// Bring an older rule set up to [`CURRENT_VERSION`].
    ///
    /// Returns whether anything changed. Upgrading a current rule set is a
    /// no-op, so this runs at most once per stored configuration.
    pub fn upgrade(&mut self) -> std::result::Result<bool, ConfigError> {
        if self.version == 0 || self.version > CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_VERSION,
            });
        }
        if self.version == CURRENT_VERSION {
            return Ok(false);
        }

        let from = self.version;
        let mut migrated = 0usize;
        if self.version < 2 {
            // v1 had no raise flag; every operation raised.
            for rule in &mut self.rules {
                for operation in rule.operations_mut() {
                    *operation.raise_event_mut() = BoolReference::Literal(true);
                    migrated += 1;
                }
            }
            self.version = 2;
        }

        info!(
            target: "config",
            from,
            to = self.version,
            operations = migrated,
            "upgraded rule set"
        );
        Ok(true)
    }

    /// The built-in evaluator configured with this set's limits.
    #[must_use]
    pub fn engine(&self) -> ScriptEngine {
        ScriptEngine::new(self.script)
    }

    /// Declare every variable into a fresh store.
    pub fn build_store(&self) -> std::result::Result<VariableStore, ConfigError> {
        let mut store = VariableStore::new();
        for def in &self.variables {
            store.declare(def.name.clone(), def.value)?;
        }
        Ok(store)
    }

    /// Check every rule against the declared variables.
    ///
    /// Rule names must be unique. Within each rule, bound references must
    /// exist with a compatible kind and expressions must parse.
    pub fn validate(
        &self,
        evaluator: &dyn ExpressionEvaluator,
    ) -> std::result::Result<(), ConfigError> {
        let store = self.build_store()?;
        let mut seen = FxHashSet::default();

        for rule in &self.rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::DuplicateRule(rule.name.clone()));
            }
            rule.validate(&store, evaluator)
                .map_err(|source| ConfigError::InvalidRule {
                    rule: rule.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Look up a rule by name.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }
}
