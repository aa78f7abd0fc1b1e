//! The built-in expression evaluator.
//!
//! [`ScriptEngine`] lexes, parses and interprets an expression on every
//! call. Work is bounded by [`ScriptConfig`]: the source length, the tree
//! depth and the number of evaluation steps are all capped, so a call
//! always returns promptly with either a value or an [`EvalError`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::error::EvalError;
use super::lexer::tokenize;
use super::parser::{parse, BinaryOp, Expr, UnaryOp};
use super::value::{Bindings, ScriptValue};
use super::ExpressionEvaluator;

/// Limits applied to every evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Longest accepted source text, in bytes.
    pub max_length: usize,
    /// Deepest accepted nesting. Counts parentheses and also the height of
    /// the parsed tree, so a long `a + b + ...` chain is held to it too.
    pub max_depth: u32,
    /// Most expression nodes evaluated per call.
    pub max_steps: u32,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_length: 4096,
            max_depth: 64,
            max_steps: 10_000,
        }
    }
}

/// Lua-flavoured expression evaluator.
///
/// Truthiness differs from Lua: `0`, NaN and `""` are falsy here, as are
/// `false` and `nil`. This applies to `not`, `and` and `or` as well as to
/// condition results, so `not 0` is `true` and `0 and 1 or 2` is `2`.
/// Lua would give `false` and `1`.
///
/// ```
/// use reactive_rules::script::{Bindings, ExpressionEvaluator, ScriptEngine, ScriptValue};
///
/// let engine = ScriptEngine::default();
/// let bindings = Bindings::new().with("nA", 5.0).with("nB", 2.0).with("bA", true);
///
/// let result = engine.evaluate("bA and (nA > nB)", &bindings).unwrap();
/// assert_eq!(result, ScriptValue::Bool(true));
///
/// let result = engine.evaluate("math.floor(nA / nB)", &bindings).unwrap();
/// assert_eq!(result, ScriptValue::Number(2.0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptEngine {
    config: ScriptConfig,
}

impl ScriptEngine {
    /// Create an engine with the given limits.
    pub fn new(config: ScriptConfig) -> Self {
        Self { config }
    }

    /// The active limits.
    #[must_use]
    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    fn compile(&self, expression: &str) -> Result<Expr, EvalError> {
        if expression.len() > self.config.max_length {
            return Err(EvalError::TooLong {
                length: expression.len(),
                limit: self.config.max_length,
            });
        }
        let tokens = tokenize(expression)?;
        parse(&tokens, self.config.max_depth)
    }
}

impl ExpressionEvaluator for ScriptEngine {
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<ScriptValue, EvalError> {
        let expr = self.compile(expression)?;
        let mut interpreter = Interpreter {
            bindings,
            steps: 0,
            max_steps: self.config.max_steps,
        };
        interpreter.eval(&expr)
    }

    fn validate(&self, expression: &str) -> Result<(), EvalError> {
        self.compile(expression).map(|_| ())
    }
}

struct Interpreter<'a> {
    bindings: &'a Bindings,
    steps: u32,
    max_steps: u32,
}

impl Interpreter<'_> {
    fn eval(&mut self, expr: &Expr) -> Result<ScriptValue, EvalError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(EvalError::StepLimit {
                limit: self.max_steps,
            });
        }

        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup(name),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(ScriptValue::Bool(!value.truthy())),
                    UnaryOp::Neg => Ok(ScriptValue::Number(-number(&value, "negation")?)),
                }
            }
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::Call { function, args } => {
                let args = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                call(function, &args)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<ScriptValue, EvalError> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        match name {
            "math.pi" => Ok(ScriptValue::Number(std::f64::consts::PI)),
            "math.huge" => Ok(ScriptValue::Number(f64::INFINITY)),
            _ => Err(EvalError::UnknownName(name.to_string())),
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<ScriptValue, EvalError> {
        // `and`/`or` short-circuit and yield one of their operands.
        match op {
            BinaryOp::And => {
                let left = self.eval(lhs)?;
                return if left.truthy() { self.eval(rhs) } else { Ok(left) };
            }
            BinaryOp::Or => {
                let left = self.eval(lhs)?;
                return if left.truthy() { Ok(left) } else { self.eval(rhs) };
            }
            _ => {}
        }

        let left = self.eval(lhs)?;
        let right = self.eval(rhs)?;

        let value = match op {
            BinaryOp::Eq => ScriptValue::Bool(left == right),
            BinaryOp::NotEq => ScriptValue::Bool(left != right),
            BinaryOp::Lt => ScriptValue::Bool(matches!(
                compare(&left, &right)?,
                Some(Ordering::Less)
            )),
            BinaryOp::LtEq => ScriptValue::Bool(matches!(
                compare(&left, &right)?,
                Some(Ordering::Less | Ordering::Equal)
            )),
            BinaryOp::Gt => ScriptValue::Bool(matches!(
                compare(&left, &right)?,
                Some(Ordering::Greater)
            )),
            BinaryOp::GtEq => ScriptValue::Bool(matches!(
                compare(&left, &right)?,
                Some(Ordering::Greater | Ordering::Equal)
            )),
            BinaryOp::Concat => ScriptValue::Str(format!(
                "{}{}",
                concat_operand(&left)?,
                concat_operand(&right)?
            )),
            BinaryOp::Add => ScriptValue::Number(number(&left, "'+'")? + number(&right, "'+'")?),
            BinaryOp::Sub => ScriptValue::Number(number(&left, "'-'")? - number(&right, "'-'")?),
            BinaryOp::Mul => ScriptValue::Number(number(&left, "'*'")? * number(&right, "'*'")?),
            BinaryOp::Div => ScriptValue::Number(number(&left, "'/'")? / number(&right, "'/'")?),
            BinaryOp::Mod => {
                let a = number(&left, "'%'")?;
                let b = number(&right, "'%'")?;
                // Floored modulo: the result takes the sign of the divisor.
                ScriptValue::Number(a - (a / b).floor() * b)
            }
            BinaryOp::Pow => {
                ScriptValue::Number(number(&left, "'^'")?.powf(number(&right, "'^'")?))
            }
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        };
        Ok(value)
    }
}

fn number(value: &ScriptValue, operation: &'static str) -> Result<f64, EvalError> {
    value.as_number().ok_or(EvalError::TypeMismatch {
        operation,
        found: value.type_name(),
    })
}

/// Numbers compare with numbers and strings with strings; anything else is
/// an error. `None` means unordered (a NaN operand), which fails every test.
fn compare(left: &ScriptValue, right: &ScriptValue) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (ScriptValue::Number(a), ScriptValue::Number(b)) => Ok(a.partial_cmp(b)),
        (ScriptValue::Str(a), ScriptValue::Str(b)) => Ok(Some(a.cmp(b))),
        (ScriptValue::Number(_) | ScriptValue::Str(_), other) | (other, _) => {
            Err(EvalError::TypeMismatch {
                operation: "comparison",
                found: other.type_name(),
            })
        }
    }
}

fn concat_operand(value: &ScriptValue) -> Result<String, EvalError> {
    match value {
        ScriptValue::Str(s) => Ok(s.clone()),
        ScriptValue::Number(n) => Ok(n.to_string()),
        other => Err(EvalError::TypeMismatch {
            operation: "concatenation",
            found: other.type_name(),
        }),
    }
}

fn call(function: &str, args: &[ScriptValue]) -> Result<ScriptValue, EvalError> {
    let name = function.strip_prefix("math.").unwrap_or(function);

    let unary = |f: fn(f64) -> f64| -> Result<ScriptValue, EvalError> {
        match args {
            [x] => Ok(ScriptValue::Number(f(number(x, "a math function")?))),
            _ => Err(arity(function, "1", args.len())),
        }
    };

    match name {
        "abs" => unary(f64::abs),
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "sqrt" => unary(f64::sqrt),
        "min" | "max" => {
            let (first, rest) = args
                .split_first()
                .ok_or_else(|| arity(function, "at least 1", 0))?;
            let mut acc = number(first, "a math function")?;
            for arg in rest {
                let v = number(arg, "a math function")?;
                acc = if name == "min" { acc.min(v) } else { acc.max(v) };
            }
            Ok(ScriptValue::Number(acc))
        }
        "clamp" => match args {
            [x, lo, hi] => {
                let x = number(x, "clamp")?;
                let lo = number(lo, "clamp")?;
                let hi = number(hi, "clamp")?;
                Ok(ScriptValue::Number(x.max(lo).min(hi)))
            }
            _ => Err(arity(function, "3", args.len())),
        },
        _ => Err(EvalError::UnknownFunction(function.to_string())),
    }
}

fn arity(function: &str, expected: &'static str, found: usize) -> EvalError {
    EvalError::Arity {
        function: function.to_string(),
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> Result<ScriptValue, EvalError> {
        let bindings = Bindings::new()
            .with("nA", 5.0)
            .with("nB", 2.0)
            .with("bA", true)
            .with("bB", false);
        ScriptEngine::default().evaluate(source, &bindings)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("nA + nB * 3"), Ok(ScriptValue::Number(11.0)));
        assert_eq!(eval("(nA + nB) * 3"), Ok(ScriptValue::Number(21.0)));
        assert_eq!(eval("nA / nB"), Ok(ScriptValue::Number(2.5)));
        assert_eq!(eval("2 ^ 3 ^ 2"), Ok(ScriptValue::Number(512.0)));
        assert_eq!(eval("-nA ^ 2"), Ok(ScriptValue::Number(-25.0)));
    }

    #[test]
    fn test_floored_modulo() {
        assert_eq!(eval("7 % 3"), Ok(ScriptValue::Number(1.0)));
        assert_eq!(eval("-7 % 3"), Ok(ScriptValue::Number(2.0)));
        assert_eq!(eval("7 % -3"), Ok(ScriptValue::Number(-2.0)));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("nA > nB"), Ok(ScriptValue::Bool(true)));
        assert_eq!(eval("nA <= nB"), Ok(ScriptValue::Bool(false)));
        assert_eq!(eval("nA == 5"), Ok(ScriptValue::Bool(true)));
        assert_eq!(eval("nA ~= 5"), Ok(ScriptValue::Bool(false)));
        assert_eq!(eval("nA != 4"), Ok(ScriptValue::Bool(true)));
        assert_eq!(eval("'abc' < 'abd'"), Ok(ScriptValue::Bool(true)));
    }

    #[test]
    fn test_equality_across_types_is_false() {
        assert_eq!(eval("bA == 1"), Ok(ScriptValue::Bool(false)));
        assert_eq!(eval("nil == false"), Ok(ScriptValue::Bool(false)));
    }

    #[test]
    fn test_nan_comparisons_are_false() {
        let bindings = Bindings::new().with("x", f64::NAN);
        let engine = ScriptEngine::default();
        for source in ["x < 1", "x <= 1", "x > 1", "x >= 1", "x == x"] {
            assert_eq!(
                engine.evaluate(source, &bindings),
                Ok(ScriptValue::Bool(false)),
                "{source}"
            );
        }
    }

    #[test]
    fn test_logic_operators() {
        assert_eq!(eval("bA and (nA > nB)"), Ok(ScriptValue::Bool(true)));
        assert_eq!(eval("bB and (nA > nB)"), Ok(ScriptValue::Bool(false)));
        assert_eq!(eval("bB or not bB"), Ok(ScriptValue::Bool(true)));
        assert_eq!(eval("nA > 3 and 10 or 20"), Ok(ScriptValue::Number(10.0)));
        assert_eq!(eval("nA > 9 and 10 or 20"), Ok(ScriptValue::Number(20.0)));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        assert_eq!(eval("bB and missing"), Ok(ScriptValue::Bool(false)));
        assert_eq!(eval("bA or missing"), Ok(ScriptValue::Bool(true)));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("max(nA, nB, 9)"), Ok(ScriptValue::Number(9.0)));
        assert_eq!(eval("math.min(nA, nB)"), Ok(ScriptValue::Number(2.0)));
        assert_eq!(eval("floor(2.7) + ceil(2.2)"), Ok(ScriptValue::Number(5.0)));
        assert_eq!(eval("abs(-3)"), Ok(ScriptValue::Number(3.0)));
        assert_eq!(eval("sqrt(16)"), Ok(ScriptValue::Number(4.0)));
        assert_eq!(eval("clamp(nA, 0, 3)"), Ok(ScriptValue::Number(3.0)));
        assert_eq!(eval("math.huge > nA"), Ok(ScriptValue::Bool(true)));
    }

    #[test]
    fn test_concat() {
        assert_eq!(eval("'n=' .. nB"), Ok(ScriptValue::Str("n=2".to_string())));
        assert!(matches!(eval("'x' .. bA"), Err(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn test_errors() {
        assert_eq!(eval("nC + 1"), Err(EvalError::UnknownName("nC".to_string())));
        assert_eq!(eval("lerp(1, 2)"), Err(EvalError::UnknownFunction("lerp".to_string())));
        assert!(matches!(eval("abs(1, 2)"), Err(EvalError::Arity { found: 2, .. })));
        assert!(matches!(eval("min()"), Err(EvalError::Arity { found: 0, .. })));
        assert_eq!(
            eval("bA + 1"),
            Err(EvalError::TypeMismatch {
                operation: "'+'",
                found: "boolean"
            })
        );
        assert!(matches!(eval("bA < 1"), Err(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn test_length_limit() {
        let engine = ScriptEngine::new(ScriptConfig {
            max_length: 8,
            ..ScriptConfig::default()
        });
        let result = engine.evaluate("1 + 2 + 3 + 4", &Bindings::new());
        assert_eq!(result, Err(EvalError::TooLong { length: 13, limit: 8 }));
    }

    #[test]
    fn test_step_limit() {
        let engine = ScriptEngine::new(ScriptConfig {
            max_steps: 5,
            ..ScriptConfig::default()
        });
        let bindings = Bindings::new();
        assert!(engine.evaluate("1 + 2", &bindings).is_ok());
        assert_eq!(
            engine.evaluate("1 + 2 + 3 + 4", &bindings),
            Err(EvalError::StepLimit { limit: 5 })
        );
    }

    #[test]
    fn test_zero_is_falsy_in_logic() {
        let bindings = Bindings::new().with("nA", 0.0);
        let engine = ScriptEngine::default();
        assert_eq!(engine.evaluate("not nA", &bindings), Ok(ScriptValue::Bool(true)));
        assert_eq!(
            engine.evaluate("nA and 1 or 2", &bindings),
            Ok(ScriptValue::Number(2.0))
        );
    }

    #[test]
    fn test_long_operator_chain_is_too_deep() {
        let engine = ScriptEngine::default();
        let bindings = Bindings::new();

        let chain = format!("1{}", "+1".repeat(500));
        assert!(chain.len() < engine.config().max_length);
        assert_eq!(
            engine.evaluate(&chain, &bindings),
            Err(EvalError::TooDeep { limit: 64 })
        );
        assert_eq!(engine.validate(&chain), Err(EvalError::TooDeep { limit: 64 }));

        // The longest chain the limit admits still evaluates.
        let fits = format!("1{}", "+1".repeat(63));
        assert_eq!(engine.evaluate(&fits, &bindings), Ok(ScriptValue::Number(64.0)));
    }

    #[test]
    fn test_chain_at_length_limit_is_too_deep() {
        let engine = ScriptEngine::default();
        let limit = engine.config().max_length;
        let chain = format!("1{}", "-1".repeat((limit - 1) / 2));
        assert!(chain.len() <= limit);
        assert!(matches!(
            engine.evaluate(&chain, &Bindings::new()),
            Err(EvalError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_validate_does_not_need_bindings() {
        let engine = ScriptEngine::default();
        assert!(engine.validate("nA + unknown_name").is_ok());
        assert!(engine.validate("nA +").is_err());
    }

    #[test]
    fn test_no_state_between_calls() {
        let engine = ScriptEngine::default();
        let first = Bindings::new().with("nA", 1.0);
        assert_eq!(engine.evaluate("nA", &first), Ok(ScriptValue::Number(1.0)));
        assert_eq!(
            engine.evaluate("nA", &Bindings::new()),
            Err(EvalError::UnknownName("nA".to_string()))
        );
    }
}
