//! Expression parser built on chumsky combinators.
//!
//! Parsing runs over the token stream from [`lexer`](super::lexer), not the
//! source text. Chumsky reports error spans as token indices; they are
//! mapped back to byte offsets through the lexer spans.
//!
//! ## Operator Precedence
//!
//! From lowest to highest:
//! 1. `or`
//! 2. `and`
//! 3. Comparison (`<`, `<=`, `>`, `>=`, `==`, `~=`)
//! 4. Concatenation (`..`, right-associative)
//! 5. Addition/Subtraction (`+`, `-`)
//! 6. Multiplication/Division/Modulo (`*`, `/`, `%`)
//! 7. Unary (`not`, `-`)
//! 8. Power (`^`, right-associative: `-2 ^ 2` is `-(2 ^ 2)`)
//!
//! ## Depth
//!
//! Parentheses are counted before parsing and the finished tree is measured
//! after, so both `((((1))))` and `1 + 1 + ... + 1` are held to the same
//! `max_depth`. The interpreter recurses once per tree level and relies on
//! this bound.

use std::ops::Range;

use chumsky::error::RichPattern;
use chumsky::prelude::*;

use super::error::EvalError;
use super::lexer::Token;
use super::value::ScriptValue;

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// Expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(ScriptValue),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Height of the tree; a lone literal or name is 1.
    ///
    /// Walks with an explicit stack so that measuring a deep tree cannot
    /// itself exhaust the call stack.
    #[must_use]
    pub fn depth(&self) -> u32 {
        let mut deepest = 0;
        let mut pending = vec![(self, 1u32)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match node {
                Self::Literal(_) | Self::Name(_) => {}
                Self::Unary { operand, .. } => pending.push((operand, depth + 1)),
                Self::Binary { lhs, rhs, .. } => {
                    pending.push((lhs, depth + 1));
                    pending.push((rhs, depth + 1));
                }
                Self::Call { args, .. } => pending.extend(args.iter().map(|a| (a, depth + 1))),
            }
        }
        deepest
    }
}

/// Parse a token stream into a single expression.
///
/// `max_depth` bounds both parenthesis nesting and the height of the
/// resulting tree.
pub fn parse(tokens: &[(Token, Range<usize>)], max_depth: u32) -> Result<Expr, EvalError> {
    check_nesting(tokens, max_depth)?;

    let kinds: Vec<Token> = tokens.iter().map(|(token, _)| token.clone()).collect();
    let expr = expression()
        .then_ignore(end())
        .parse(kinds.as_slice())
        .into_result()
        .map_err(|errors| positioned(errors.first(), tokens))?;

    if expr.depth() > max_depth {
        return Err(EvalError::TooDeep { limit: max_depth });
    }
    Ok(expr)
}

/// Reject deep parentheses before the recursive parser descends into them.
fn check_nesting(tokens: &[(Token, Range<usize>)], max_depth: u32) -> Result<(), EvalError> {
    let mut open = 0u32;
    for (token, _) in tokens {
        match token {
            Token::LParen => {
                open += 1;
                if open > max_depth {
                    return Err(EvalError::TooDeep { limit: max_depth });
                }
            }
            Token::RParen => open = open.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

fn expression<'src>(
) -> impl Parser<'src, &'src [Token], Expr, extra::Err<Rich<'src, Token>>> + Clone {
    recursive(|expr| {
        // === Atoms ===

        let literal = select! {
            Token::Number(n) => ScriptValue::Number(n),
            Token::Str(s) => ScriptValue::Str(s),
            Token::True => ScriptValue::Bool(true),
            Token::False => ScriptValue::Bool(false),
            Token::Nil => ScriptValue::Nil,
        }
        .map(Expr::Literal);

        // A name, or a call when an argument list follows.
        let name_or_call = select! { Token::Ident(name) => name }
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LParen), just(Token::RParen))
                    .or_not(),
            )
            .map(|(name, args)| match args {
                Some(args) => Expr::Call {
                    function: name,
                    args,
                },
                None => Expr::Name(name),
            });

        let parens = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let atom = choice((literal, name_or_call, parens)).labelled("a value");

        // === Unary and power ===

        let prefix = choice((
            just(Token::Minus).to(UnaryOp::Neg),
            just(Token::Not).to(UnaryOp::Not),
        ));

        // The exponent may carry its own prefix: `2 ^ -1`.
        let power = atom
            .clone()
            .then(
                just(Token::Caret)
                    .ignore_then(prefix.clone().repeated().collect::<Vec<_>>())
                    .then(atom)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(base, rest)| fold_power(base, rest));

        let unary = prefix
            .repeated()
            .foldr(power, |op, operand| Expr::Unary {
                op,
                operand: Box::new(operand),
            })
            .labelled("a value");

        // === Binary operators with precedence ===

        let product_op = choice((
            just(Token::Star).to(BinaryOp::Mul),
            just(Token::Slash).to(BinaryOp::Div),
            just(Token::Percent).to(BinaryOp::Mod),
        ));
        let product = unary
            .clone()
            .foldl(product_op.then(unary).repeated(), binary);

        let sum_op = choice((
            just(Token::Plus).to(BinaryOp::Add),
            just(Token::Minus).to(BinaryOp::Sub),
        ));
        let sum = product.clone().foldl(sum_op.then(product).repeated(), binary);

        let concat = sum
            .clone()
            .then(
                just(Token::DotDot)
                    .ignore_then(sum)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_right(BinaryOp::Concat, first, rest));

        let comparison_op = choice((
            just(Token::EqEq).to(BinaryOp::Eq),
            just(Token::NotEq).to(BinaryOp::NotEq),
            just(Token::Lt).to(BinaryOp::Lt),
            just(Token::LtEq).to(BinaryOp::LtEq),
            just(Token::Gt).to(BinaryOp::Gt),
            just(Token::GtEq).to(BinaryOp::GtEq),
        ));
        let comparison = concat
            .clone()
            .foldl(comparison_op.then(concat).repeated(), binary);

        let conjunction = comparison.clone().foldl(
            just(Token::And).to(BinaryOp::And).then(comparison).repeated(),
            binary,
        );

        conjunction.clone().foldl(
            just(Token::Or).to(BinaryOp::Or).then(conjunction).repeated(),
            binary,
        )
    })
}

fn binary(lhs: Expr, (op, rhs): (BinaryOp, Expr)) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn prefixed(ops: Vec<UnaryOp>, operand: Expr) -> Expr {
    ops.into_iter().rev().fold(operand, |operand, op| Expr::Unary {
        op,
        operand: Box::new(operand),
    })
}

/// `a ^ -b ^ c` is `a ^ (-(b ^ c))`.
fn fold_power(base: Expr, mut rest: Vec<(Vec<UnaryOp>, Expr)>) -> Expr {
    let Some((ops, last)) = rest.pop() else {
        return base;
    };
    let mut exponent = prefixed(ops, last);
    while let Some((ops, operand)) = rest.pop() {
        exponent = prefixed(ops, binary(operand, (BinaryOp::Pow, exponent)));
    }
    binary(base, (BinaryOp::Pow, exponent))
}

fn fold_right(op: BinaryOp, first: Expr, mut rest: Vec<Expr>) -> Expr {
    let Some(mut acc) = rest.pop() else {
        return first;
    };
    while let Some(lhs) = rest.pop() {
        acc = binary(lhs, (op, acc));
    }
    binary(first, (op, acc))
}

/// Map a chumsky error (token-index span) to a byte-positioned [`EvalError`].
fn positioned(error: Option<&Rich<'_, Token>>, tokens: &[(Token, Range<usize>)]) -> EvalError {
    let Some(error) = error else {
        return EvalError::UnexpectedEnd {
            expected: "an expression".to_string(),
        };
    };
    let expected = expected_list(error);
    match (error.found(), tokens.get(error.span().start)) {
        (Some(found), Some((_, span))) => EvalError::UnexpectedToken {
            position: span.start,
            found: found.describe(),
            expected,
        },
        _ => EvalError::UnexpectedEnd { expected },
    }
}

fn expected_list(error: &Rich<'_, Token>) -> String {
    let mut expected: Vec<String> = error
        .expected()
        .map(|pattern| match pattern {
            RichPattern::Token(token) => format!("'{}'", token.describe()),
            RichPattern::Label(label) => label.to_string(),
            RichPattern::EndOfInput => "end of expression".to_string(),
            _ => "something else".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    if expected.is_empty() {
        "a valid expression".to_string()
    } else {
        expected.join(" or ")
    }
}
