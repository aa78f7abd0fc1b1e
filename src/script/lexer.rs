//! Tokenizer for scripted expressions, built on logos.
//!
//! The token set is a small Lua-flavoured subset: literals, names,
//! arithmetic, comparison, concatenation and the `and`/`or`/`not`
//! keywords. Both `~=` and `!=` spell "not equal".

use std::ops::Range;

use logos::Logos;

use super::error::EvalError;

/// Expression token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // === Keywords ===
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("..")]
    DotDot,
    #[token("==")]
    EqEq,
    #[token("~=")]
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    // === Literals ===
    /// Number literal (e.g. 42, 3.5, 1e-3)
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// String literal in single or double quotes
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^'\\]|\\.)*'", |lex| unescape(lex.slice()))]
    Str(String),

    /// Name, optionally dotted (`nA`, `math.floor`)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl Token {
    /// Source-like rendering for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        let s = match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::True => "true",
            Self::False => "false",
            Self::Nil => "nil",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::DotDot => "..",
            Self::EqEq => "==",
            Self::NotEq => "~=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Number(n) => return n.to_string(),
            Self::Str(s) => return format!("{s:?}"),
            Self::Ident(name) => return name.clone(),
        };
        s.to_string()
    }
}

/// Strip the quotes from a string literal and resolve escapes.
fn unescape(literal: &str) -> Option<String> {
    let inner = literal.get(1..literal.len().checked_sub(1)?)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }
    Some(out)
}

/// Tokenize a whole expression, keeping byte spans.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range<usize>)>, EvalError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(EvalError::InvalidToken { position: span.start }),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_keywords_and_names() {
        assert_eq!(
            kinds("bA and not bB or android"),
            vec![
                Token::Ident("bA".into()),
                Token::And,
                Token::Not,
                Token::Ident("bB".into()),
                Token::Or,
                Token::Ident("android".into()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.5 1e3 2.5E-1"),
            vec![
                Token::Number(42.0),
                Token::Number(3.5),
                Token::Number(1000.0),
                Token::Number(0.25),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("<= >= == ~= != < > .. ^"),
            vec![
                Token::LtEq,
                Token::GtEq,
                Token::EqEq,
                Token::NotEq,
                Token::NotEq,
                Token::Lt,
                Token::Gt,
                Token::DotDot,
                Token::Caret,
            ]
        );
    }

    #[test]
    fn test_dotted_name() {
        assert_eq!(kinds("math.floor(nA)")[0], Token::Ident("math.floor".into()));
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            kinds(r#""a\"b" 'c'"#),
            vec![Token::Str("a\"b".into()), Token::Str("c".into())]
        );
    }

    #[test]
    fn test_invalid_token() {
        assert_eq!(tokenize("nA # 2"), Err(EvalError::InvalidToken { position: 3 }));
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("nA > 3").unwrap();
        assert_eq!(tokens[1].1, 3..4);
    }
}
