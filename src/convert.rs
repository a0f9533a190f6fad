use std::fmt::Display;

use log::{debug, trace};
use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{
    Lexer,
    lex::{Token, TokenKind},
};

#[derive(Error, Debug, Diagnostic)]
#[error("Unmatched closing parenthesis")]
#[diagnostic(help("remove this `)` or add a matching `(` before it"))]
pub struct UnmatchedParenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("no `(` is open here")]
    bad_bit: SourceSpan,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unclosed parenthesis")]
#[diagnostic(help("add a `)` to close this group"))]
pub struct UnclosedParenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this `(` is never closed")]
    bad_bit: SourceSpan,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Empty expression")]
#[diagnostic(help("an expression needs at least one operand"))]
pub struct EmptyExpressionError {
    #[source_code]
    pub(crate) src: NamedSource<String>,

    #[label("nothing to work with here")]
    pub(crate) bad_bit: SourceSpan,
}

impl EmptyExpressionError {
    pub(crate) fn build(filename: Option<&str>, whole: &str) -> Self {
        EmptyExpressionError {
            src: NamedSource::new(filename.unwrap_or("<input>"), whole.to_string()),
            bad_bit: SourceSpan::from(0..whole.len()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Op {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "/" => Op::Div,
            "^" => Op::Pow,
            _ => return None,
        })
    }

    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => Op::Add,
            TokenKind::Minus => Op::Sub,
            TokenKind::Star => Op::Mul,
            TokenKind::Slash => Op::Div,
            TokenKind::Caret => Op::Pow,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Pow => "^",
        }
    }

    pub fn priority(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
            Op::Pow => 3,
        }
    }

    pub fn is_right_associative(self) -> bool {
        matches!(self, Op::Pow)
    }

    /// Whether `self`, already waiting on the stack, must be emitted before
    /// `incoming` is pushed.
    fn yields_to(self, incoming: Op) -> bool {
        if incoming.is_right_associative() {
            self.priority() > incoming.priority()
        } else {
            self.priority() >= incoming.priority()
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

pub struct Converter<'de> {
    lexer: Lexer<'de>,
}

impl<'de> Converter<'de> {
    pub fn new(filename: Option<&'de str>, whole: &'de str) -> Self {
        Converter {
            lexer: Lexer::new(filename, whole),
        }
    }

    pub fn with_number_literals(self) -> Self {
        Converter {
            lexer: self.lexer.with_number_literals(),
        }
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(
            self.lexer.filename.unwrap_or("<input>"),
            self.lexer.whole.to_string(),
        )
    }

    /// Reorders the infix input into postfix. Parentheses never reach the
    /// output.
    pub fn postfix(mut self) -> Result<Vec<Token<'de>>, Error> {
        let mut stack: Vec<Token<'de>> = Vec::new();
        let mut output = Vec::new();

        while let Some(token) = self.lexer.next() {
            match token.kind {
                TokenKind::Operand => output.push(token),
                TokenKind::LeftParen => stack.push(token),
                TokenKind::RightParen => loop {
                    match stack.pop() {
                        Some(Token {
                            kind: TokenKind::LeftParen,
                            ..
                        }) => break,
                        Some(top) => output.push(top),
                        None => {
                            return Err(UnmatchedParenError {
                                src: self.source(),
                                bad_bit: SourceSpan::from(token.span()),
                            }
                            .into());
                        }
                    }
                },
                kind => {
                    let Some(op) = Op::from_kind(kind) else {
                        unreachable!("every other token kind is an operator")
                    };
                    while let Some(top) = stack.last().copied() {
                        match Op::from_kind(top.kind) {
                            Some(waiting) if waiting.yields_to(op) => {
                                trace!("pop {waiting} before {op}");
                                output.push(top);
                                stack.pop();
                            }
                            _ => break,
                        }
                    }
                    stack.push(token);
                }
            }
        }

        while let Some(top) = stack.pop() {
            if top.kind == TokenKind::LeftParen {
                return Err(UnclosedParenError {
                    src: self.source(),
                    bad_bit: SourceSpan::from(top.span()),
                }
                .into());
            }
            output.push(top);
        }

        if output.is_empty() {
            return Err(EmptyExpressionError::build(self.lexer.filename, self.lexer.whole).into());
        }

        debug!(
            "converted `{}` into {} postfix tokens",
            self.lexer.whole,
            output.len()
        );
        Ok(output)
    }
}

/// Converts `expr` symbol by symbol and returns the postfix form as text,
/// e.g. `a+b*c` becomes `abc*+`.
pub fn convert(expr: &str) -> Result<String, Error> {
    let postfix = Converter::new(None, expr).postfix()?;
    Ok(postfix.iter().map(|token| token.literal).collect())
}

/// Like [`convert`] but reads multi-digit integers as single operands and
/// returns the postfix sequence as owned tokens, ready for
/// [`evaluate`](crate::evaluate).
pub fn convert_tokens(expr: &str) -> Result<Vec<String>, Error> {
    let postfix = Converter::new(None, expr).with_number_literals().postfix()?;
    Ok(postfix
        .iter()
        .map(|token| token.literal.to_string())
        .collect())
}
