use std::ops::Range;

use log::{debug, trace};
use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

use crate::convert::{EmptyExpressionError, Op};

#[derive(Error, Debug, Diagnostic)]
#[error("Invalid token '{token}'")]
#[diagnostic(help("tokens must be an integer or one of `+ - * / ^`"))]
pub struct InvalidTokenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("neither an operator nor an integer")]
    bad_bit: SourceSpan,

    pub token: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Not enough operands for '{op}'")]
#[diagnostic(help("every operator needs two values before it"))]
pub struct StackUnderflowError {
    #[source_code]
    src: NamedSource<String>,

    #[label("found {found} operand(s) here")]
    bad_bit: SourceSpan,

    pub op: Op,
    pub found: usize,
}

#[derive(Error, Debug, Diagnostic)]
#[error("{count} values left after evaluation")]
#[diagnostic(help("a postfix expression must reduce to exactly one value; an operator is missing"))]
pub struct LeftoverOperandsError {
    #[source_code]
    src: NamedSource<String>,

    #[label("never consumed")]
    bad_bit: SourceSpan,

    pub count: usize,
}

#[derive(Error, Debug, Diagnostic)]
#[error("{message}: {lhs} {op} {rhs}")]
pub struct ArithmeticError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    bad_bit: SourceSpan,

    pub message: &'static str,
    pub op: Op,
    pub lhs: i64,
    pub rhs: i64,
}

pub struct Evaluator<'de, S> {
    filename: Option<&'de str>,
    tokens: &'de [S],
    /// The tokens joined by single spaces, used as diagnostic source.
    whole: String,
    spans: Vec<Range<usize>>,
}

impl<'de, S: AsRef<str>> Evaluator<'de, S> {
    pub fn new(filename: Option<&'de str>, tokens: &'de [S]) -> Self {
        let mut whole = String::new();
        let mut spans = Vec::with_capacity(tokens.len());
        for token in tokens {
            if !whole.is_empty() {
                whole.push(' ');
            }
            let start = whole.len();
            whole.push_str(token.as_ref());
            spans.push(start..whole.len());
        }
        Evaluator {
            filename,
            tokens,
            whole,
            spans,
        }
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.clone())
    }

    pub fn evaluate(&self) -> Result<i64, Error> {
        let mut stack: Vec<(i64, usize)> = Vec::new();

        for (i, token) in self.tokens.iter().enumerate() {
            let token = token.as_ref();
            let Some(op) = Op::from_symbol(token) else {
                let value = token.parse::<i64>().map_err(|_| InvalidTokenError {
                    src: self.source(),
                    bad_bit: SourceSpan::from(self.spans[i].clone()),
                    token: token.to_string(),
                })?;
                trace!("push {value}");
                stack.push((value, i));
                continue;
            };

            let found = stack.len();
            let (Some((rhs, _)), Some((lhs, first))) = (stack.pop(), stack.pop()) else {
                return Err(StackUnderflowError {
                    src: self.source(),
                    bad_bit: SourceSpan::from(self.spans[i].clone()),
                    op,
                    found,
                }
                .into());
            };

            let value = apply(op, lhs, rhs).map_err(|message| ArithmeticError {
                src: self.source(),
                bad_bit: SourceSpan::from(self.spans[first].start..self.spans[i].end),
                message,
                op,
                lhs,
                rhs,
            })?;
            trace!("{lhs} {op} {rhs} = {value}");
            stack.push((value, first));
        }

        match stack.as_slice() {
            [(value, _)] => {
                debug!("evaluated {} tokens to {value}", self.tokens.len());
                Ok(*value)
            }
            [] => Err(EmptyExpressionError::build(self.filename, &self.whole).into()),
            [(_, first), ..] => Err(LeftoverOperandsError {
                src: self.source(),
                bad_bit: SourceSpan::from(self.spans[*first].start..self.whole.len()),
                count: stack.len(),
            }
            .into()),
        }
    }
}

/// Evaluates a postfix token sequence such as `["2", "3", "+"]`.
///
/// Unknown tokens and operators without two operands are reported as typed
/// errors ([`InvalidTokenError`], [`StackUnderflowError`]) instead of a `-1`
/// result.
pub fn evaluate<S: AsRef<str>>(tokens: &[S]) -> Result<i64, Error> {
    Evaluator::new(None, tokens).evaluate()
}

fn apply(op: Op, lhs: i64, rhs: i64) -> Result<i64, &'static str> {
    const OVERFLOW: &str = "integer overflow";
    match op {
        Op::Add => lhs.checked_add(rhs).ok_or(OVERFLOW),
        Op::Sub => lhs.checked_sub(rhs).ok_or(OVERFLOW),
        Op::Mul => lhs.checked_mul(rhs).ok_or(OVERFLOW),
        Op::Div => floor_div(lhs, rhs),
        Op::Pow => pow(lhs, rhs),
    }
}

/// Division rounding toward negative infinity.
fn floor_div(lhs: i64, rhs: i64) -> Result<i64, &'static str> {
    if rhs == 0 {
        return Err("division by zero");
    }
    let quotient = lhs.checked_div(rhs).ok_or("integer overflow")?;
    if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

/// Negative exponents keep the integer part of the real result.
fn pow(base: i64, exp: i64) -> Result<i64, &'static str> {
    if exp < 0 {
        return match base {
            0 => Err("division by zero"),
            1 => Ok(1),
            -1 if exp % 2 == 0 => Ok(1),
            -1 => Ok(-1),
            _ => Ok(0),
        };
    }
    match base {
        0 | 1 => Ok(if exp == 0 { 1 } else { base }),
        -1 => Ok(if exp % 2 == 0 { 1 } else { -1 }),
        _ => u32::try_from(exp)
            .ok()
            .and_then(|exp| base.checked_pow(exp))
            .ok_or("integer overflow"),
    }
}
