pub mod convert;
pub mod eval;
pub mod lex;

pub use convert::{Converter, convert, convert_tokens};
pub use eval::{Evaluator, evaluate};
pub use lex::Lexer;

/// Converts an infix expression with integer literals to postfix and
/// evaluates it.
pub fn calculate(expr: &str) -> Result<i64, miette::Error> {
    let postfix = convert_tokens(expr)?;
    evaluate(&postfix)
}
