use std::fs;

use clap::Parser;
use clap::Subcommand;
use log::{LevelFilter, info};
use miette::IntoDiagnostic;
use miette::WrapErr;
use postfix_calc::{Converter, Evaluator, Lexer};

/// Converts infix arithmetic to postfix notation and evaluates postfix
/// expressions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the symbols of each infix line.
    Tokenize(Input),
    /// Print the postfix form of each infix line.
    Convert(Input),
    /// Evaluate each line as whitespace separated postfix tokens.
    Evaluate(Input),
    /// Convert each infix line and evaluate the result.
    Calc(Input),
}

#[derive(Debug, clap::Args)]
struct Input {
    /// Treat `contents` as a path to read expressions from, one per line.
    #[arg(short, long)]
    file: bool,

    contents: String,
}

impl Input {
    fn read(&self) -> miette::Result<(Option<&str>, String)> {
        if !self.file {
            return Ok((None, self.contents.clone()));
        }
        let contents = fs::read_to_string(&self.contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading `{}` failed", self.contents))?;
        Ok((Some(self.contents.as_str()), contents))
    }
}

type Run = fn(Option<&str>, &str) -> miette::Result<()>;

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let (input, run) = match &args.command {
        Commands::Tokenize(input) => (input, tokenize as Run),
        Commands::Convert(input) => (input, convert as Run),
        Commands::Evaluate(input) => (input, evaluate as Run),
        Commands::Calc(input) => (input, calc as Run),
    };

    let (filename, contents) = input.read()?;
    if let Err((line, e)) = run_lines(filename, &contents, run) {
        eprintln!("[line {line}] Error: {e}");
        eprintln!("{e:?}");
        std::process::exit(65);
    }
    Ok(())
}

/// Runs every non-blank line and stops at the first failure, returning it
/// with its 1-based line number.
fn run_lines(
    filename: Option<&str>,
    contents: &str,
    run: Run,
) -> Result<(), (usize, miette::Error)> {
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        info!("processing line {}: `{line}`", index + 1);
        run(filename, line).map_err(|e| (index + 1, e))?;
    }
    Ok(())
}

fn tokenize(filename: Option<&str>, line: &str) -> miette::Result<()> {
    for token in Lexer::new(filename, line) {
        println!("{token}");
    }
    Ok(())
}

fn convert(filename: Option<&str>, line: &str) -> miette::Result<()> {
    let postfix = Converter::new(filename, line).postfix()?;
    let postfix: String = postfix.iter().map(|token| token.literal).collect();
    println!("{postfix}");
    Ok(())
}

fn evaluate(filename: Option<&str>, line: &str) -> miette::Result<()> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let value = Evaluator::new(filename, &tokens).evaluate()?;
    println!("{value}");
    Ok(())
}

fn calc(filename: Option<&str>, line: &str) -> miette::Result<()> {
    let postfix = Converter::new(filename, line)
        .with_number_literals()
        .postfix()?;
    let tokens: Vec<&str> = postfix.iter().map(|token| token.literal).collect();
    // The evaluator only sees the reordered tokens, not the text on the line.
    let value = Evaluator::new(Some("<postfix>"), &tokens).evaluate()?;
    println!("{value}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postfix_calc::convert::UnclosedParenError;
    use postfix_calc::eval::StackUnderflowError;

    fn source_name(e: &miette::Error) -> Option<String> {
        let span = miette::SourceSpan::from(0..1);
        let contents = e.source_code()?.read_span(&span, 0, 0).ok()?;
        contents.name().map(str::to_string)
    }

    #[test]
    fn failing_line_number_is_reported() {
        let (line, e) = run_lines(Some("in.txt"), "1+2\n3*4\n(5+6\n", calc).unwrap_err();
        assert_eq!(line, 3);
        assert!(e.downcast_ref::<UnclosedParenError>().is_some());
    }

    #[test]
    fn blank_lines_still_count() {
        let (line, _) = run_lines(None, "1 2 +\n\n   \n1 +\n", evaluate).unwrap_err();
        assert_eq!(line, 4);
    }

    #[test]
    fn all_lines_succeed() {
        assert!(run_lines(None, "2^3\n(1+2)*3\n", calc).is_ok());
    }

    #[test]
    fn calc_evaluation_errors_name_the_postfix_source() {
        let e = calc(Some("in.txt"), "1++2").unwrap_err();
        assert!(e.downcast_ref::<StackUnderflowError>().is_some());
        assert_eq!(source_name(&e).as_deref(), Some("<postfix>"));

        let e = calc(Some("in.txt"), "(1+2").unwrap_err();
        assert_eq!(source_name(&e).as_deref(), Some("in.txt"));
    }
}
