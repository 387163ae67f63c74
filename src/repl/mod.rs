use std::io::{self, stdin, stdout, BufRead, Write};

use thiserror::Error;

use crate::{
    error::ParseError,
    eval::{value::Value, Evaluator},
    parser::parse,
};

pub const PROMPT: &str = ">> ";

#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<ParseError>),
}

pub fn start() -> io::Result<()> {
    let stdin = stdin();
    start_with(stdin.lock(), stdout())
}

/// Runs the read-eval-print loop until `reader` is exhausted. Bindings persist
/// from one line to the next.
pub fn start_with<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<()> {
    let mut buffer = String::new();
    let mut evaluator = Evaluator::new();

    loop {
        write!(writer, "{}", PROMPT)?;

        writer.flush()?;

        buffer.clear();
        if reader.read_line(&mut buffer)? == 0 {
            writeln!(writer)?;
            return Ok(());
        }

        if buffer.trim().is_empty() {
            continue;
        }

        let (program, errors) = parse(&buffer);
        if !errors.is_empty() {
            print_parse_errors(&mut writer, &errors)?;
            continue;
        }

        let result = evaluator.eval(&program);

        writeln!(writer, "{}", result)?;
    }
}

/// Evaluates a whole script in a fresh session and prints its final value.
pub fn run_source<W: Write>(source: &str, mut writer: W) -> Result<Value, ReplError> {
    let (program, errors) = parse(source);
    if !errors.is_empty() {
        print_parse_errors(&mut writer, &errors)?;
        return Err(ReplError::Syntax(errors));
    }

    let result = Evaluator::new().eval(&program);
    writeln!(writer, "{}", result)?;

    Ok(result)
}

fn print_parse_errors<W: Write>(writer: &mut W, errors: &[ParseError]) -> io::Result<()> {
    writeln!(writer, "parser errors:")?;
    for error in errors {
        writeln!(writer, "\t{}", error)?;
    }
    Ok(())
}
