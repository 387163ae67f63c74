use libmonkey::repl::{self, ReplError};
use std::{env, fs, io, process::ExitCode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a subscriber only when `RUST_LOG` is set, so REPL output stays clean.
fn init_tracing() {
    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run() -> Result<(), ReplError> {
    match env::args().nth(1) {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            repl::run_source(&source, io::stdout())?;
        }
        None => {
            println!("Hello! This is the Monkey programming language!");
            println!("Feel free to type in commands");
            repl::start()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("monkey: {}", error);
            ExitCode::FAILURE
        }
    }
}
