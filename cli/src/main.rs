#![allow(clippy::print_stderr)]
use crate::cli::Args;
use anyhow::Context;
use clap::Parser;
use shapecheck::{Invocation, OutputMode, SourceOptions};
use std::env;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

/// Switches the log lines written to standard error to JSON.
const LOG_FORMAT_VAR: &str = "SHAPECHECK_LOG_FORMAT";

pub fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            if e.print().is_err() {
                return ExitCode::FAILURE;
            }
            return code;
        }
    };
    init_logging();
    match validate(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn validate(args: Args) -> anyhow::Result<()> {
    let invocation = Invocation {
        data: args.files,
        shapes: args.shapes,
        remove: args.remove,
        output: if args.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        },
    };
    let out = BufWriter::new(io::stdout().lock());
    let count = shapecheck::run(&invocation, &SourceOptions::default(), out)
        .context("Validation failed")?;
    info!(results = count, "validation finished");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    let result = if env::var(LOG_FORMAT_VAR).is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {e}");
    }
}
