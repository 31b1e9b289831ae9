//! CLI entry point for the `y86-sim` binary.
//!
//! Reads a textual program image from a file (or stdin when no path is
//! given), runs the core to completion, and streams the bracketed JSON
//! trace to stdout. `-v` adds per-record cache statistics without touching
//! the five core record fields.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use simulator_core::{Core, RunConfig};

const HELP_TEXT: &str = "Usage: y86-sim [<image>] [-v|--verbose] [--max-steps <n>] [--help]";

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    input: Option<PathBuf>,
    verbose: bool,
    max_steps: Option<u64>,
}

#[derive(Debug)]
enum ParseResult {
    Args(CliArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut input: Option<PathBuf> = None;
    let mut verbose = false;
    let mut max_steps: Option<u64> = None;

    while let Some(arg) = args.next() {
        if arg == "--help" {
            return Ok(ParseResult::Help);
        }

        if arg == "-v" || arg == "--verbose" {
            verbose = true;
            continue;
        }

        if arg == "--max-steps" {
            let value = args
                .next()
                .ok_or_else(|| String::from("missing value for --max-steps"))?;
            let parsed = value
                .to_string_lossy()
                .parse::<u64>()
                .map_err(|_| format!("invalid step count: {}", value.to_string_lossy()))?;
            max_steps = Some(parsed);
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err(String::from("multiple input paths provided"));
        }
        input = Some(PathBuf::from(arg));
    }

    Ok(ParseResult::Args(CliArgs {
        input,
        verbose,
        max_steps,
    }))
}

fn read_image(input: Option<&PathBuf>) -> Result<String, String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).map_err(|error| format!("{}: {error}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|error| format!("stdin: {error}"))?;
            Ok(text)
        }
    }
}

fn run(args: &CliArgs) -> Result<(), String> {
    let image = read_image(args.input.as_ref())?;

    let mut core = Core::new();
    core.load_image(&image);

    let config = RunConfig {
        verbose: args.verbose,
        max_steps: args.max_steps,
    };
    core.run(io::stdout().lock(), &config)
        .map_err(|error| format!("stdout: {error}"))
}

fn main() -> ExitCode {
    match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{HELP_TEXT}");
            ExitCode::SUCCESS
        }
        Ok(ParseResult::Args(args)) => match run(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error}");
                ExitCode::FAILURE
            }
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{HELP_TEXT}");
            ExitCode::FAILURE
        }
    }
}
