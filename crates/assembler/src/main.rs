//! CLI entry point for the `y86-asm` binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use assembler::assemble;

const HELP_TEXT: &str = "Usage: y86-asm <input.ys> [-o <output.yo>] [--help]";

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    input: PathBuf,
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum ParseResult {
    Args(CliArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        if arg == "--help" {
            return Ok(ParseResult::Help);
        }

        if arg == "-o" {
            let value = args
                .next()
                .ok_or_else(|| String::from("missing value for -o"))?;
            output = Some(PathBuf::from(value));
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

    let input = input.ok_or_else(|| String::from("missing input path"))?;
    Ok(ParseResult::Args(CliArgs { input, output }))
}

fn run(args: &CliArgs) -> Result<(), String> {
    let source = fs::read_to_string(&args.input)
        .map_err(|error| format!("{}: {error}", args.input.display()))?;

    let assembly = assemble(&source).map_err(|error| error.to_string())?;
    let image = assembly.render_image();

    match &args.output {
        Some(path) => {
            fs::write(path, image).map_err(|error| format!("{}: {error}", path.display()))?;
        }
        None => print!("{image}"),
    }
    Ok(())
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
