use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use serde_json::Value;
use tempfile::NamedTempFile;

const EXIT_INVALID_INPUT: u8 = 2;
const EXIT_INTERNAL_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "sisl", version, about = "Convert between JSON/XML and SISL")]
#[command(group = ArgGroup::new("mode").required(true).args(["dumps", "loads"]))]
struct Args {
    /// Convert JSON (or XML with --xml) input to SISL.
    #[arg(long)]
    dumps: bool,

    /// Convert SISL (or a JSON array of SISL strings) input to JSON (or XML).
    #[arg(long)]
    loads: bool,

    /// Use XML instead of JSON on the non-SISL side.
    #[arg(long)]
    xml: bool,

    /// With --dumps: split output into parts of at most N bytes. If
    /// splitting happened, output is a JSON array of SISL strings.
    #[arg(long = "max-length", value_name = "N", requires = "dumps")]
    max_length: Option<usize>,

    /// Input file path (reads stdin if omitted).
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output file path (writes stdout if omitted).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

enum CliError {
    InvalidInput(String),
    Internal(String),
}

impl From<sisl::Error> for CliError {
    fn from(err: sisl::Error) -> Self {
        CliError::InvalidInput(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Internal(err.to_string())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::InvalidInput(message)) => {
            eprintln!("Error: {message}");
            ExitCode::from(EXIT_INVALID_INPUT)
        }
        Err(CliError::Internal(message)) => {
            eprintln!("Internal error: {message}");
            ExitCode::from(EXIT_INTERNAL_ERROR)
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let input = read_input(args.input.as_deref())?;

    let mut output = if args.dumps {
        run_dumps(args, &input)?
    } else {
        run_loads(args, &input)?
    };

    if !output.ends_with('\n') {
        output.push('\n');
    }
    write_output(args.output.as_deref(), &output)
}

fn run_dumps(args: &Args, input: &str) -> Result<String, CliError> {
    let value = parse_non_sisl(args, input)?;

    let full = sisl::encode(&value)?;
    let Some(max_length) = args.max_length else {
        return Ok(full);
    };

    if full.len() <= max_length {
        return Ok(full);
    }

    let parts = sisl::split::split_value(&value, max_length)?;
    serde_json::to_string(&parts).map_err(|err| CliError::Internal(err.to_string()))
}

fn run_loads(args: &Args, input: &str) -> Result<String, CliError> {
    let value = match fragment_list(input) {
        Some(fragments) => sisl::merge(&fragments)?,
        None => sisl::decode(input)?,
    };

    if args.xml {
        Ok(sisl::value_to_xml(&value)?)
    } else {
        serde_json::to_string(&value).map_err(|err| CliError::Internal(err.to_string()))
    }
}

fn parse_non_sisl(args: &Args, input: &str) -> Result<Value, CliError> {
    if args.xml {
        return Ok(sisl::xml_to_value(input)?);
    }
    serde_json::from_str(input)
        .map_err(|err| CliError::InvalidInput(format!("JSON parse error: {err}")))
}

/// A `--loads` input that is a non-empty JSON array of strings is treated
/// as a fragment list to merge; anything else is a single SISL document.
fn fragment_list(input: &str) -> Option<Vec<String>> {
    let parsed: Value = serde_json::from_str(input).ok()?;
    let items = parsed.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        Some(path) => Ok(fs::read_to_string(path)?),
    }
}

/// Writes to a file go through a sibling temp path and a rename, so a
/// failed run leaves the target untouched and no temp file behind.
fn write_output(path: Option<&Path>, output: &str) -> Result<(), CliError> {
    match path {
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(output.as_bytes())?;
            handle.flush()?;
            Ok(())
        }
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let mut temp = NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
            temp.write_all(output.as_bytes())?;
            temp.persist(path)
                .map_err(|err| CliError::Internal(err.to_string()))?;
            Ok(())
        }
    }
}
