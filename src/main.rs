//! Purpose: `poolcast` CLI entry point and command dispatch bootstrap.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (JSON per command).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::Shell;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use command_dispatch::dispatch_command;
use poolcast::api::{Error, ErrorKind, Kind, Nested, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

#[derive(Parser)]
#[command(
    name = "poolcast",
    version,
    about = "Marshal nested values into and out of solver variable pools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Infer the kind, rank, and shape of a nested JSON value.
    Inspect {
        /// Inline JSON; read from --file or stdin when omitted.
        data: Option<String>,
        /// Read the JSON value from a file.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Marshal a nested JSON value into variant storage and back.
    Roundtrip {
        /// Inline JSON; read from --file or stdin when omitted.
        data: Option<String>,
        /// Read the JSON value from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Force the element kind instead of classifying the first leaf.
        #[arg(long = "as", value_enum, value_name = "KIND")]
        kind: Option<KindArg>,
    },
    /// Generate shell completions.
    Completion { shell: Shell },
    /// Print version information as JSON.
    Version,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum KindArg {
    Boolean,
    Integer,
    Real,
    Complex,
    Text,
}

impl From<KindArg> for Kind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Boolean => Kind::Boolean,
            KindArg::Integer => Kind::Integer,
            KindArg::Real => Kind::Real,
            KindArg::Complex => Kind::Complex,
            KindArg::Text => Kind::Text,
        }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = Cli::parse();
    dispatch_command(cli.command)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

fn emit_json(value: Value) {
    println!("{value}");
}

fn emit_error(err: &Error) {
    eprintln!("{}", error_json(err));
}

fn error_json(err: &Error) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    if let Some(message) = err.message() {
        body.insert("message".to_string(), json!(message));
    }
    if let Some(chain) = err.chain() {
        body.insert("chain".to_string(), json!(chain));
    }
    if let Some(coords) = err.coords() {
        body.insert("at".to_string(), json!(coords));
    }
    if let Some(hint) = err.hint() {
        body.insert("hint".to_string(), json!(hint));
    }
    json!({ "error": Value::Object(body) })
}

/// Resolve the one allowed data source: inline argument, --file, or piped
/// stdin.
fn read_data(data: Option<String>, file: Option<PathBuf>) -> Result<Nested, Error> {
    if data.is_some() && file.is_some() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("multiple data inputs provided")
            .with_hint("Use only one of DATA, --file, or stdin."));
    }
    let text = if let Some(data) = data {
        data
    } else if let Some(path) = file {
        fs::read_to_string(&path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        })?
    } else if io::stdin().is_terminal() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("no data provided")
            .with_hint("Pass inline JSON, --file PATH, or pipe JSON on stdin."));
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        buffer
    };
    let value: Value = serde_json::from_str(text.trim()).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid json")
            .with_source(err)
    })?;
    Nested::from_json(&value)
}
