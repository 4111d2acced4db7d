// crates/tally_cli/src/main.rs
//
// load → process → canonical JSON (file or stdout) → RES digest.
// Exit codes: 0 ok, 2 validation, 4 I/O.

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const IO: u8 = 4;
}

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tally_io::canonical_json::{to_canonical_bytes, write_canonical_file};
use tally_io::hasher::result_digest;
use tally_io::{loader, IoError};

use args::{resolve_params, validate, Args, CliError};

/// Central error type for exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bad flags, malformed JSON, invalid params.
    Validation(String),
    /// Read / write failures.
    Io(String),
}

impl From<CliError> for MainError {
    fn from(e: CliError) -> Self {
        MainError::Validation(e.to_string())
    }
}

impl From<IoError> for MainError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Json { .. } | IoError::Params(_) => MainError::Validation(e.to_string()),
            IoError::Read(_) | IoError::Write(_) | IoError::Hash(_) => MainError::Io(e.to_string()),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let rc = match run_once(&args) {
        Ok(()) => exitcodes::OK,
        Err(MainError::Validation(m)) => {
            eprintln!("tally: error: {m}");
            exitcodes::VALIDATION
        }
        Err(MainError::Io(m)) => {
            eprintln!("tally: error: {m}");
            exitcodes::IO
        }
    };
    ExitCode::from(rc)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_once(args: &Args) -> Result<(), MainError> {
    validate(args)?;

    let loaded = loader::load_all(&args.proposal, &args.ballots, args.params.as_deref())?;
    let params = resolve_params(args, loaded.params)?;
    info!(threshold = params.accumulation_threshold(), "tallying");

    let result = tally_pipeline::process_with(&loaded.proposal, &loaded.ballots, &params);
    let digest = result_digest(&result)?;

    match &args.out {
        Some(path) => {
            write_canonical_file(path, &result)?;
            info!(path = %path.display(), "result written");
        }
        None => {
            let bytes = to_canonical_bytes(&result)?;
            std::io::stdout()
                .lock()
                .write_all(&bytes)
                .map_err(|e| MainError::Io(format!("stdout: {e}")))?;
        }
    }

    if !args.quiet {
        eprintln!("{digest}");
    }
    Ok(())
}
