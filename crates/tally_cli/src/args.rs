// crates/tally_cli/src/args.rs
//
// Offline CLI argument surface and parameter resolution.
//
// - Inputs are local files only (no scheme:// paths).
// - Threshold precedence: --threshold, then --profile, then --params file, then default.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;

use tally_core::{ParamsError, TallyParams, ThresholdProfile};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "tally",
    disable_help_subcommand = true,
    about = "Tally a governance proposal's ballots into a chart-ready result"
)]
pub struct Args {
    /// Proposal JSON path.
    #[arg(long)]
    pub proposal: PathBuf,
    /// Ballots JSON path (array, or {"ballots": [...]}).
    #[arg(long)]
    pub ballots: PathBuf,
    /// Params JSON path ({"accumulation_threshold": n} or {"profile": "..."}).
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Threshold preset of the consuming view.
    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,
    /// Explicit accumulation threshold (overrides --profile and --params).
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<f64>,

    /// Write the canonical result here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Suppress the digest line on stderr.
    #[arg(long)]
    pub quiet: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    ResultsTable,
    ResultsList,
}

impl From<ProfileArg> for ThresholdProfile {
    fn from(p: ProfileArg) -> Self {
        match p {
            ProfileArg::ResultsTable => ThresholdProfile::ResultsTable,
            ProfileArg::ResultsList => ThresholdProfile::ResultsList,
        }
    }
}

/// Errors surfaced by argument validation. Messages are short and stable.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("path must be a local file (no scheme): {0}")]
    NonLocalPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid --threshold: {0}")]
    Threshold(#[from] ParamsError),
}

/// Reject any explicit URI scheme (e.g., http://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    if p.is_file() {
        Ok(())
    } else {
        Err(CliError::NotFound(format!("{label} {}", p.display())))
    }
}

/// Check input paths after clap parsing.
pub fn validate(args: &Args) -> Result<(), CliError> {
    ensure_local_exists(&args.proposal, "--proposal")?;
    ensure_local_exists(&args.ballots, "--ballots")?;
    if let Some(p) = &args.params {
        ensure_local_exists(p, "--params")?;
    }
    if let Some(out) = &args.out {
        ensure_local_path(out)?;
    }
    if let Some(t) = args.threshold {
        TallyParams::new(t)?;
    }
    Ok(())
}

/// Apply flag overrides on top of whatever the params file (or default) said.
pub fn resolve_params(args: &Args, from_file: TallyParams) -> Result<TallyParams, CliError> {
    if let Some(t) = args.threshold {
        return Ok(TallyParams::new(t)?);
    }
    if let Some(p) = args.profile {
        return Ok(TallyParams::for_profile(p.into()));
    }
    Ok(from_file)
}
