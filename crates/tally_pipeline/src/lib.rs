//! tally_pipeline: deterministic pipeline surface (dispatch → tabulate → quorum → redact → assemble).
//! This crate stays I/O-free: inputs arrive already parsed, math lives in `tally_algo`,
//! and loading / hashing belong to `tally_io`.

#![forbid(unsafe_code)]

use tally_core::{Ballot, ProcessedResult, Proposal, TallyParams};

pub mod build_result;
pub mod redact;
pub mod tabulate;

pub use build_result::build_result;
pub use redact::{redact_time_series, should_redact};
pub use tabulate::{tabulate_for, TallyMethod};

/// Tally one proposal with the default accumulation threshold (results-table view).
pub fn process(proposal: &Proposal, ballots: &[Ballot]) -> ProcessedResult {
    process_with(proposal, ballots, &TallyParams::default())
}

/// Tally one proposal with caller-chosen params. Infallible: every malformed
/// ballot is recovered locally and shows up as an "Unknown Choice" row.
pub fn process_with(proposal: &Proposal, ballots: &[Ballot], params: &TallyParams) -> ProcessedResult {
    let span = tracing::debug_span!("process", vote_type = %proposal.vote_type, ballots = ballots.len());
    let _enter = span.enter();

    let output = tabulate_for(proposal, ballots, params);
    build_result(proposal, ballots, output)
}
