//! build_result.rs
//! Assemble the uniform `ProcessedResult` from a processor's output: echo the
//! proposal fields, attach colors and quorum metrics, then redact if required.

use tracing::debug;

use tally_algo::{compute_quorum_metrics, QuorumInputs, TallyOutput};
use tally_core::colors::assign_colors;
use tally_core::{Ballot, ProcessedResult, Proposal};

use crate::redact::{redact_time_series, should_redact};

/// Σ voting power over every ballot, whether or not its choice resolved.
pub fn total_voting_power(ballots: &[Ballot]) -> f64 {
    ballots.iter().map(|b| b.voting_power).sum()
}

pub fn build_result(proposal: &Proposal, ballots: &[Ballot], output: TallyOutput) -> ProcessedResult {
    let registry = proposal.registry();
    let total_voting_power = total_voting_power(ballots);

    let quorum_metrics = compute_quorum_metrics(&QuorumInputs {
        registry,
        final_results: &output.final_results,
        total_voting_power,
        quorum: proposal.quorum,
        quorum_choice_indices: &proposal.quorum_choice_indices,
        total_delegated_voting_power: proposal.total_delegated_voting_power,
    });

    let mut time_series_data = output.time_series;
    if should_redact(proposal) {
        debug!(points = time_series_data.len(), "hidden vote in progress; collapsing chart");
        redact_time_series(&mut time_series_data);
    }

    ProcessedResult {
        choices: proposal.choices.clone(),
        choice_colors: assign_colors(&registry),
        total_voting_power,
        quorum: proposal.quorum,
        quorum_choice_indices: proposal.quorum_choice_indices.clone(),
        vote_type: proposal.vote_type.clone(),
        votes: output.votes,
        time_series_data,
        final_results: output.final_results,
        total_delegated_voting_power: proposal.total_delegated_voting_power,
        hidden_vote: proposal.hidden_vote,
        scores_state: proposal.scores_state.clone(),
        quorum_metrics,
        ranked_rounds: output.ranked_rounds,
    }
}
