//! Approval tabulation.
//!
//! Inputs: ballots whose `choice` is a list of one-based choice indices.
//!
//! Notes:
//! - Every approved choice is credited the ballot's **entire** voting power
//!   (no splitting), so Σ final results may exceed total voting power.
//! - A choice listed twice on one ballot is credited once.
//! - A single-index encoding is read as a one-element list.
//! - Chart points snapshot every choice's cumulative total whenever any
//!   choice's bucket flushes.

use tracing::warn;

use tally_core::determinism::sort_chronologically;
use tally_core::entities::{COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE};
use tally_core::{Ballot, BallotChoice, ChoiceRegistry, ProcessedVote, TallyParams};

use crate::tabulation::basic::record_malformed;
use crate::timeseries::coalesce_across_choices;
use crate::{TallyOutput, TallyState};

pub fn tabulate_approval(
    registry: &ChoiceRegistry<'_>,
    ballots: &[Ballot],
    params: &TallyParams,
) -> TallyOutput {
    let mut state = TallyState::new(registry.len(), ballots.len());

    for ballot in sort_chronologically(ballots) {
        match &ballot.choice {
            BallotChoice::List(raw) => credit_approvals(&mut state, registry, ballot, raw),
            BallotChoice::Single(raw) => credit_approvals(&mut state, registry, ballot, &[*raw]),
            other => record_malformed(&mut state, ballot, "approval", other),
        }
    }

    let series = coalesce_across_choices(state.contributions(), registry.len(), params.accumulation_threshold());
    state.finish(series)
}

/// Resolve one-based indices in ballot order, dropping unknown and repeated entries.
pub(crate) fn resolve_one_based_list(
    registry: &ChoiceRegistry<'_>,
    ballot: &Ballot,
    raw: &[i64],
) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::with_capacity(raw.len());
    for &r in raw {
        match registry.resolve_one_based(r) {
            Some(choice) if !out.contains(&choice) => out.push(choice),
            Some(_) => {}
            None => warn!(voter = %ballot.voter_address, raw = r, "skipping unknown choice index"),
        }
    }
    out
}

fn credit_approvals(state: &mut TallyState, registry: &ChoiceRegistry<'_>, ballot: &Ballot, raw: &[i64]) {
    let approved = resolve_one_based_list(registry, ballot, raw);
    for &choice in &approved {
        state.credit(choice, ballot.voting_power, ballot.cast_at);
    }

    let vote = match approved.as_slice() {
        [] => ProcessedVote::from_ballot(ballot, COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE),
        [only] => ProcessedVote::from_ballot(ballot, *only as i64, registry.label_or_unknown(Some(*only))),
        many => {
            let text = many
                .iter()
                .map(|&c| registry.label_or_unknown(Some(c)))
                .collect::<Vec<_>>()
                .join(", ");
            ProcessedVote::from_ballot(ballot, COMBINED_CHOICE_INDEX, text)
        }
    };
    state.push_vote(vote);
}
