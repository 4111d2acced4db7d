//! Basic (single-choice) tabulation.
//!
//! Each ballot carries one zero-based index and credits the ballot's full
//! voting power to it. Out-of-range indices still produce a display row
//! ("Unknown Choice") but are dropped from totals and from the chart.

use tracing::{debug, warn};

use tally_core::determinism::sort_chronologically;
use tally_core::entities::{COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE};
use tally_core::{Ballot, BallotChoice, ChoiceRegistry, ProcessedVote, TallyParams};

use crate::timeseries::coalesce_per_choice;
use crate::{TallyOutput, TallyState};

/// Run the basic processor over the full ballot set.
pub fn tabulate_basic(
    registry: &ChoiceRegistry<'_>,
    ballots: &[Ballot],
    params: &TallyParams,
) -> TallyOutput {
    let mut state = TallyState::new(registry.len(), ballots.len());

    for ballot in sort_chronologically(ballots) {
        match &ballot.choice {
            BallotChoice::Single(raw) => {
                credit_single(&mut state, registry, ballot, *raw, registry.resolve_zero_based(*raw), *raw);
            }
            other => record_malformed(&mut state, ballot, "basic", other),
        }
    }

    let series = coalesce_per_choice(state.contributions(), registry.len(), params.accumulation_threshold());
    state.finish(series)
}

/// Credit one single-index ballot. `display_index` is what the row shows when
/// the index does not resolve.
pub(crate) fn credit_single(
    state: &mut TallyState,
    registry: &ChoiceRegistry<'_>,
    ballot: &Ballot,
    raw: i64,
    resolved: Option<usize>,
    display_index: i64,
) {
    match resolved {
        Some(choice) => {
            state.credit(choice, ballot.voting_power, ballot.cast_at);
            state.push_vote(ProcessedVote::from_ballot(
                ballot,
                choice as i64,
                registry.label_or_unknown(Some(choice)),
            ));
        }
        None => {
            debug!(voter = %ballot.voter_address, raw, "choice index outside registry");
            state.push_vote(ProcessedVote::from_ballot(ballot, display_index, UNKNOWN_CHOICE));
        }
    }
}

/// Row for a ballot whose encoding does not fit the method. Not credited.
pub(crate) fn record_malformed(state: &mut TallyState, ballot: &Ballot, method: &str, choice: &BallotChoice) {
    warn!(voter = %ballot.voter_address, method, ?choice, "unexpected ballot encoding; recorded as unknown");
    state.push_vote(ProcessedVote::from_ballot(ballot, COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE));
}
