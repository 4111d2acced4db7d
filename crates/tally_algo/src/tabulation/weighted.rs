//! Weighted tabulation.
//!
//! A ballot spreads its power across choices in proportion to its weights:
//! `share(i) = power × weight(i) / Σ weights`. Weight-map keys are one-based.
//! Legacy single-index ballots (also one-based) are tallied as basic ballots.
//! Chart bucketing runs independently per choice over the normalized shares.

use std::collections::BTreeMap;

use tracing::warn;

use tally_core::determinism::sort_chronologically;
use tally_core::entities::{COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE};
use tally_core::rounding::format_percent;
use tally_core::{Ballot, BallotChoice, ChoiceRegistry, ProcessedVote, TallyParams};

use crate::tabulation::basic::{credit_single, record_malformed};
use crate::timeseries::coalesce_per_choice;
use crate::{TallyOutput, TallyState};

pub fn tabulate_weighted(
    registry: &ChoiceRegistry<'_>,
    ballots: &[Ballot],
    params: &TallyParams,
) -> TallyOutput {
    let mut state = TallyState::new(registry.len(), ballots.len());

    for ballot in sort_chronologically(ballots) {
        match &ballot.choice {
            BallotChoice::Weights(weights) => credit_weights(&mut state, registry, ballot, weights),
            BallotChoice::Single(raw) => {
                let display = raw.saturating_sub(1);
                credit_single(&mut state, registry, ballot, *raw, registry.resolve_one_based(*raw), display);
            }
            other => record_malformed(&mut state, ballot, "weighted", other),
        }
    }

    let series = coalesce_per_choice(state.contributions(), registry.len(), params.accumulation_threshold());
    state.finish(series)
}

/// Resolve weight entries to registry indices. Entries with unparsable keys,
/// unknown choices, or non-positive weights are skipped; duplicate keys that
/// resolve to the same choice are merged.
fn resolve_weights(
    registry: &ChoiceRegistry<'_>,
    ballot: &Ballot,
    weights: &BTreeMap<String, f64>,
) -> BTreeMap<usize, f64> {
    let mut kept: BTreeMap<usize, f64> = BTreeMap::new();
    for (key, &weight) in weights {
        let resolved = key
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|k| registry.resolve_one_based(k));
        match resolved {
            Some(choice) if weight.is_finite() && weight > 0.0 => {
                *kept.entry(choice).or_insert(0.0) += weight;
            }
            _ => warn!(voter = %ballot.voter_address, key = %key, weight, "skipping weight entry"),
        }
    }
    kept
}

fn credit_weights(
    state: &mut TallyState,
    registry: &ChoiceRegistry<'_>,
    ballot: &Ballot,
    weights: &BTreeMap<String, f64>,
) {
    let kept = resolve_weights(registry, ballot, weights);
    let total_weight: f64 = kept.values().sum();
    if kept.is_empty() || total_weight <= 0.0 {
        state.push_vote(ProcessedVote::from_ballot(ballot, COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE));
        return;
    }

    let mut parts = Vec::with_capacity(kept.len());
    for (&choice, &weight) in &kept {
        let share = ballot.voting_power * weight / total_weight;
        state.credit(choice, share, ballot.cast_at);
        parts.push(format!(
            "{} ({})",
            registry.label_or_unknown(Some(choice)),
            format_percent(weight / total_weight * 100.0)
        ));
    }
    state.push_vote(ProcessedVote::from_ballot(ballot, COMBINED_CHOICE_INDEX, parts.join(", ")));
}
