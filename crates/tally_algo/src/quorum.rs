//! Quorum & participation metrics over final totals.
//!
//! - `quorumVotingPower` = Σ final results over the quorum-counting choices.
//! - `hasQuorum` only when the proposal defines a quorum, and strictly greater.
//! - `participationPercentage` only when delegated power is known and non-zero.
//! - Majority support only when some choice is labeled "For".

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use tally_core::rounding::percent_of;
use tally_core::{ChoiceRegistry, QuorumMetrics};

/// Borrowed view of everything the calculator reads.
#[derive(Clone, Copy, Debug)]
pub struct QuorumInputs<'a> {
    pub registry: ChoiceRegistry<'a>,
    pub final_results: &'a BTreeMap<usize, f64>,
    pub total_voting_power: f64,
    pub quorum: Option<f64>,
    pub quorum_choice_indices: &'a BTreeSet<usize>,
    pub total_delegated_voting_power: Option<f64>,
}

pub fn compute_quorum_metrics(inputs: &QuorumInputs<'_>) -> QuorumMetrics {
    let quorum_voting_power: f64 = inputs
        .quorum_choice_indices
        .iter()
        .filter_map(|i| inputs.final_results.get(i))
        .sum();

    let has_quorum = inputs.quorum.map(|q| quorum_voting_power > q);

    let participation_percentage = inputs
        .total_delegated_voting_power
        .and_then(|delegated| percent_of(inputs.total_voting_power, delegated));

    let majority_choice = majority_choice(inputs.final_results);
    let has_majority_support = inputs.registry.find_label("For").map(|_| {
        majority_choice.is_some_and(|m| {
            inputs.registry.label(m).is_some_and(|l| l.trim().eq_ignore_ascii_case("for"))
                && inputs.final_results[&m] > inputs.total_voting_power / 2.0
        })
    });

    debug!(quorum_voting_power, ?has_quorum, ?majority_choice, ?has_majority_support, "quorum metrics");

    QuorumMetrics {
        quorum_voting_power,
        has_quorum,
        participation_percentage,
        majority_choice,
        has_majority_support,
    }
}

/// Highest total; ties resolve to the lowest index.
fn majority_choice(final_results: &BTreeMap<usize, f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (&i, &v) in final_results {
        match best {
            Some((_, bv)) if v <= bv => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
