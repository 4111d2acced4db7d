// crates/tally_algo/src/tabulation/ranked_irv.rs
//
// Ranked-choice (instant-runoff) tabulation.
//
// - Preferences arrive one-based, most preferred first; they are resolved to
//   registry indices (unknown and repeated entries dropped).
// - Each round credits every ballot's power to its highest-ranked standing
//   choice. A strict majority of the active votes wins; otherwise the lowest
//   standing choice is eliminated. Ties for lowest go to the smallest index.
// - At most `choice_count` rounds: every non-terminal round eliminates one.
// - The chart re-runs the full elimination on chronological prefixes, using the
//   coalescer's global bucket to decide when a snapshot is due, and every point
//   carries the final "Winning threshold" (final active votes / 2).

use std::collections::BTreeSet;

use tracing::debug;

use chrono::{DateTime, Utc};
use tally_core::determinism::sort_chronologically;
use tally_core::entities::{COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE};
use tally_core::{
    Ballot, BallotChoice, ChoiceRegistry, ProcessedVote, RankedRound, SeriesKey, TallyParams,
    TimeSeriesPoint,
};

use crate::tabulation::approval::resolve_one_based_list;
use crate::tabulation::basic::record_malformed;
use crate::timeseries::snapshot_boundaries;
use crate::{into_final_results, TallyOutput, TallyState};

/// Borrowed ranked ballot: resolved preferences, most preferred first.
#[derive(Clone, Copy, Debug)]
pub struct RankedBallot<'a> {
    pub prefs: &'a [usize],
    pub power: f64,
}

/// Terminal state of one instant-runoff run.
#[derive(Clone, Debug, PartialEq)]
pub struct IrvOutcome {
    /// Terminal-round counts per choice; eliminated choices are 0.
    pub counts: Vec<f64>,
    pub total_active_votes: f64,
    pub winner: Option<usize>,
    pub eliminated: BTreeSet<usize>,
    pub rounds: Vec<RankedRound>,
}

/// First still-standing preference for a ballot, or None if exhausted.
#[inline]
pub fn next_active_pref(prefs: &[usize], eliminated: &BTreeSet<usize>) -> Option<usize> {
    prefs.iter().copied().find(|c| !eliminated.contains(c))
}

/// Credit each ballot to its current first choice. Returns `(counts, active_total)`;
/// exhausted ballots count toward neither.
pub(crate) fn tally_current_first_choices(
    choice_count: usize,
    ballots: &[RankedBallot<'_>],
    eliminated: &BTreeSet<usize>,
) -> (Vec<f64>, f64) {
    let mut counts = vec![0.0_f64; choice_count];
    let mut active = 0.0_f64;
    for b in ballots {
        if let Some(c) = next_active_pref(b.prefs, eliminated) {
            counts[c] += b.power;
            active += b.power;
        }
    }
    (counts, active)
}

/// Standing choice holding strictly more than half the active votes.
pub fn check_majority(counts: &[f64], standing: &[usize], active: f64) -> Option<usize> {
    standing.iter().copied().find(|&c| counts[c] > active / 2.0)
}

/// Lowest standing count; ties resolve to the smallest choice index.
pub fn pick_lowest_to_eliminate(counts: &[f64], standing: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &c in standing {
        match best {
            // strict `<` keeps the earliest index on ties
            Some(b) if counts[c] < counts[b] => best = Some(c),
            None => best = Some(c),
            _ => {}
        }
    }
    best
}

/// Run instant-runoff to completion.
pub fn run_irv(choice_count: usize, ballots: &[RankedBallot<'_>]) -> IrvOutcome {
    let mut eliminated: BTreeSet<usize> = BTreeSet::new();
    let mut rounds: Vec<RankedRound> = Vec::new();
    let mut last = (vec![0.0_f64; choice_count], 0.0_f64);

    for round in 1..=choice_count as u32 {
        let (counts, active) = tally_current_first_choices(choice_count, ballots, &eliminated);
        let standing: Vec<usize> = (0..choice_count).filter(|c| !eliminated.contains(c)).collect();

        let mut record = RankedRound {
            round,
            counts: standing.iter().map(|&c| (c, counts[c])).collect(),
            total_active_votes: active,
            eliminated: None,
            winner: None,
        };

        let winner = check_majority(&counts, &standing, active).or_else(|| match standing.as_slice() {
            [only] => Some(*only),
            _ => None,
        });

        if let Some(w) = winner {
            debug!(round, winner = w, active, "instant-runoff winner");
            record.winner = Some(w);
            rounds.push(record);
            return IrvOutcome {
                counts: zero_eliminated(counts, &eliminated),
                total_active_votes: active,
                winner: Some(w),
                eliminated,
                rounds,
            };
        }

        match pick_lowest_to_eliminate(&counts, &standing) {
            Some(loser) => {
                debug!(round, eliminated = loser, count = counts[loser], active, "instant-runoff elimination");
                record.eliminated = Some(loser);
                rounds.push(record);
                eliminated.insert(loser);
            }
            None => break,
        }
        last = (counts, active);
    }

    // Only reached with no choices at all.
    let (counts, active) = last;
    IrvOutcome {
        counts: zero_eliminated(counts, &eliminated),
        total_active_votes: active,
        winner: None,
        eliminated,
        rounds,
    }
}

fn zero_eliminated(mut counts: Vec<f64>, eliminated: &BTreeSet<usize>) -> Vec<f64> {
    for &c in eliminated {
        counts[c] = 0.0;
    }
    counts
}

/// Ballot with resolved preferences, in chronological order.
struct Parsed {
    prefs: Vec<usize>,
    power: f64,
    at: DateTime<Utc>,
}

pub fn tabulate_ranked_choice(
    registry: &ChoiceRegistry<'_>,
    ballots: &[Ballot],
    params: &TallyParams,
) -> TallyOutput {
    let mut state = TallyState::new(registry.len(), ballots.len());
    let mut parsed: Vec<Parsed> = Vec::with_capacity(ballots.len());

    for ballot in sort_chronologically(ballots) {
        let prefs = match &ballot.choice {
            BallotChoice::List(raw) => resolve_one_based_list(registry, ballot, raw),
            BallotChoice::Single(raw) => resolve_one_based_list(registry, ballot, &[*raw]),
            other => {
                record_malformed(&mut state, ballot, "ranked-choice", other);
                continue;
            }
        };
        state.push_vote(ranked_vote_row(registry, ballot, &prefs));
        if !prefs.is_empty() {
            parsed.push(Parsed { prefs, power: ballot.voting_power, at: ballot.cast_at });
        }
    }

    let n = registry.len();
    let ranked: Vec<RankedBallot<'_>> = parsed
        .iter()
        .map(|p| RankedBallot { prefs: &p.prefs, power: p.power })
        .collect();

    let full = run_irv(n, &ranked);

    // Intermediate snapshots on chronological prefixes.
    let boundaries = snapshot_boundaries(
        parsed.iter().map(|p| (p.power, p.at)),
        params.accumulation_threshold(),
    );
    let winning_threshold = full.total_active_votes / 2.0;
    let mut series: Vec<TimeSeriesPoint> = Vec::with_capacity(boundaries.len());
    for end in boundaries {
        let snapshot = if end == ranked.len() { full.clone() } else { run_irv(n, &ranked[..end]) };
        let mut point = TimeSeriesPoint::new(parsed[end - 1].at);
        for (c, v) in snapshot.counts.iter().enumerate() {
            point.values.insert(SeriesKey::Choice(c), *v);
        }
        point.values.insert(SeriesKey::WinningThreshold, winning_threshold);
        series.push(point);
    }

    let mut out = state.finish(series);
    out.final_results = into_final_results(full.counts);
    out.ranked_rounds = Some(full.rounds);
    out
}

/// Display row: "1. A, 2. B" for full rankings, the label alone for one preference.
fn ranked_vote_row(registry: &ChoiceRegistry<'_>, ballot: &Ballot, prefs: &[usize]) -> ProcessedVote {
    match prefs {
        [] => ProcessedVote::from_ballot(ballot, COMBINED_CHOICE_INDEX, UNKNOWN_CHOICE),
        [only] => ProcessedVote::from_ballot(ballot, *only as i64, registry.label_or_unknown(Some(*only))),
        many => {
            let text = many
                .iter()
                .enumerate()
                .map(|(rank, &c)| format!("{}. {}", rank + 1, registry.label_or_unknown(Some(c))))
                .collect::<Vec<_>>()
                .join(", ");
            ProcessedVote::from_ballot(ballot, COMBINED_CHOICE_INDEX, text)
        }
    }
}
