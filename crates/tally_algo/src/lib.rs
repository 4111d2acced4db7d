// crates/tally_algo/src/lib.rs
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use tally_core::{ProcessedVote, RankedRound, TimeSeriesPoint};

use crate::timeseries::Contribution;

// ----------------------------- Processor output ---------------------------------------

/// What every tally processor produces for one proposal.
#[derive(Clone, Debug, PartialEq)]
pub struct TallyOutput {
    /// One entry per registry choice (zero when nothing was credited).
    pub final_results: BTreeMap<usize, f64>,
    /// One display row per ballot, chronological.
    pub votes: Vec<ProcessedVote>,
    pub time_series: Vec<TimeSeriesPoint>,
    /// Instant-runoff audit log; `None` for non-ranked methods.
    pub ranked_rounds: Option<Vec<RankedRound>>,
}

/// Running state shared by the index-credit processors (basic/weighted/approval).
pub(crate) struct TallyState {
    totals: Vec<f64>,
    votes: Vec<ProcessedVote>,
    contributions: Vec<Contribution>,
}

impl TallyState {
    pub(crate) fn new(choice_count: usize, ballot_count: usize) -> Self {
        TallyState {
            totals: vec![0.0; choice_count],
            votes: Vec::with_capacity(ballot_count),
            contributions: Vec::new(),
        }
    }

    /// Credit `power` to an already-resolved choice and record the chart contribution.
    pub(crate) fn credit(&mut self, choice: usize, power: f64, at: chrono::DateTime<chrono::Utc>) {
        self.totals[choice] += power;
        self.contributions.push(Contribution { choice, power, at });
    }

    pub(crate) fn push_vote(&mut self, vote: ProcessedVote) {
        self.votes.push(vote);
    }

    pub(crate) fn finish(self, time_series: Vec<TimeSeriesPoint>) -> TallyOutput {
        TallyOutput {
            final_results: into_final_results(self.totals),
            votes: self.votes,
            time_series,
            ranked_rounds: None,
        }
    }

    pub(crate) fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }
}

pub(crate) fn into_final_results(totals: Vec<f64>) -> BTreeMap<usize, f64> {
    totals.into_iter().enumerate().collect()
}

// ----------------------------- Tabulation (public surface) ---------------------------

pub mod tabulation {
    // File modules (actual implementations)
    pub mod basic;
    pub mod weighted;
    pub mod approval;
    pub mod ranked_irv;
    pub mod quadratic;

    pub use approval::tabulate_approval;
    pub use basic::tabulate_basic;
    pub use quadratic::tabulate_quadratic;
    pub use ranked_irv::{run_irv, tabulate_ranked_choice, IrvOutcome, RankedBallot};
    pub use weighted::tabulate_weighted;
}

// ----------------------------- Time series & quorum ----------------------------------

pub mod quorum;
pub mod timeseries;

pub use quorum::{compute_quorum_metrics, QuorumInputs};
pub use timeseries::{coalesce_across_choices, coalesce_per_choice, snapshot_boundaries, Accumulator, Flush};
