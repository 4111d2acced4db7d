//! crates/tally_pipeline/src/tabulate.rs
//! TABULATE stage: pick the processor for the proposal's declared vote type and
//! run it over the full ballot set. Unrecognized vote types fall back to basic.

use tracing::debug;

use tally_algo::tabulation;
use tally_algo::TallyOutput;
use tally_core::{Ballot, Proposal, TallyParams, VoteType};

/// Processor actually used for a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TallyMethod {
    Basic,
    Weighted,
    Approval,
    RankedChoice,
    Quadratic,
}

impl TallyMethod {
    /// Route a declared vote type; anything unrecognized is tallied as basic.
    pub fn for_vote_type(vote_type: &VoteType) -> Self {
        match vote_type {
            VoteType::Basic => TallyMethod::Basic,
            VoteType::Weighted => TallyMethod::Weighted,
            VoteType::Approval => TallyMethod::Approval,
            VoteType::RankedChoice => TallyMethod::RankedChoice,
            VoteType::Quadratic => TallyMethod::Quadratic,
            VoteType::Other(token) => {
                debug!(token = %token, "unrecognized vote type; using basic");
                TallyMethod::Basic
            }
        }
    }
}

pub fn tabulate_for(proposal: &Proposal, ballots: &[Ballot], params: &TallyParams) -> TallyOutput {
    let registry = proposal.registry();
    let method = TallyMethod::for_vote_type(&proposal.vote_type);
    debug!(?method, choices = registry.len(), threshold = params.accumulation_threshold(), "dispatch");

    match method {
        TallyMethod::Basic => tabulation::tabulate_basic(&registry, ballots, params),
        TallyMethod::Weighted => tabulation::tabulate_weighted(&registry, ballots, params),
        TallyMethod::Approval => tabulation::tabulate_approval(&registry, ballots, params),
        TallyMethod::RankedChoice => tabulation::tabulate_ranked_choice(&registry, ballots, params),
        TallyMethod::Quadratic => tabulation::tabulate_quadratic(&registry, ballots, params),
    }
}
