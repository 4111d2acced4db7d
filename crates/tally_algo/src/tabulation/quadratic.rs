//! Quadratic tabulation.
//!
//! Quadratic proposals currently carry single-index ballots and are tallied
//! exactly like basic ones: voting power is credited as-is, not square-rooted.

use tracing::debug;

use tally_core::{Ballot, ChoiceRegistry, TallyParams};

use crate::tabulation::basic::tabulate_basic;
use crate::TallyOutput;

pub fn tabulate_quadratic(
    registry: &ChoiceRegistry<'_>,
    ballots: &[Ballot],
    params: &TallyParams,
) -> TallyOutput {
    // TODO(quadratic): credit sqrt(cost) per choice once ballots carry per-choice spend.
    debug!(ballots = ballots.len(), "quadratic proposals use basic crediting");
    tabulate_basic(registry, ballots, params)
}
