//! Hidden-vote redaction: while a hidden proposal's scores are not final, chart
//! points must not leak a per-choice breakdown. Each point collapses to one
//! `-1` entry holding the sum of its per-choice values.

use tally_core::{Proposal, SeriesKey, TimeSeriesPoint};

#[inline]
pub fn should_redact(proposal: &Proposal) -> bool {
    proposal.hidden_vote && !proposal.scores_are_final()
}

pub fn redact_time_series(points: &mut [TimeSeriesPoint]) {
    for point in points.iter_mut() {
        let combined = point.choice_sum();
        point.values.clear();
        point.values.insert(SeriesKey::Combined, combined);
    }
}
