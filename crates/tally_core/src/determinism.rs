//! Determinism utilities: stable chronological ordering.
//!
//! Every processor walks ballots through `sort_chronologically`, so equal
//! `castAt` values keep their input order and repeated runs over the same
//! snapshot are identical.

use crate::entities::{Ballot, TimeSeriesPoint};

/// Ballots by ascending `castAt`; ties keep input order.
pub fn sort_chronologically(ballots: &[Ballot]) -> Vec<&Ballot> {
    let mut out: Vec<&Ballot> = ballots.iter().collect();
    // `sort_by` is stable.
    out.sort_by(|a, b| a.cast_at.cmp(&b.cast_at));
    out
}

/// Points by ascending timestamp; ties keep emission order.
pub fn sort_points(points: &mut [TimeSeriesPoint]) {
    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}
