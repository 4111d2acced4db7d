//! Time-Series Coalescer: bound the number of chart points without hiding large ballots.
//!
//! Rules, applied to a chronologically sorted stream and a threshold `T`:
//! - a single contribution with power ≥ `T` gets its own point and leaves the
//!   bucket untouched;
//! - smaller contributions are summed per bucket until the sum reaches `T`,
//!   then flushed as one point at the last contributing timestamp;
//! - a non-empty residual is flushed once the stream is consumed, at the
//!   timestamp of its last held contribution.
//!
//! Point values are **cumulative** totals (what the chart plots), while the
//! bucket only decides *when* to emit. Per-choice buckets live in a fixed-size
//! array indexed by choice.

use chrono::{DateTime, Utc};
use tracing::trace;

use tally_core::determinism::sort_points;
use tally_core::{SeriesKey, TimeSeriesPoint};

/// One chronological credit to a resolved choice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    pub choice: usize,
    pub power: f64,
    pub at: DateTime<Utc>,
}

/// Outcome of offering one contribution to a bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flush {
    /// Still below the threshold; keep accumulating.
    Hold,
    /// The accumulated sum reached the threshold.
    Batch,
    /// The contribution alone met the threshold.
    Whale,
}

impl Flush {
    #[inline]
    pub fn emits(self) -> bool {
        !matches!(self, Flush::Hold)
    }
}

/// Sub-threshold accumulator for one bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    pending: f64,
    last_at: Option<DateTime<Utc>>,
}

impl Accumulator {
    /// Offer one contribution. Only a batch flush clears the pending sum; a
    /// whale is never added to it and does not disturb what is already held.
    pub fn offer(&mut self, power: f64, at: DateTime<Utc>, threshold: f64) -> Flush {
        if power >= threshold {
            return Flush::Whale;
        }
        self.pending += power;
        self.last_at = Some(at);
        if self.pending >= threshold {
            self.clear();
            Flush::Batch
        } else {
            Flush::Hold
        }
    }

    /// Timestamp of the last held contribution, if a non-empty sum is pending.
    pub fn residual_at(&self) -> Option<DateTime<Utc>> {
        if self.pending > 0.0 {
            self.last_at
        } else {
            None
        }
    }

    pub fn pending(&self) -> f64 {
        self.pending
    }

    fn clear(&mut self) {
        self.pending = 0.0;
        self.last_at = None;
    }
}

/// Independent bucket per choice (basic, weighted). Each point carries only the
/// flushing choice's cumulative total. Contributions must reference choices
/// `< choice_count`.
///
/// A residual lands where its last held contribution sits in the stream and
/// carries the cumulative total as of that contribution, so a choice's values
/// never decrease even when whales follow the held power.
pub fn coalesce_per_choice(
    contributions: &[Contribution],
    choice_count: usize,
    threshold: f64,
) -> Vec<TimeSeriesPoint> {
    let mut running = vec![0.0_f64; choice_count];
    let mut buckets = vec![Accumulator::default(); choice_count];
    // (points emitted so far, cumulative total) at each choice's last hold
    let mut held: Vec<Option<(usize, f64)>> = vec![None; choice_count];
    let mut points = Vec::new();

    for c in contributions {
        running[c.choice] += c.power;
        let flush = buckets[c.choice].offer(c.power, c.at, threshold);
        match flush {
            Flush::Hold => held[c.choice] = Some((points.len(), running[c.choice])),
            Flush::Batch => held[c.choice] = None,
            Flush::Whale => {}
        }
        if flush.emits() {
            trace!(choice = c.choice, ?flush, cumulative = running[c.choice], "flush");
            points.push(single_value_point(c.at, c.choice, running[c.choice]));
        }
    }

    let mut residuals: Vec<(usize, DateTime<Utc>, usize, f64)> = Vec::new();
    for (choice, bucket) in buckets.iter().enumerate() {
        if let (Some(at), Some((slot, value))) = (bucket.residual_at(), held[choice]) {
            trace!(choice, residual = bucket.pending(), "flush residual");
            residuals.push((slot, at, choice, value));
        }
    }
    residuals.sort_by_key(|&(slot, at, choice, _)| (slot, at, choice));
    for (slot, at, choice, value) in residuals.into_iter().rev() {
        points.insert(slot, single_value_point(at, choice, value));
    }

    sort_points(&mut points);
    points
}

/// Per-choice buckets, but every emitted point snapshots the cumulative total of
/// **all** choices (approval). A batch clears only the flushing choice's bucket.
/// Flushes sharing a timestamp collapse into one point.
pub fn coalesce_across_choices(
    contributions: &[Contribution],
    choice_count: usize,
    threshold: f64,
) -> Vec<TimeSeriesPoint> {
    let mut running = vec![0.0_f64; choice_count];
    let mut buckets = vec![Accumulator::default(); choice_count];
    let mut points: Vec<TimeSeriesPoint> = Vec::new();

    for c in contributions {
        running[c.choice] += c.power;
        let flush = buckets[c.choice].offer(c.power, c.at, threshold);
        if flush.emits() {
            trace!(choice = c.choice, ?flush, "flush all choices");
            push_snapshot(&mut points, c.at, &running);
        }
    }

    let has_residual = buckets.iter().any(|b| b.residual_at().is_some());
    if has_residual {
        if let Some(last) = contributions.last() {
            push_snapshot(&mut points, last.at, &running);
        }
    }
    points
}

/// Exclusive end indices of the prefixes at which a global snapshot is due
/// (ranked-choice re-runs). The final residual boundary is `stream.len()`.
pub fn snapshot_boundaries<I>(stream: I, threshold: f64) -> Vec<usize>
where
    I: IntoIterator<Item = (f64, DateTime<Utc>)>,
{
    let mut bucket = Accumulator::default();
    let mut out = Vec::new();
    let mut len = 0usize;
    for (i, (power, at)) in stream.into_iter().enumerate() {
        len = i + 1;
        if bucket.offer(power, at, threshold).emits() {
            out.push(len);
        }
    }
    // A trailing whale already snapshots the whole stream.
    if bucket.residual_at().is_some() && out.last() != Some(&len) {
        out.push(len);
    }
    out
}

fn single_value_point(at: DateTime<Utc>, choice: usize, value: f64) -> TimeSeriesPoint {
    let mut p = TimeSeriesPoint::new(at);
    p.values.insert(SeriesKey::Choice(choice), value);
    p
}

fn push_snapshot(points: &mut Vec<TimeSeriesPoint>, at: DateTime<Utc>, running: &[f64]) {
    let mut p = TimeSeriesPoint::new(at);
    for (i, v) in running.iter().enumerate() {
        p.values.insert(SeriesKey::Choice(i), *v);
    }
    match points.last_mut() {
        Some(last) if last.timestamp == at => *last = p,
        _ => points.push(p),
    }
}
