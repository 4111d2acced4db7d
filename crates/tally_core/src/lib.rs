//! tally_core: Core types, choice registry, colors, and thresholds for the tally engine.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`tally_algo`, `tally_pipeline`) and its callers (`tally_io`, `tally_cli`).
//!
//! - Inputs: `Proposal`, `Ballot`, `BallotChoice` (sum type over the wire encodings)
//! - Output: `ProcessedResult` and its parts (`ProcessedVote`, `TimeSeriesPoint`, `QuorumMetrics`)
//! - `ChoiceRegistry`: zero-based choice lookup with "Unknown Choice" fallback
//! - Deterministic color assignment per choice label
//! - `TallyParams`: the injectable accumulation threshold
//! - Stable chronological ordering helpers

#![forbid(unsafe_code)]

pub mod colors;
pub mod determinism;
pub mod entities;
pub mod registry;
pub mod rounding;
pub mod variables;

pub use entities::{
    Ballot, BallotChoice, ProcessedResult, ProcessedVote, Proposal, QuorumMetrics, RankedRound,
    SeriesKey, TimeSeriesPoint, VoteType,
};
pub use registry::ChoiceRegistry;
pub use variables::{ParamsError, TallyParams, ThresholdProfile};
