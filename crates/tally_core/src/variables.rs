//! variables.rs: Engine parameters with safe defaults.
//!
//! The only tunable is the time-series accumulation threshold. Two call sites
//! use different values: the results table charts with 5,000, the results
//! list with 50,000. Both are exposed as a `ThresholdProfile`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RESULTS_TABLE_THRESHOLD: f64 = 5_000.0;
pub const RESULTS_LIST_THRESHOLD: f64 = 50_000.0;

/// Parameter validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("accumulation threshold must be finite and > 0, got {0}")]
    InvalidThreshold(f64),
}

/// Named threshold presets (wire tokens explicit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThresholdProfile {
    #[default]
    #[serde(rename = "results_table")]
    ResultsTable,
    #[serde(rename = "results_list")]
    ResultsList,
}

impl ThresholdProfile {
    pub fn threshold(self) -> f64 {
        match self {
            ThresholdProfile::ResultsTable => RESULTS_TABLE_THRESHOLD,
            ThresholdProfile::ResultsList => RESULTS_LIST_THRESHOLD,
        }
    }
}

/// Validated engine parameters. The threshold is private so every value in
/// circulation went through `new`, a profile, or a checked params file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParamsWire")]
pub struct TallyParams {
    /// Ballots at or above this power get their own chart point; smaller ones
    /// are batched until their sum reaches it.
    accumulation_threshold: f64,
}

impl TallyParams {
    pub fn new(accumulation_threshold: f64) -> Result<Self, ParamsError> {
        let p = TallyParams { accumulation_threshold };
        p.validate()?;
        Ok(p)
    }

    #[inline]
    pub fn accumulation_threshold(&self) -> f64 {
        self.accumulation_threshold
    }

    pub fn for_profile(profile: ThresholdProfile) -> Self {
        TallyParams { accumulation_threshold: profile.threshold() }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let t = self.accumulation_threshold;
        if t.is_finite() && t > 0.0 {
            Ok(())
        } else {
            Err(ParamsError::InvalidThreshold(t))
        }
    }
}

impl Default for TallyParams {
    fn default() -> Self {
        TallyParams::for_profile(ThresholdProfile::default())
    }
}

/// Parameter file shape: an explicit threshold wins over a profile.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamsWire {
    #[serde(default)]
    accumulation_threshold: Option<f64>,
    #[serde(default)]
    profile: Option<ThresholdProfile>,
}

impl TryFrom<ParamsWire> for TallyParams {
    type Error = ParamsError;

    fn try_from(w: ParamsWire) -> Result<Self, Self::Error> {
        match (w.accumulation_threshold, w.profile) {
            (Some(t), _) => TallyParams::new(t),
            (None, Some(p)) => Ok(TallyParams::for_profile(p)),
            (None, None) => Ok(TallyParams::default()),
        }
    }
}
