//! Proposal and ballot inputs, plus the uniform `ProcessedResult` output shape.
//!
//! Wire names are camelCase. Decimal quantities accept JSON numbers or numeric
//! strings and are carried as `f64`. Timestamps are UTC and are emitted at
//! second precision.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::registry::ChoiceRegistry;

/// Label used whenever a ballot's choice cannot be resolved against the registry.
pub const UNKNOWN_CHOICE: &str = "Unknown Choice";

/// `ProcessedVote::choice_index` for display rows that combine several choices
/// (or resolve to none).
pub const COMBINED_CHOICE_INDEX: i64 = -1;

/// `scoresState` value marking vote counts as finalized.
pub const FINAL_SCORES_STATE: &str = "final";

/// Reserved time-series key carrying the ranked-choice majority line.
pub const WINNING_THRESHOLD_KEY: &str = "Winning threshold";

// ---------------------------------- Vote type ----------------------------------

/// Declared voting method of a proposal.
///
/// Unrecognized tokens are kept verbatim in `Other` and tallied as `Basic`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VoteType {
    #[default]
    Basic,
    Weighted,
    Approval,
    RankedChoice,
    Quadratic,
    Other(String),
}

impl VoteType {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "basic" | "single-choice" => VoteType::Basic,
            "weighted" => VoteType::Weighted,
            "approval" => VoteType::Approval,
            "ranked-choice" | "ranked_choice" => VoteType::RankedChoice,
            "quadratic" => VoteType::Quadratic,
            _ => VoteType::Other(token.to_string()),
        }
    }

    pub fn as_token(&self) -> &str {
        match self {
            VoteType::Basic => "basic",
            VoteType::Weighted => "weighted",
            VoteType::Approval => "approval",
            VoteType::RankedChoice => "ranked-choice",
            VoteType::Quadratic => "quadratic",
            VoteType::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl Serialize for VoteType {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_token())
    }
}

impl<'de> Deserialize<'de> for VoteType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let token = Option::<String>::deserialize(d)?;
        Ok(token.map(|t| VoteType::from_token(&t)).unwrap_or_default())
    }
}

// ------------------------------- Ballot encoding -------------------------------

/// A ballot's `choice` as it arrives on the wire.
///
/// Which variant is *expected* depends on the proposal's `VoteType`; every
/// processor matches on this and recovers locally from the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BallotChoice {
    /// Basic / quadratic (zero-based), legacy weighted (one-based).
    Single(i64),
    /// Approval and ranked-choice (one-based, most preferred first for ranked).
    List(Vec<i64>),
    /// Weighted: one-based choice index (as a string key) → positive weight.
    Weights(BTreeMap<String, f64>),
    /// Anything else (null, floats, mixed arrays, ...).
    Malformed(serde_json::Value),
}

impl Default for BallotChoice {
    fn default() -> Self {
        BallotChoice::Malformed(serde_json::Value::Null)
    }
}

// ---------------------------------- Inputs ----------------------------------

/// One voter's submitted choice(s) plus their voting power at cast time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub voter_address: String,
    #[serde(deserialize_with = "decimal::non_negative")]
    pub voting_power: f64,
    #[serde(default)]
    pub choice: BallotChoice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub cast_at: DateTime<Utc>,
}

/// Read-only proposal snapshot supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Index in this list is the canonical choice id.
    pub choices: Vec<String>,
    #[serde(default, deserialize_with = "decimal::option")]
    pub quorum: Option<f64>,
    #[serde(default)]
    pub quorum_choice_indices: BTreeSet<usize>,
    #[serde(default)]
    pub vote_type: VoteType,
    #[serde(default, deserialize_with = "decimal::option")]
    pub total_delegated_voting_power: Option<f64>,
    #[serde(default)]
    pub hidden_vote: bool,
    #[serde(default)]
    pub scores_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_end: Option<DateTime<Utc>>,
}

impl Proposal {
    pub fn registry(&self) -> ChoiceRegistry<'_> {
        ChoiceRegistry::new(&self.choices)
    }

    /// Vote counts are provisional unless `scoresState == "final"`.
    pub fn scores_are_final(&self) -> bool {
        self.scores_state == FINAL_SCORES_STATE
    }

    /// True iff `at` falls inside the voting window (open bounds are unbounded).
    pub fn window_contains(&self, at: &DateTime<Utc>) -> bool {
        self.window_start.map_or(true, |s| *at >= s) && self.window_end.map_or(true, |e| *at <= e)
    }
}

// ---------------------------------- Outputs ----------------------------------

/// Normalized display row, one per ballot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedVote {
    /// Resolved (or raw, for unknown) choice index; `-1` for combined rows.
    pub choice_index: i64,
    pub choice_text: String,
    pub voting_power: f64,
    pub voter_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub cast_at: DateTime<Utc>,
}

impl ProcessedVote {
    pub fn from_ballot(ballot: &Ballot, choice_index: i64, choice_text: impl Into<String>) -> Self {
        ProcessedVote {
            choice_index,
            choice_text: choice_text.into(),
            voting_power: ballot.voting_power,
            voter_address: ballot.voter_address.clone(),
            reason: ballot.reason.clone(),
            cast_at: ballot.cast_at,
        }
    }
}

/// Key of a time-series value: a choice, the redacted bucket, or the majority line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    /// Sentinel `-1`: all choices collapsed (hidden votes).
    Combined,
    Choice(usize),
    WinningThreshold,
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Combined => write!(f, "{COMBINED_CHOICE_INDEX}"),
            SeriesKey::Choice(i) => write!(f, "{i}"),
            SeriesKey::WinningThreshold => f.write_str(WINNING_THRESHOLD_KEY),
        }
    }
}

impl Serialize for SeriesKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// One chart point. Points are ordered by timestamp (non-decreasing).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<SeriesKey, f64>,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        TimeSeriesPoint { timestamp, values: BTreeMap::new() }
    }

    /// Sum of the per-choice values (ignores the sentinel and threshold keys).
    pub fn choice_sum(&self) -> f64 {
        self.values
            .iter()
            .filter(|(k, _)| matches!(k, SeriesKey::Choice(_)))
            .map(|(_, v)| *v)
            .sum()
    }
}

/// One instant-runoff round, kept for audit charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRound {
    pub round: u32,
    /// Counts of the choices still standing in this round.
    pub counts: BTreeMap<usize, f64>,
    pub total_active_votes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eliminated: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<usize>,
}

/// Quorum, participation, and majority-support figures. Undefined figures are absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumMetrics {
    pub quorum_voting_power: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_quorum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participation_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub majority_choice: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_majority_support: Option<bool>,
}

/// The engine's output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResult {
    pub choices: Vec<String>,
    /// Parallel to `choices`.
    pub choice_colors: Vec<String>,
    pub total_voting_power: f64,
    pub quorum: Option<f64>,
    pub quorum_choice_indices: BTreeSet<usize>,
    pub vote_type: VoteType,
    pub votes: Vec<ProcessedVote>,
    pub time_series_data: Vec<TimeSeriesPoint>,
    /// Authoritative totals, one entry per choice index.
    pub final_results: BTreeMap<usize, f64>,
    pub total_delegated_voting_power: Option<f64>,
    pub hidden_vote: bool,
    pub scores_state: String,
    pub quorum_metrics: QuorumMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked_rounds: Option<Vec<RankedRound>>,
}

// ---------------------------------- Helpers ----------------------------------

/// RFC 3339 UTC at second precision, e.g. `2024-05-01T12:00:00Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn serialize_timestamp<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(at))
}

/// Decimal fields arrive either as JSON numbers or as numeric strings.
mod decimal {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Num(f64),
        Str(String),
    }

    fn finite<E: serde::de::Error>(w: Wire) -> Result<f64, E> {
        let v = match w {
            Wire::Num(n) => n,
            Wire::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("not a decimal: {s:?}")))?,
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(E::custom("decimal must be finite"))
        }
    }

    pub fn non_negative<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let v = finite(Wire::deserialize(d)?)?;
        if v < 0.0 {
            return Err(D::Error::custom(format!("voting power must be >= 0, got {v}")));
        }
        Ok(v)
    }

    pub fn option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Option::<Wire>::deserialize(d)?.map(finite).transpose()
    }
}
