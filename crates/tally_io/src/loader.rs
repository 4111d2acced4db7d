//! Loader: read local JSON inputs (proposal, ballots, optional params) and
//! return typed values for the engine. No network I/O.
//!
//! - Ballots files are either a bare array or `{"ballots": [...]}`.
//! - Ballots cast outside the proposal's voting window are kept (the engine
//!   tallies what it is given) but reported at warn level.

#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use tally_core::entities::format_timestamp;
use tally_core::{Ballot, Proposal, TallyParams};

use crate::IoError;

/// Everything one `process` call needs, loaded from disk.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub proposal: Proposal,
    pub ballots: Vec<Ballot>,
    pub params: TallyParams,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BallotsFile {
    Bare(Vec<Ballot>),
    Wrapped { ballots: Vec<Ballot> },
}

/// Load proposal + ballots (+ params when a path is given; defaults otherwise).
pub fn load_all(
    proposal_path: &Path,
    ballots_path: &Path,
    params_path: Option<&Path>,
) -> Result<LoadedInputs, IoError> {
    let proposal = load_proposal(proposal_path)?;
    let ballots = load_ballots(ballots_path)?;
    let params = match params_path {
        Some(p) => load_params(p)?,
        None => TallyParams::default(),
    };

    let outside = report_outside_window(&proposal, &ballots);
    debug!(
        choices = proposal.choices.len(),
        ballots = ballots.len(),
        outside,
        threshold = params.accumulation_threshold(),
        "inputs loaded"
    );
    Ok(LoadedInputs { proposal, ballots, params })
}

pub fn load_proposal(path: &Path) -> Result<Proposal, IoError> {
    read_json(path)
}

pub fn load_ballots(path: &Path) -> Result<Vec<Ballot>, IoError> {
    Ok(match read_json::<BallotsFile>(path)? {
        BallotsFile::Bare(b) | BallotsFile::Wrapped { ballots: b } => b,
    })
}

/// Params files are `{"accumulation_threshold": n}` or `{"profile": "results_list"}`.
pub fn load_params(path: &Path) -> Result<TallyParams, IoError> {
    let raw = read_text(path)?;
    let params: TallyParams =
        serde_json::from_str(&raw).map_err(|e| IoError::Params(format!("{}: {e}", path.display())))?;
    params.validate()?;
    Ok(params)
}

/// Warn for every ballot cast outside `[windowStart, windowEnd]`; returns how many.
pub fn report_outside_window(proposal: &Proposal, ballots: &[Ballot]) -> usize {
    let mut outside = 0usize;
    for b in ballots.iter().filter(|b| !proposal.window_contains(&b.cast_at)) {
        outside += 1;
        warn!(voter = %b.voter_address, cast_at = %format_timestamp(&b.cast_at), "ballot cast outside voting window");
    }
    outside
}

fn read_text(path: &Path) -> Result<String, IoError> {
    fs::read_to_string(path).map_err(|e| IoError::Read(format!("{}: {e}", path.display())))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).map_err(|e| IoError::Json {
        path: path.display().to_string(),
        pointer: format!("line {} column {}", e.line(), e.column()),
        msg: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tally_core::{BallotChoice, VoteType};

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        p
    }

    #[test]
    fn ballots_accept_array_or_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let row = r#"{"voterAddress":"0xa","votingPower":"12.5","choice":[1,2],"castAt":"2024-05-01T12:00:00Z"}"#;
        let bare = write(&dir, "bare.json", &format!("[{row}]"));
        let wrapped = write(&dir, "wrapped.json", &format!(r#"{{"ballots":[{row}]}}"#));
        let a = load_ballots(&bare).unwrap();
        let b = load_ballots(&wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].voting_power, 12.5);
        assert_eq!(a[0].choice, BallotChoice::List(vec![1, 2]));
    }

    #[test]
    fn proposal_defaults_and_unknown_vote_type() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "p.json", r#"{"choices":["For","Against"],"voteType":"borda","quorum":"10"}"#);
        let prop = load_proposal(&p).unwrap();
        assert_eq!(prop.vote_type, VoteType::Other("borda".into()));
        assert_eq!(prop.quorum, Some(10.0));
        assert!(!prop.hidden_vote);
        assert!(prop.quorum_choice_indices.is_empty());
    }

    #[test]
    fn params_profile_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let list = write(&dir, "list.json", r#"{"profile":"results_list"}"#);
        assert_eq!(load_params(&list).unwrap().accumulation_threshold(), 50_000.0);

        let bad = write(&dir, "bad.json", r#"{"accumulation_threshold":0}"#);
        assert!(matches!(load_params(&bad), Err(IoError::Params(_))));

        let unknown = write(&dir, "unknown.json", r#"{"threshold":5}"#);
        assert!(matches!(load_params(&unknown), Err(IoError::Params(_))));
    }

    #[test]
    fn read_and_json_errors_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(load_proposal(&missing), Err(IoError::Read(_))));

        let broken = write(&dir, "broken.json", "{\"choices\": [");
        match load_proposal(&broken) {
            Err(IoError::Json { pointer, .. }) => assert!(pointer.starts_with("line 1")),
            other => panic!("expected json error, got {other:?}"),
        }
    }

    #[test]
    fn outside_window_is_counted_not_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            &dir,
            "p.json",
            r#"{"choices":["For"],"windowStart":"2024-05-01T00:00:00Z","windowEnd":"2024-05-02T00:00:00Z"}"#,
        );
        let b = write(
            &dir,
            "b.json",
            r#"[{"voterAddress":"0xa","votingPower":1,"choice":0,"castAt":"2024-05-01T12:00:00Z"},
                {"voterAddress":"0xb","votingPower":1,"choice":0,"castAt":"2024-05-03T12:00:00Z"}]"#,
        );
        let loaded = load_all(&p, &b, None).unwrap();
        assert_eq!(loaded.ballots.len(), 2);
        assert_eq!(report_outside_window(&loaded.proposal, &loaded.ballots), 1);
        assert_eq!(loaded.params, TallyParams::default());
    }
}
