//! Black-box runs of the `tally` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let p = dir.path().join(name);
    fs::write(&p, body).unwrap();
    p
}

fn inputs(dir: &tempfile::TempDir) -> (PathBuf, PathBuf) {
    let proposal = fixture(
        dir,
        "proposal.json",
        r#"{"choices":["For","Against","Abstain"],"voteType":"basic","quorum":"100",
            "quorumChoiceIndices":[0,2],"totalDelegatedVotingPower":1000,"scoresState":"final"}"#,
    );
    let ballots = fixture(
        dir,
        "ballots.json",
        r#"{"ballots":[
            {"voterAddress":"0xa","votingPower":80,"choice":0,"castAt":"2024-05-01T12:00:00Z"},
            {"voterAddress":"0xb","votingPower":"20","choice":2,"castAt":"2024-05-01T12:05:00Z"},
            {"voterAddress":"0xc","votingPower":50,"choice":1,"castAt":"2024-05-01T12:10:00Z"}
        ]}"#,
    );
    (proposal, ballots)
}

#[test]
fn writes_result_and_digest() {
    let dir = tempfile::tempdir().unwrap();
    let (proposal, ballots) = inputs(&dir);
    let out = dir.path().join("result.json");

    Command::cargo_bin("tally")
        .unwrap()
        .arg("--proposal")
        .arg(&proposal)
        .arg("--ballots")
        .arg(&ballots)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::is_match(r"RES:[0-9a-f]{64}").unwrap());

    let v: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(v["finalResults"]["0"], 80.0);
    assert_eq!(v["quorumMetrics"]["quorumVotingPower"], 100.0);
    assert_eq!(v["quorumMetrics"]["hasQuorum"], false);
    assert_eq!(v["votes"].as_array().unwrap().len(), 3);
}

#[test]
fn stdout_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let (proposal, ballots) = inputs(&dir);
    let run = || {
        Command::cargo_bin("tally")
            .unwrap()
            .args(["--quiet", "--profile", "results-list"])
            .arg("--proposal")
            .arg(&proposal)
            .arg("--ballots")
            .arg(&ballots)
            .output()
            .unwrap()
    };
    let a = run();
    let b = run();
    assert!(a.status.success());
    assert!(a.stderr.is_empty());
    assert_eq!(a.stdout, b.stdout);
    assert!(a.stdout.ends_with(b"\n"));
}

#[test]
fn bad_threshold_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let (proposal, ballots) = inputs(&dir);
    Command::cargo_bin("tally")
        .unwrap()
        .args(["--threshold", "-1"])
        .arg("--proposal")
        .arg(&proposal)
        .arg("--ballots")
        .arg(&ballots)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid --threshold"));
}

#[test]
fn missing_input_exits_two_and_broken_json_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let (proposal, _) = inputs(&dir);
    Command::cargo_bin("tally")
        .unwrap()
        .arg("--proposal")
        .arg(&proposal)
        .arg("--ballots")
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file not found"));

    let broken = fixture(&dir, "broken.json", "[{");
    Command::cargo_bin("tally")
        .unwrap()
        .arg("--proposal")
        .arg(&proposal)
        .arg("--ballots")
        .arg(&broken)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("json error"));
}
