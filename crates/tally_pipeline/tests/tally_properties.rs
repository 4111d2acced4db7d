//! End-to-end properties of `process`: conservation, approval over-count,
//! weighted normalization, instant-runoff termination, chart flushing,
//! idempotence, hidden-vote redaction, and the quorum boundary.

use chrono::{DateTime, TimeZone, Utc};

use tally_core::{Ballot, BallotChoice, Proposal, SeriesKey, VoteType};
use tally_pipeline::process;

// -----------------------------------------------------------------------------
// Fixture builders
// -----------------------------------------------------------------------------

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_564_800 + secs, 0).single().expect("ts")
}

fn proposal(vote_type: VoteType, choices: &[&str]) -> Proposal {
    Proposal {
        choices: choices.iter().map(|c| c.to_string()).collect(),
        quorum: None,
        quorum_choice_indices: Default::default(),
        vote_type,
        total_delegated_voting_power: None,
        hidden_vote: false,
        scores_state: "final".into(),
        window_start: None,
        window_end: None,
    }
}

fn ballot(voter: &str, power: f64, choice: BallotChoice, secs: i64) -> Ballot {
    Ballot {
        voter_address: voter.into(),
        voting_power: power,
        choice,
        reason: None,
        cast_at: t(secs),
    }
}

fn weights(pairs: &[(&str, f64)]) -> BallotChoice {
    BallotChoice::Weights(pairs.iter().map(|(k, w)| (k.to_string(), *w)).collect())
}

// -----------------------------------------------------------------------------
// Totals
// -----------------------------------------------------------------------------

#[test]
fn basic_and_weighted_conserve_voting_power() {
    let basic = proposal(VoteType::Basic, &["For", "Against", "Abstain"]);
    let ballots = vec![
        ballot("a", 12.5, BallotChoice::Single(0), 1),
        ballot("b", 40.0, BallotChoice::Single(1), 2),
        ballot("c", 7.5, BallotChoice::Single(2), 3),
    ];
    let r = process(&basic, &ballots);
    assert_eq!(r.final_results.values().sum::<f64>(), 60.0);
    assert_eq!(r.total_voting_power, 60.0);

    let weighted = proposal(VoteType::Weighted, &["For", "Against", "Abstain"]);
    let ballots = vec![
        ballot("a", 90.0, weights(&[("1", 1.0), ("2", 2.0)]), 1),
        ballot("b", 10.0, weights(&[("3", 4.0)]), 2),
    ];
    let r = process(&weighted, &ballots);
    assert!((r.final_results.values().sum::<f64>() - 100.0).abs() < 1e-9);
}

#[test]
fn approval_sums_match_approving_ballots() {
    let p = proposal(VoteType::Approval, &["A", "B", "C"]);
    let ballots = vec![
        ballot("a", 10.0, BallotChoice::List(vec![1, 2]), 1),
        ballot("b", 20.0, BallotChoice::List(vec![2, 3]), 2),
        ballot("c", 5.0, BallotChoice::List(vec![1, 2, 3]), 3),
    ];
    let r = process(&p, &ballots);
    assert_eq!(r.final_results[&0], 15.0);
    assert_eq!(r.final_results[&1], 35.0);
    assert_eq!(r.final_results[&2], 25.0);
    assert_eq!(r.total_voting_power, 35.0);
}

#[test]
fn weighted_three_to_one_splits_seventy_five_twenty_five() {
    let p = proposal(VoteType::Weighted, &["For", "Against"]);
    let r = process(&p, &[ballot("a", 100.0, weights(&[("1", 3.0), ("2", 1.0)]), 1)]);
    assert_eq!(r.final_results[&0], 75.0);
    assert_eq!(r.final_results[&1], 25.0);
}

// -----------------------------------------------------------------------------
// Ranked choice
// -----------------------------------------------------------------------------

#[test]
fn ranked_majority_in_first_round() {
    let p = proposal(VoteType::RankedChoice, &["A", "B"]);
    let ballots = vec![
        ballot("a", 1.0, BallotChoice::List(vec![1, 2]), 1),
        ballot("b", 1.0, BallotChoice::List(vec![1, 2]), 2),
        ballot("c", 1.0, BallotChoice::List(vec![2, 1]), 3),
    ];
    let r = process(&p, &ballots);
    let rounds = r.ranked_rounds.as_ref().expect("rounds");
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].winner, Some(0));
    assert_eq!(rounds[0].eliminated, None);
    assert_eq!(r.final_results[&0], 2.0);
    assert_eq!(r.final_results[&1], 1.0);
}

#[test]
fn ranked_elimination_transfers_to_next_preference() {
    let p = proposal(VoteType::RankedChoice, &["A", "B", "C"]);
    let ballots = vec![
        ballot("a", 40.0, BallotChoice::List(vec![1, 3]), 1),
        ballot("b", 35.0, BallotChoice::List(vec![2, 3]), 2),
        ballot("c", 25.0, BallotChoice::List(vec![3, 2]), 3),
    ];
    let r = process(&p, &ballots);
    let rounds = r.ranked_rounds.as_ref().expect("rounds");
    assert_eq!(rounds[0].eliminated, Some(2));
    assert_eq!(rounds.last().and_then(|r| r.winner), Some(1));
    assert_eq!(r.final_results[&1], 60.0);
    assert_eq!(r.final_results[&2], 0.0);
    for point in &r.time_series_data {
        assert_eq!(point.values[&SeriesKey::WinningThreshold], 50.0);
    }
}

// -----------------------------------------------------------------------------
// Chart
// -----------------------------------------------------------------------------

#[test]
fn threshold_flush_then_whale() {
    let p = proposal(VoteType::Basic, &["For", "Against"]);
    let mut ballots: Vec<Ballot> = (0..5)
        .map(|i| ballot(&format!("v{i}"), 1000.0, BallotChoice::Single(0), i))
        .collect();
    let r = process(&p, &ballots);
    assert_eq!(r.time_series_data.len(), 1);
    assert_eq!(r.time_series_data[0].timestamp, t(4));
    assert_eq!(r.time_series_data[0].values[&SeriesKey::Choice(0)], 5000.0);

    ballots.push(ballot("whale", 6000.0, BallotChoice::Single(0), 5));
    let r = process(&p, &ballots);
    assert_eq!(r.time_series_data.len(), 2);
    assert_eq!(r.time_series_data[1].timestamp, t(5));
    assert_eq!(r.time_series_data[1].values[&SeriesKey::Choice(0)], 11000.0);
}

#[test]
fn whale_between_small_ballots_keeps_their_batch() {
    let p = proposal(VoteType::Basic, &["For", "Against"]);
    let ballots = vec![
        ballot("a", 3000.0, BallotChoice::Single(0), 1),
        ballot("whale", 6000.0, BallotChoice::Single(0), 2),
        ballot("b", 2000.0, BallotChoice::Single(0), 3),
        ballot("c", 100.0, BallotChoice::Single(0), 4),
    ];
    let r = process(&p, &ballots);
    let got: Vec<_> = r
        .time_series_data
        .iter()
        .map(|pt| (pt.timestamp, pt.values[&SeriesKey::Choice(0)]))
        .collect();
    assert_eq!(got, vec![(t(2), 9000.0), (t(3), 11000.0), (t(4), 11100.0)]);
}

#[test]
fn ranked_whale_between_small_ballots_keeps_their_snapshot() {
    let p = proposal(VoteType::RankedChoice, &["A", "B"]);
    let ballots = vec![
        ballot("a", 3000.0, BallotChoice::List(vec![1]), 1),
        ballot("whale", 6000.0, BallotChoice::List(vec![2]), 2),
        ballot("b", 2000.0, BallotChoice::List(vec![1]), 3),
        ballot("c", 100.0, BallotChoice::List(vec![2]), 4),
    ];
    let r = process(&p, &ballots);
    let ts: Vec<_> = r.time_series_data.iter().map(|pt| pt.timestamp).collect();
    assert_eq!(ts, vec![t(2), t(3), t(4)]);
}

#[test]
fn output_is_byte_identical_across_runs() {
    let p = proposal(VoteType::Approval, &["A", "B", "C"]);
    let ballots = vec![
        ballot("a", 3000.0, BallotChoice::List(vec![1, 3]), 2),
        ballot("b", 4000.0, BallotChoice::List(vec![2]), 1),
        ballot("c", 9000.0, BallotChoice::List(vec![3]), 2),
    ];
    let first = serde_json::to_vec(&process(&p, &ballots)).expect("json");
    let second = serde_json::to_vec(&process(&p, &ballots)).expect("json");
    assert_eq!(first, second);
}

#[test]
fn hidden_pending_collapses_and_final_passes_through() {
    let mut p = proposal(VoteType::RankedChoice, &["A", "B", "C"]);
    p.hidden_vote = true;
    p.scores_state = "pending".into();
    let ballots = vec![
        ballot("a", 6000.0, BallotChoice::List(vec![1, 2]), 1),
        ballot("b", 3000.0, BallotChoice::List(vec![2, 1]), 2),
        ballot("c", 2500.0, BallotChoice::List(vec![3, 2]), 3),
    ];
    let r = process(&p, &ballots);
    assert!(!r.time_series_data.is_empty());
    for point in &r.time_series_data {
        assert_eq!(point.values.len(), 1);
        assert!(point.values.contains_key(&SeriesKey::Combined));
    }
    let json = serde_json::to_value(&r).expect("json");
    assert!(json["timeSeriesData"][0]["values"].get("-1").is_some());

    p.scores_state = "final".into();
    let r = process(&p, &ballots);
    for point in &r.time_series_data {
        assert!(point.values.contains_key(&SeriesKey::Choice(0)));
        assert!(!point.values.contains_key(&SeriesKey::Combined));
    }
}

// -----------------------------------------------------------------------------
// Quorum & edge inputs
// -----------------------------------------------------------------------------

#[test]
fn quorum_equal_is_not_reached() {
    let mut p = proposal(VoteType::Basic, &["For", "Against", "Abstain"]);
    p.quorum = Some(100.0);
    p.quorum_choice_indices = [0, 2].into_iter().collect();
    p.total_delegated_voting_power = Some(1000.0);
    let ballots = vec![
        ballot("a", 80.0, BallotChoice::Single(0), 1),
        ballot("b", 20.0, BallotChoice::Single(2), 2),
        ballot("c", 50.0, BallotChoice::Single(1), 3),
    ];
    let r = process(&p, &ballots);
    assert_eq!(r.quorum_metrics.quorum_voting_power, 100.0);
    assert_eq!(r.quorum_metrics.has_quorum, Some(false));
    assert_eq!(r.quorum_metrics.participation_percentage, Some(15.0));
    assert_eq!(r.quorum_metrics.majority_choice, Some(0));
    assert_eq!(r.quorum_metrics.has_majority_support, Some(true));
}

#[test]
fn empty_ballot_set_is_zeroed_not_an_error() {
    for vt in [VoteType::Basic, VoteType::Weighted, VoteType::Approval, VoteType::RankedChoice, VoteType::Quadratic] {
        let p = proposal(vt, &["For", "Against"]);
        let r = process(&p, &[]);
        assert!(r.votes.is_empty());
        assert!(r.time_series_data.is_empty());
        assert_eq!(r.final_results.len(), 2);
        assert!(r.final_results.values().all(|v| *v == 0.0));
        assert_eq!(r.total_voting_power, 0.0);
        assert_eq!(r.choice_colors, vec!["#16A34A".to_string(), "#DC2626".to_string()]);
    }
}

#[test]
fn unknown_vote_type_is_tallied_as_basic_and_echoed() {
    let p = proposal(VoteType::from_token("copeland"), &["For", "Against"]);
    let r = process(&p, &[ballot("a", 3.0, BallotChoice::Single(1), 1)]);
    assert_eq!(r.final_results[&1], 3.0);
    let json = serde_json::to_value(&r).expect("json");
    assert_eq!(json["voteType"], "copeland");
}

#[test]
fn malformed_ballots_keep_their_display_row() {
    let p = proposal(VoteType::Weighted, &["For", "Against"]);
    let ballots = vec![
        ballot("a", 10.0, BallotChoice::Malformed(serde_json::json!("yes")), 1),
        ballot("b", 5.0, weights(&[("1", 1.0)]), 2),
    ];
    let r = process(&p, &ballots);
    assert_eq!(r.votes.len(), 2);
    assert_eq!(r.votes[0].choice_text, "Unknown Choice");
    assert_eq!(r.votes[0].voting_power, 10.0);
    assert_eq!(r.final_results[&0], 5.0);
    assert_eq!(r.total_voting_power, 15.0);
}
