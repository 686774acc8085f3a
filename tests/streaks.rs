use chrono::NaiveDate;

use match_features::FeatureError;
use match_features::progress::silent;
use match_features::record::MatchRecord;
use match_features::streak::{
    StreakConfig, StreakTracker, add_injuries_and_winning_streak_features,
};

fn date(y: i32, month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, month, d).unwrap()
}

fn m(on: NaiveDate, winner: &str, loser: &str) -> MatchRecord {
    MatchRecord::new(on, winner, loser)
}

fn retired(on: NaiveDate, winner: &str, loser: &str) -> MatchRecord {
    let mut row = MatchRecord::new(on, winner, loser);
    row.comment = Some("Retired".to_string());
    row
}

#[test]
fn streak_resets_after_a_loss() {
    let rows = vec![
        m(date(2020, 1, 1), "A", "B"),
        m(date(2020, 1, 2), "A", "B"),
        m(date(2020, 1, 3), "B", "A"),
    ];
    let feats =
        add_injuries_and_winning_streak_features(&rows, &[], &StreakConfig::default(), silent)
            .unwrap();

    let a = [
        feats[0].winning_streak0,
        feats[1].winning_streak0,
        feats[2].winning_streak1,
    ];
    let b = [
        feats[0].winning_streak1,
        feats[1].winning_streak1,
        feats[2].winning_streak0,
    ];
    assert_eq!(a, [0.0, 1.0, 2.0]);
    assert_eq!(b, [0.0, 0.0, 0.0]);

    let mut tracker = StreakTracker::new(&StreakConfig::default());
    for row in &rows {
        tracker.observe(row);
    }
    assert_eq!(tracker.streak("A"), 0);
    assert_eq!(tracker.streak("B"), 1);
}

#[test]
fn adverse_event_counts_for_loser_within_three_months() {
    let rows = vec![
        retired(date(2020, 1, 10), "A", "B"),
        m(date(2020, 2, 1), "C", "B"),
        m(date(2020, 4, 10), "B", "C"),
        m(date(2020, 4, 11), "C", "B"),
    ];
    let feats =
        add_injuries_and_winning_streak_features(&rows, &[], &StreakConfig::default(), silent)
            .unwrap();

    // The retirement does not count for its own row.
    assert_eq!(feats[0].injuries1, 0.0);
    assert_eq!(feats[0].injuries0, 0.0);
    assert_eq!(feats[1].injuries1, 1.0);
    assert_eq!(feats[1].injuries0, 0.0);
    // Window start 2020-01-10 is inclusive.
    assert_eq!(feats[2].injuries0, 1.0);
    assert_eq!(feats[3].injuries1, 0.0);
}

#[test]
fn winner_of_an_adverse_match_is_not_charged() {
    let rows = vec![
        retired(date(2020, 1, 10), "A", "B"),
        m(date(2020, 1, 20), "A", "C"),
    ];
    let feats =
        add_injuries_and_winning_streak_features(&rows, &[], &StreakConfig::default(), silent)
            .unwrap();
    assert_eq!(feats[1].injuries0, 0.0);
}

#[test]
fn custom_marker_and_lookback() {
    let cfg = StreakConfig {
        lookback_months: 1,
        completed_marker: "Done".to_string(),
    };
    let mut done = m(date(2020, 1, 10), "A", "B");
    done.comment = Some("Done".to_string());
    let rows = vec![
        done,
        m(date(2020, 1, 12), "A", "B"),
        m(date(2020, 1, 20), "B", "C"),
        m(date(2020, 2, 13), "B", "D"),
    ];
    let feats = add_injuries_and_winning_streak_features(&rows, &[], &cfg, silent).unwrap();
    assert_eq!(feats[1].injuries1, 0.0);
    assert_eq!(feats[2].injuries0, 1.0);
    assert_eq!(feats[3].injuries0, 0.0);
}

#[test]
fn warmup_seeds_state_without_emitting() {
    let warmup = vec![
        m(date(2019, 11, 1), "A", "B"),
        retired(date(2019, 12, 1), "A", "B"),
    ];
    let rows = vec![m(date(2020, 1, 15), "A", "B")];
    let feats =
        add_injuries_and_winning_streak_features(&rows, &warmup, &StreakConfig::default(), silent)
            .unwrap();

    assert_eq!(feats.len(), 1);
    assert_eq!(feats[0].winning_streak0, 2.0);
    assert_eq!(feats[0].winning_streak1, 0.0);
    assert_eq!(feats[0].injuries1, 1.0);
}

#[test]
fn missing_comment_aborts_the_pass() {
    let mut broken = m(date(2020, 1, 2), "A", "B");
    broken.comment = None;
    let warmup = vec![m(date(2019, 6, 1), "A", "B")];
    let rows = vec![m(date(2020, 1, 1), "A", "B"), broken];
    let err =
        add_injuries_and_winning_streak_features(&rows, &warmup, &StreakConfig::default(), silent)
            .unwrap_err();
    assert_eq!(
        err,
        FeatureError::MalformedRecord {
            row: 2,
            field: "Comment"
        }
    );
}

#[test]
fn unsorted_rows_are_rejected() {
    let rows = vec![m(date(2020, 3, 1), "A", "B"), m(date(2020, 2, 1), "A", "B")];
    let err =
        add_injuries_and_winning_streak_features(&rows, &[], &StreakConfig::default(), silent)
            .unwrap_err();
    assert!(matches!(
        err,
        FeatureError::OrderingViolation {
            tracker: "streak",
            ..
        }
    ));
}
