use chrono::NaiveDate;

use match_features::FeatureError;
use match_features::elo::{
    EloConfig, EloTracker, add_elo_rating_feature, expected_score, k_factor_for_population,
};
use match_features::progress::silent;
use match_features::record::MatchRecord;

fn day(month: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, month, d).unwrap()
}

fn m(date: NaiveDate, winner: &str, loser: &str) -> MatchRecord {
    MatchRecord::new(date, winner, loser)
}

#[test]
fn equal_players_move_sixteen_points() {
    let mut elo = EloTracker::new(1500.0, 32.0);
    let pre = elo.record("A", "B");

    assert_eq!((pre.elo_rating0, pre.elo_rating1), (1500.0, 1500.0));
    assert_eq!(elo.rating("A"), 1516.0);
    assert_eq!(elo.rating("B"), 1484.0);
}

#[test]
fn rating_deltas_sum_to_k_times_expectation_gap() {
    let mut elo = EloTracker::new(1500.0, 32.0);
    elo.record("A", "B");
    elo.record("A", "C");

    let (a, c) = (elo.rating("A"), elo.rating("C"));
    let mut next = EloTracker::new(1500.0, 32.0);
    next.record("A", "B");
    next.record("A", "C");
    next.record("C", "A");

    let e = expected_score(c, a);
    let delta_c = next.rating("C") - c;
    let delta_a = next.rating("A") - a;
    assert!((delta_c - 32.0 * (1.0 - e)).abs() < 1e-9);
    assert!((delta_a + 32.0 * (1.0 - e)).abs() < 1e-9);
}

#[test]
fn emitted_ratings_never_include_own_match() {
    let rows = vec![
        m(day(1, 1), "A", "B"),
        m(day(1, 2), "A", "B"),
        m(day(1, 3), "B", "C"),
        m(day(1, 4), "C", "A"),
    ];
    let feats = add_elo_rating_feature(&rows, EloConfig::default(), silent).unwrap();
    assert_eq!(feats.len(), rows.len());

    let mut replay = EloTracker::new(1500.0, 32.0);
    for (row, feat) in rows.iter().zip(&feats) {
        assert_eq!(feat.elo_rating0, replay.rating(&row.player0));
        assert_eq!(feat.elo_rating1, replay.rating(&row.player1));
        replay.record(&row.player0, &row.player1);
    }

    assert_eq!(feats[0].elo_rating0, 1500.0);
    assert_eq!(feats[1].elo_rating0, 1516.0);
    assert_eq!(feats[1].elo_rating1, 1484.0);
}

#[test]
fn unseen_players_start_at_default() {
    let rows = vec![m(day(1, 1), "A", "B"), m(day(1, 2), "C", "D")];
    let cfg = EloConfig {
        default_rating: 1200.0,
        k_factor: None,
    };
    let feats = add_elo_rating_feature(&rows, cfg, silent).unwrap();
    assert_eq!(feats[1].elo_rating0, 1200.0);
    assert_eq!(feats[1].elo_rating1, 1200.0);
}

#[test]
fn k_factor_tiers_on_population_size() {
    assert_eq!(k_factor_for_population(0), 32.0);
    assert_eq!(k_factor_for_population(2099), 32.0);
    assert_eq!(k_factor_for_population(2100), 24.0);
    assert_eq!(k_factor_for_population(2400), 24.0);
    assert_eq!(k_factor_for_population(2401), 16.0);
}

#[test]
fn k_factor_counts_distinct_players() {
    let small = vec![m(day(1, 1), "A", "B"), m(day(1, 2), "B", "A")];
    assert_eq!(
        EloTracker::for_matches(&small, EloConfig::default()).k_factor(),
        32.0
    );

    let crowd = (0..2200)
        .map(|i| m(day(1, 1), &format!("W{i}"), &format!("L{i}")))
        .collect::<Vec<_>>();
    // 4400 distinct players
    assert_eq!(
        EloTracker::for_matches(&crowd, EloConfig::default()).k_factor(),
        16.0
    );

    let fixed = EloConfig {
        default_rating: 1500.0,
        k_factor: Some(10.0),
    };
    assert_eq!(EloTracker::for_matches(&crowd, fixed).k_factor(), 10.0);
}

#[test]
fn out_of_order_rows_fail_fast() {
    let rows = vec![m(day(2, 1), "A", "B"), m(day(1, 1), "A", "B")];
    let err = add_elo_rating_feature(&rows, EloConfig::default(), silent).unwrap_err();
    assert!(matches!(
        err,
        FeatureError::OrderingViolation {
            tracker: "elo",
            row: 1,
            ..
        }
    ));
}

#[test]
fn progress_reports_every_row() {
    let rows = vec![m(day(1, 1), "A", "B"), m(day(1, 2), "A", "B")];
    let mut seen = Vec::new();
    add_elo_rating_feature(&rows, EloConfig::default(), |p| seen.push((p.current, p.total)))
        .unwrap();
    assert_eq!(seen, [(0, 2), (1, 2), (2, 2)]);
}
