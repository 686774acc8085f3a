use tracing::info;

use crate::activity::{ActivityFeatures, add_matches_played_and_won_features};
use crate::config::FeatureConfig;
use crate::elo::{EloConfig, EloFeatures, EloTracker, add_elo_rating_feature};
use crate::error::FeatureError;
use crate::odds::fill_missing_odds;
use crate::progress::log_progress;
use crate::record::MatchRecord;
use crate::streak::{StreakFeatures, add_injuries_and_winning_streak_features};

/// Names of the appended columns, in output order.
pub const FEATURE_COLUMNS: [&str; 10] = [
    "EloRating0",
    "EloRating1",
    "MatchesPlayed0",
    "MatchesPlayed1",
    "MatchesWon0",
    "MatchesWon1",
    "Injuries0",
    "Injuries1",
    "WinningStreak0",
    "WinningStreak1",
];

#[derive(Debug, Clone, Copy)]
pub struct FeatureInput<'a> {
    /// Modeled rows, chronological.
    pub matches: &'a [MatchRecord],
    /// The year before the modeled range; seeds state only.
    pub year_zero: &'a [MatchRecord],
    /// Calendar years to aggregate, year zero included.
    pub years: &'a [i32],
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeaturedMatch {
    pub record: MatchRecord,
    pub elo: EloFeatures,
    pub activity: ActivityFeatures,
    pub streak: StreakFeatures,
}

impl FeaturedMatch {
    /// Feature values in `FEATURE_COLUMNS` order.
    pub fn feature_values(&self) -> [f64; 10] {
        [
            self.elo.elo_rating0,
            self.elo.elo_rating1,
            self.activity.matches_played0,
            self.activity.matches_played1,
            self.activity.matches_won0,
            self.activity.matches_won1,
            self.streak.injuries0,
            self.streak.injuries1,
            self.streak.winning_streak0,
            self.streak.winning_streak1,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub rows: Vec<FeaturedMatch>,
    pub k_factor: f64,
    pub odds_filled: usize,
    pub odds_unresolved: usize,
}

/// Fills missing odds, then runs the three trackers concurrently over the filled rows.
///
/// Any hard failure in one tracker fails the whole table.
pub fn build_feature_table(
    input: FeatureInput<'_>,
    cfg: &FeatureConfig,
) -> Result<FeatureTable, FeatureError> {
    if input.years.is_empty() {
        return Err(FeatureError::EmptyYears);
    }

    let odds = fill_missing_odds(input.matches, cfg.odds_window());
    let matches = odds.records.as_slice();
    let k_factor = EloTracker::for_matches(matches, cfg.elo()).k_factor();
    let elo_cfg = EloConfig {
        k_factor: Some(k_factor),
        ..cfg.elo()
    };
    let streak_cfg = cfg.streak();

    let (elo, (activity, streak)) = rayon::join(
        || add_elo_rating_feature(matches, elo_cfg, log_progress),
        || {
            rayon::join(
                || {
                    add_matches_played_and_won_features(
                        matches,
                        input.year_zero,
                        input.years,
                        log_progress,
                    )
                },
                || {
                    add_injuries_and_winning_streak_features(
                        matches,
                        input.year_zero,
                        &streak_cfg,
                        log_progress,
                    )
                },
            )
        },
    );
    let (elo, activity, streak) = (elo?, activity?, streak?);

    let rows = odds
        .records
        .into_iter()
        .zip(elo)
        .zip(activity)
        .zip(streak)
        .map(|(((record, elo), activity), streak)| FeaturedMatch {
            record,
            elo,
            activity,
            streak,
        })
        .collect::<Vec<_>>();

    info!(rows = rows.len(), k = k_factor, "feature table built");
    Ok(FeatureTable {
        rows,
        k_factor,
        odds_filled: odds.filled,
        odds_unresolved: odds.unresolved,
    })
}
