use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::error::FeatureError;
use crate::progress::FoldProgress;
use crate::record::{MatchRecord, validate_sequence};

pub const DEFAULT_RATING: f64 = 1500.0;

const PASS: &str = "elo";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloConfig {
    pub default_rating: f64,
    pub k_factor: Option<f64>,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            default_rating: DEFAULT_RATING,
            k_factor: None,
        }
    }
}

/// Pre-match ratings of both slots.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EloFeatures {
    pub elo_rating0: f64,
    pub elo_rating1: f64,
}

/// K-factor picked from the number of distinct players in the whole dataset.
///
/// This tiers on population size rather than on a player's own rating.
pub fn k_factor_for_population(players: usize) -> f64 {
    if players < 2100 {
        32.0
    } else if players <= 2400 {
        24.0
    } else {
        16.0
    }
}

/// Expected score of `a` against `b`.
pub fn expected_score(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((b - a) / 400.0))
}

pub fn updated_rating(old: f64, expected: f64, actual: f64, k: f64) -> f64 {
    old + k * (actual - expected)
}

pub struct EloTracker {
    ratings: HashMap<String, f64>,
    default_rating: f64,
    k: f64,
}

impl EloTracker {
    pub fn new(default_rating: f64, k: f64) -> Self {
        Self {
            ratings: HashMap::new(),
            default_rating,
            k,
        }
    }

    /// Tracker with K chosen from the players appearing in `matches`.
    pub fn for_matches(matches: &[MatchRecord], cfg: EloConfig) -> Self {
        let k = cfg.k_factor.unwrap_or_else(|| {
            let players = matches
                .iter()
                .flat_map(|m| [m.player0.as_str(), m.player1.as_str()])
                .collect::<HashSet<_>>();
            k_factor_for_population(players.len())
        });
        Self::new(cfg.default_rating, k)
    }

    pub fn k_factor(&self) -> f64 {
        self.k
    }

    pub fn rating(&self, player: &str) -> f64 {
        self.ratings
            .get(player)
            .copied()
            .unwrap_or(self.default_rating)
    }

    pub fn ratings(&self) -> &HashMap<String, f64> {
        &self.ratings
    }

    /// Returns the pre-match ratings, then folds the result in.
    pub fn record(&mut self, winner: &str, loser: &str) -> EloFeatures {
        let r0 = self.rating(winner);
        let r1 = self.rating(loser);

        let e0 = expected_score(r0, r1);
        let e1 = expected_score(r1, r0);

        self.ratings
            .insert(winner.to_string(), updated_rating(r0, e0, 1.0, self.k));
        self.ratings
            .insert(loser.to_string(), updated_rating(r1, e1, 0.0, self.k));

        EloFeatures {
            elo_rating0: r0,
            elo_rating1: r1,
        }
    }
}

/// Pre-match Elo ratings for every row of `matches`.
pub fn add_elo_rating_feature(
    matches: &[MatchRecord],
    cfg: EloConfig,
    mut on_progress: impl FnMut(FoldProgress),
) -> Result<Vec<EloFeatures>, FeatureError> {
    validate_sequence(PASS, matches, false)?;

    let mut tracker = EloTracker::for_matches(matches, cfg);
    let total = matches.len();
    let mut out = Vec::with_capacity(total);
    on_progress(FoldProgress {
        pass: PASS,
        current: 0,
        total,
    });
    for (idx, m) in matches.iter().enumerate() {
        out.push(tracker.record(&m.player0, &m.player1));
        on_progress(FoldProgress {
            pass: PASS,
            current: idx + 1,
            total,
        });
    }

    info!(
        rows = total,
        players = tracker.ratings().len(),
        k = tracker.k_factor(),
        "elo ratings computed"
    );
    Ok(out)
}
