use std::collections::{HashMap, VecDeque};

use chrono::{Months, NaiveDate};
use tracing::info;

use crate::error::FeatureError;
use crate::progress::FoldProgress;
use crate::record::{COMPLETED, MatchRecord, validate_sequence};

const PASS: &str = "streak";

#[derive(Debug, Clone, PartialEq)]
pub struct StreakConfig {
    pub lookback_months: u32,
    pub completed_marker: String,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            lookback_months: 3,
            completed_marker: COMPLETED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreakFeatures {
    pub injuries0: f64,
    pub injuries1: f64,
    pub winning_streak0: f64,
    pub winning_streak1: f64,
}

/// Running win streaks and a per-player log of retirements/walkovers.
pub struct StreakTracker {
    streaks: HashMap<String, u32>,
    // Dates are pushed in non-decreasing order, so the front is always the oldest.
    adverse: HashMap<String, VecDeque<NaiveDate>>,
    lookback: Months,
    completed_marker: String,
}

impl StreakTracker {
    pub fn new(cfg: &StreakConfig) -> Self {
        Self {
            streaks: HashMap::new(),
            adverse: HashMap::new(),
            lookback: Months::new(cfg.lookback_months),
            completed_marker: cfg.completed_marker.clone(),
        }
    }

    pub fn streak(&self, player: &str) -> u32 {
        self.streaks.get(player).copied().unwrap_or(0)
    }

    /// First day of the trailing window ending on `date`.
    pub fn window_start(&self, date: NaiveDate) -> NaiveDate {
        date.checked_sub_months(self.lookback)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Adverse events of `player` dated within `[date - lookback, date]`.
    ///
    /// Entries older than the window are dropped; later queries never look further back.
    pub fn injuries(&mut self, player: &str, date: NaiveDate) -> u32 {
        let start = self.window_start(date);
        let Some(log) = self.adverse.get_mut(player) else {
            return 0;
        };
        while log.front().is_some_and(|d| *d < start) {
            log.pop_front();
        }
        log.iter().filter(|d| **d <= date).count() as u32
    }

    /// Features describing both players before `m` is played.
    pub fn features_for(&mut self, m: &MatchRecord) -> StreakFeatures {
        StreakFeatures {
            injuries0: self.injuries(&m.player0, m.date) as f64,
            injuries1: self.injuries(&m.player1, m.date) as f64,
            winning_streak0: self.streak(&m.player0) as f64,
            winning_streak1: self.streak(&m.player1) as f64,
        }
    }

    /// Folds the outcome of `m` into the state.
    pub fn observe(&mut self, m: &MatchRecord) {
        *self.streaks.entry(m.player0.clone()).or_insert(0) += 1;
        self.streaks.insert(m.player1.clone(), 0);

        if !m.is_completed(&self.completed_marker) {
            self.adverse
                .entry(m.player1.clone())
                .or_default()
                .push_back(m.date);
        }
    }

    /// Builds state from rows that emit nothing themselves.
    pub fn seed(&mut self, warmup: &[MatchRecord]) {
        for m in warmup {
            self.observe(m);
        }
    }
}

/// Injuries in the trailing window and current winning streak, for every row of `matches`.
///
/// `year_zero` only seeds the state.
pub fn add_injuries_and_winning_streak_features(
    matches: &[MatchRecord],
    year_zero: &[MatchRecord],
    cfg: &StreakConfig,
    mut on_progress: impl FnMut(FoldProgress),
) -> Result<Vec<StreakFeatures>, FeatureError> {
    validate_sequence(PASS, year_zero.iter().chain(matches), true)?;

    let mut tracker = StreakTracker::new(cfg);
    tracker.seed(year_zero);

    let total = matches.len();
    let mut out = Vec::with_capacity(total);
    on_progress(FoldProgress {
        pass: PASS,
        current: 0,
        total,
    });
    for (idx, m) in matches.iter().enumerate() {
        out.push(tracker.features_for(m));
        tracker.observe(m);
        on_progress(FoldProgress {
            pass: PASS,
            current: idx + 1,
            total,
        });
    }

    info!(
        rows = total,
        warmup_rows = year_zero.len(),
        "streak and injury features computed"
    );
    Ok(out)
}
