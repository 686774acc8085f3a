//! Previous-calendar-year activity per player.
//!
//! The aggregates are built once for every considered year, then each match looks up the
//! year before its own. Same-year results never leak into a row.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::error::FeatureError;
use crate::progress::FoldProgress;
use crate::record::{MatchRecord, validate_sequence};

const PASS: &str = "activity";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearTally {
    pub played: u32,
    pub won: u32,
}

impl YearTally {
    /// Share of matches won, in percent. Zero when nothing was played.
    pub fn win_pct(&self) -> f64 {
        if self.played == 0 {
            return 0.0;
        }
        self.won as f64 / self.played as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivityFeatures {
    pub matches_played0: f64,
    pub matches_played1: f64,
    pub matches_won0: f64,
    pub matches_won1: f64,
}

/// Per-year, per-player tallies.
#[derive(Debug, Default)]
pub struct YearlyActivity {
    by_year: HashMap<i32, HashMap<String, YearTally>>,
}

impl YearlyActivity {
    /// Aggregates `records` falling in one of `years`; other years are ignored.
    pub fn build<'a>(records: impl IntoIterator<Item = &'a MatchRecord>, years: &[i32]) -> Self {
        let wanted = years.iter().copied().collect::<HashSet<_>>();
        let mut by_year: HashMap<i32, HashMap<String, YearTally>> = HashMap::new();
        for m in records {
            let year = m.year();
            if !wanted.contains(&year) {
                continue;
            }
            let players = by_year.entry(year).or_default();
            let winner = players.entry(m.player0.clone()).or_default();
            winner.played += 1;
            winner.won += 1;
            players.entry(m.player1.clone()).or_default().played += 1;
        }
        Self { by_year }
    }

    /// Tally of `player` in `year`; zero when absent.
    pub fn tally(&self, player: &str, year: i32) -> YearTally {
        self.by_year
            .get(&year)
            .and_then(|players| players.get(player))
            .copied()
            .unwrap_or_default()
    }

    pub fn features_for(&self, m: &MatchRecord) -> ActivityFeatures {
        let prior = m.year() - 1;
        let t0 = self.tally(&m.player0, prior);
        let t1 = self.tally(&m.player1, prior);
        ActivityFeatures {
            matches_played0: t0.played as f64,
            matches_played1: t1.played as f64,
            matches_won0: t0.win_pct(),
            matches_won1: t1.win_pct(),
        }
    }
}

/// Matches played and won % during the previous calendar year, for every row of `matches`.
pub fn add_matches_played_and_won_features(
    matches: &[MatchRecord],
    year_zero: &[MatchRecord],
    years: &[i32],
    mut on_progress: impl FnMut(FoldProgress),
) -> Result<Vec<ActivityFeatures>, FeatureError> {
    if years.is_empty() {
        return Err(FeatureError::EmptyYears);
    }
    validate_sequence(PASS, year_zero.iter().chain(matches), false)?;

    let table = YearlyActivity::build(year_zero.iter().chain(matches), years);

    let total = matches.len();
    let mut out = Vec::with_capacity(total);
    on_progress(FoldProgress {
        pass: PASS,
        current: 0,
        total,
    });
    for (idx, m) in matches.iter().enumerate() {
        out.push(table.features_for(m));
        on_progress(FoldProgress {
            pass: PASS,
            current: idx + 1,
            total,
        });
    }

    info!(rows = total, years = years.len(), "activity features computed");
    Ok(out)
}
