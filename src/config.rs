use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::elo::{DEFAULT_RATING, EloConfig};
use crate::odds::OddsWindow;
use crate::record::COMPLETED;
use crate::streak::StreakConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub default_rating: f64,
    // Overrides the population-based K when set.
    pub k_factor: Option<f64>,
    pub odds_window_start: f64,
    pub odds_window_step: f64,
    pub odds_window_max: f64,
    pub injury_lookback_months: u32,
    pub completed_marker: String,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            default_rating: DEFAULT_RATING,
            k_factor: None,
            odds_window_start: 10.0,
            odds_window_step: 10.0,
            odds_window_max: 100.0,
            injury_lookback_months: 3,
            completed_marker: COMPLETED.to_string(),
        }
    }
}

impl FeatureConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read feature config {}", path.display()))?;
        serde_json::from_str::<Self>(&raw)
            .with_context(|| format!("parse feature config {}", path.display()))
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.default_rating = env_or("FEATURES_DEFAULT_ELO", self.default_rating);
        if let Some(k) = env_parse::<f64>("FEATURES_K_FACTOR") {
            self.k_factor = Some(k);
        }
        self.odds_window_start = env_or("FEATURES_ODDS_WINDOW_START", self.odds_window_start);
        self.odds_window_step = env_or("FEATURES_ODDS_WINDOW_STEP", self.odds_window_step);
        self.odds_window_max = env_or("FEATURES_ODDS_WINDOW_MAX", self.odds_window_max);
        self.injury_lookback_months =
            env_or("FEATURES_INJURY_MONTHS", self.injury_lookback_months);
        if let Ok(marker) = std::env::var("FEATURES_COMPLETED_MARKER")
            && !marker.trim().is_empty()
        {
            self.completed_marker = marker.trim().to_string();
        }
        self
    }

    pub fn elo(&self) -> EloConfig {
        EloConfig {
            default_rating: self.default_rating,
            k_factor: self.k_factor,
        }
    }

    pub fn odds_window(&self) -> OddsWindow {
        OddsWindow {
            start: self.odds_window_start,
            step: self.odds_window_step,
            max: self.odds_window_max,
        }
    }

    pub fn streak(&self) -> StreakConfig {
        StreakConfig {
            lookback_months: self.injury_lookback_months,
            completed_marker: self.completed_marker.clone(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|val| val.trim().parse::<T>().ok())
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_parse(key).unwrap_or(default)
}
