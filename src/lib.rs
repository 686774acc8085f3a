//! Sequential match features for win-probability datasets.
//!
//! Rows are matches between two players where slot 0 is always the winner. Every pass
//! folds over the chronologically sorted rows and emits, per row, the state of both
//! players before that match.

pub mod activity;
pub mod config;
pub mod dataset;
pub mod elo;
pub mod error;
pub mod odds;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod streak;

pub use config::FeatureConfig;
pub use error::FeatureError;
pub use pipeline::{
    FEATURE_COLUMNS, FeatureInput, FeatureTable, FeaturedMatch, build_feature_table,
};
pub use record::MatchRecord;
