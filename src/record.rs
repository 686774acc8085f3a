use chrono::{Datelike, NaiveDate};

use crate::error::FeatureError;

/// Comment value marking a match that was played to completion.
pub const COMPLETED: &str = "Completed";

/// One cleaned match row. `player0` is always the winner.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub location: Option<String>,
    pub tournament: Option<String>,
    pub series: Option<String>,
    pub court: Option<String>,
    pub surface: Option<String>,
    pub round: Option<String>,
    pub player0: String,
    pub player1: String,
    pub rank0: Option<f64>,
    pub rank1: Option<f64>,
    pub pts0: Option<f64>,
    pub pts1: Option<f64>,
    pub comment: Option<String>,
    pub b365_0: Option<f64>,
    pub b365_1: Option<f64>,
    pub ps0: Option<f64>,
    pub ps1: Option<f64>,
    pub avg0: Option<f64>,
    pub avg1: Option<f64>,
}

impl MatchRecord {
    /// Bare record with only the fields every pass needs.
    pub fn new(date: NaiveDate, winner: &str, loser: &str) -> Self {
        Self {
            date,
            location: None,
            tournament: None,
            series: None,
            court: None,
            surface: None,
            round: None,
            player0: winner.to_string(),
            player1: loser.to_string(),
            rank0: None,
            rank1: None,
            pts0: None,
            pts1: None,
            comment: Some(COMPLETED.to_string()),
            b365_0: None,
            b365_1: None,
            ps0: None,
            ps1: None,
            avg0: None,
            avg1: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn has_odds(&self) -> bool {
        self.avg0.is_some() && self.avg1.is_some()
    }

    /// True unless the comment differs from `marker`, compared exactly. Callers check
    /// presence first.
    pub fn is_completed(&self, marker: &str) -> bool {
        self.comment.as_deref().is_none_or(|c| c == marker)
    }

    /// Checks the identity fields, plus the completion marker when `needs_comment`.
    pub fn validate(&self, row: usize, needs_comment: bool) -> Result<(), FeatureError> {
        if self.player0.trim().is_empty() {
            return Err(FeatureError::MalformedRecord {
                row,
                field: "Player0",
            });
        }
        if self.player1.trim().is_empty() {
            return Err(FeatureError::MalformedRecord {
                row,
                field: "Player1",
            });
        }
        if needs_comment
            && self
                .comment
                .as_deref()
                .is_none_or(|c| c.trim().is_empty())
        {
            return Err(FeatureError::MalformedRecord {
                row,
                field: "Comment",
            });
        }
        Ok(())
    }
}

/// Validates every record and the non-decreasing date order of the whole sequence.
///
/// Rows are numbered by their position in `records`, so a warm-up batch chained in front
/// of the modeled rows shifts the numbering of the latter.
pub fn validate_sequence<'a>(
    tracker: &'static str,
    records: impl IntoIterator<Item = &'a MatchRecord>,
    needs_comment: bool,
) -> Result<usize, FeatureError> {
    let mut previous: Option<NaiveDate> = None;
    let mut count = 0usize;
    for (row, record) in records.into_iter().enumerate() {
        record.validate(row, needs_comment)?;
        if let Some(prev) = previous
            && record.date < prev
        {
            return Err(FeatureError::OrderingViolation {
                tracker,
                row,
                previous: prev,
                date: record.date,
            });
        }
        previous = Some(record.date);
        count += 1;
    }
    Ok(count)
}
