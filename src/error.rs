use chrono::NaiveDate;
use thiserror::Error;

/// Hard failures that abort a whole feature pass.
///
/// Soft cases (no comparable odds, unseen competitors) never surface here; they resolve
/// to nulls or defaults inside the passes.
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("malformed record at row {row}: missing {field}")]
    MalformedRecord { row: usize, field: &'static str },

    #[error("{tracker}: row {row} dated {date} comes after a row dated {previous}")]
    OrderingViolation {
        tracker: &'static str,
        row: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("invalid date {value:?} at row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("no calendar years supplied")]
    EmptyYears,
}
