use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Deserialize;

use crate::error::FeatureError;
use crate::pipeline::{FEATURE_COLUMNS, FeatureTable};
use crate::record::MatchRecord;

/// Columns of the cleaned input table, in output order.
pub const INPUT_COLUMNS: [&str; 20] = [
    "Date",
    "Location",
    "Tournament",
    "Series",
    "Court",
    "Surface",
    "Round",
    "Player0",
    "Player1",
    "Rank0",
    "Rank1",
    "Pts0",
    "Pts1",
    "Comment",
    "B3650",
    "B3651",
    "PS0",
    "PS1",
    "Avg0",
    "Avg1",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvMatchRow {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Location")]
    location: Option<String>,
    #[serde(rename = "Tournament")]
    tournament: Option<String>,
    #[serde(rename = "Series")]
    series: Option<String>,
    #[serde(rename = "Court")]
    court: Option<String>,
    #[serde(rename = "Surface")]
    surface: Option<String>,
    #[serde(rename = "Round")]
    round: Option<String>,
    #[serde(rename = "Player0")]
    player0: Option<String>,
    #[serde(rename = "Player1")]
    player1: Option<String>,
    #[serde(rename = "Rank0", deserialize_with = "csv::invalid_option")]
    rank0: Option<f64>,
    #[serde(rename = "Rank1", deserialize_with = "csv::invalid_option")]
    rank1: Option<f64>,
    #[serde(rename = "Pts0", deserialize_with = "csv::invalid_option")]
    pts0: Option<f64>,
    #[serde(rename = "Pts1", deserialize_with = "csv::invalid_option")]
    pts1: Option<f64>,
    #[serde(rename = "Comment")]
    comment: Option<String>,
    #[serde(rename = "B3650", deserialize_with = "csv::invalid_option")]
    b365_0: Option<f64>,
    #[serde(rename = "B3651", deserialize_with = "csv::invalid_option")]
    b365_1: Option<f64>,
    #[serde(rename = "PS0", deserialize_with = "csv::invalid_option")]
    ps0: Option<f64>,
    #[serde(rename = "PS1", deserialize_with = "csv::invalid_option")]
    ps1: Option<f64>,
    #[serde(rename = "Avg0", deserialize_with = "csv::invalid_option")]
    avg0: Option<f64>,
    #[serde(rename = "Avg1", deserialize_with = "csv::invalid_option")]
    avg1: Option<f64>,
}

impl CsvMatchRow {
    fn into_record(self, row: usize) -> Result<MatchRecord, FeatureError> {
        let raw_date = non_empty(self.date).ok_or(FeatureError::MalformedRecord {
            row,
            field: "Date",
        })?;
        let date = parse_date(&raw_date).ok_or_else(|| FeatureError::InvalidDate {
            row,
            value: raw_date.clone(),
        })?;
        let player0 = non_empty(self.player0).ok_or(FeatureError::MalformedRecord {
            row,
            field: "Player0",
        })?;
        let player1 = non_empty(self.player1).ok_or(FeatureError::MalformedRecord {
            row,
            field: "Player1",
        })?;

        Ok(MatchRecord {
            date,
            location: non_empty(self.location),
            tournament: non_empty(self.tournament),
            series: non_empty(self.series),
            court: non_empty(self.court),
            surface: non_empty(self.surface),
            round: non_empty(self.round),
            player0,
            player1,
            rank0: self.rank0,
            rank1: self.rank1,
            pts0: self.pts0,
            pts1: self.pts1,
            comment: non_empty(self.comment),
            b365_0: self.b365_0,
            b365_1: self.b365_1,
            ps0: self.ps0,
            ps1: self.ps1,
            avg0: self.avg0,
            avg1: self.avg1,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

pub fn read_matches(reader: impl Read) -> Result<Vec<MatchRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (row, item) in csv_reader.deserialize::<CsvMatchRow>().enumerate() {
        let raw = item.with_context(|| format!("decode csv row {row}"))?;
        out.push(raw.into_record(row)?);
    }
    Ok(out)
}

pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>> {
    let file = File::open(path).with_context(|| format!("open matches {}", path.display()))?;
    read_matches(file).with_context(|| format!("load matches {}", path.display()))
}

pub fn earliest_year(records: &[MatchRecord]) -> Option<i32> {
    records.iter().map(MatchRecord::year).min()
}

pub fn latest_year(records: &[MatchRecord]) -> Option<i32> {
    records.iter().map(MatchRecord::year).max()
}

/// Splits into the warm-up year (`first_year - 1`) and the modeled rows (`>= first_year`).
/// Anything older than the warm-up year is dropped.
pub fn split_year_zero(
    records: Vec<MatchRecord>,
    first_year: i32,
) -> (Vec<MatchRecord>, Vec<MatchRecord>) {
    let mut year_zero = Vec::new();
    let mut matches = Vec::new();
    for m in records {
        let year = m.year();
        if year >= first_year {
            matches.push(m);
        } else if year == first_year - 1 {
            year_zero.push(m);
        }
    }
    (year_zero, matches)
}

pub fn years_between(from: i32, to: i32) -> Vec<i32> {
    (from..=to).collect()
}

/// Header plus one row per featured match, every cell as text.
pub fn table_rows(table: &FeatureTable) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(table.rows.len() + 1);
    rows.push(
        INPUT_COLUMNS
            .iter()
            .chain(FEATURE_COLUMNS.iter())
            .map(|c| c.to_string())
            .collect(),
    );
    for fm in &table.rows {
        let m = &fm.record;
        let mut row = vec![
            m.date.format("%Y-%m-%d").to_string(),
            m.location.clone().unwrap_or_default(),
            m.tournament.clone().unwrap_or_default(),
            m.series.clone().unwrap_or_default(),
            m.court.clone().unwrap_or_default(),
            m.surface.clone().unwrap_or_default(),
            m.round.clone().unwrap_or_default(),
            m.player0.clone(),
            m.player1.clone(),
            opt_to_string(m.rank0),
            opt_to_string(m.rank1),
            opt_to_string(m.pts0),
            opt_to_string(m.pts1),
            m.comment.clone().unwrap_or_default(),
            opt_to_string(m.b365_0),
            opt_to_string(m.b365_1),
            opt_to_string(m.ps0),
            opt_to_string(m.ps1),
            opt_to_string(m.avg0),
            opt_to_string(m.avg1),
        ];
        row.extend(fm.feature_values().iter().map(|v| v.to_string()));
        rows.push(row);
    }
    rows
}

pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for (idx, row) in rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("write csv row {idx}"))?;
    }
    writer.flush().context("flush csv")?;
    Ok(())
}

pub fn write_xlsx(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Features").context("name worksheet")?;
    write_rows(worksheet, rows)?;
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            // Header stays text.
            let number = if row_idx == 0 {
                None
            } else {
                numeric_cell(col_idx, value)
            };
            let written = match number {
                Some(n) => worksheet.write_number(row_idx as u32, col_idx as u16, n),
                None if value.is_empty() => continue,
                None => worksheet.write_string(row_idx as u32, col_idx as u16, value),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

/// Ranks, points, odds and every feature column are numeric; the rest is text.
fn is_numeric_column(col: usize) -> bool {
    matches!(col, 9..=12 | 14..=19) || col >= INPUT_COLUMNS.len()
}

fn numeric_cell(col: usize, value: &str) -> Option<f64> {
    if !is_numeric_column(col) {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
