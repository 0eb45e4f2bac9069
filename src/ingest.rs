//! CSV ingestion for metric time series.
//!
//! Each input file carries one metric: a `date` column, a `geo_location`
//! column, and a numeric metric column (`revenue` or an order count). Rows
//! are keyed by date × geo; a duplicate key is a hard error rather than a
//! silent overwrite.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use thiserror::Error;

/// Errors raised while loading a metric CSV
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open CSV: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{column}' (found: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },

    #[error("line {line}: expected at least {expected} columns, got {got}")]
    ShortRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { line: usize, value: String },

    #[error("line {line}: invalid numeric value '{value}'")]
    InvalidValue { line: usize, value: String },

    #[error("line {line}: duplicate observation for '{geo}' on {date}")]
    DuplicateKey {
        line: usize,
        geo: String,
        date: NaiveDate,
    },

    #[error("no data rows in CSV")]
    Empty,
}

/// A single metric observation: one geo unit on one day
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub geo: String,
    pub value: f64,
}

/// All observations from one metric file
#[derive(Debug, Clone)]
pub struct MetricSeries {
    /// Metric label, taken from the value column name (e.g. "revenue")
    pub metric: String,
    pub observations: Vec<Observation>,
}

impl MetricSeries {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            observations: Vec::new(),
        }
    }

    pub fn from_observations(metric: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            metric: metric.into(),
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Latest observation date, if any
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.observations.iter().map(|o| o.date).max()
    }

    /// Sorted, deduplicated geo unit identifiers
    ///
    /// Sorting makes downstream seeded draws independent of row order.
    pub fn unit_ids(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.observations.iter().map(|o| o.geo.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// Load a metric CSV into a `MetricSeries`.
///
/// Required columns (case-insensitive): `date`, `geo_location`, and
/// `metric_column`. Extra columns are ignored.
///
/// # Errors
/// Returns `IngestError` if the file cannot be read, a required column is
/// missing, a row fails to parse, a date × geo key repeats, or the file has
/// no data rows.
pub fn load_metric_csv(path: &Path, metric_column: &str) -> Result<MetricSeries, IngestError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let date_idx = find_column(&headers, "date")?;
    let geo_idx = find_column(&headers, "geo_location")?;
    let value_idx = find_column(&headers, metric_column)?;
    let min_columns = date_idx.max(geo_idx).max(value_idx) + 1;

    let mut observations = Vec::new();
    let mut seen: HashSet<(NaiveDate, String)> = HashSet::new();

    for (idx, result) in reader.records().enumerate() {
        // Records start on line 2 (after the header), 1-based
        let line = idx + 2;
        let record = result?;

        if record.len() < min_columns {
            return Err(IngestError::ShortRow {
                line,
                expected: min_columns,
                got: record.len(),
            });
        }

        let date = parse_date(&record, date_idx, line)?;
        let geo = record[geo_idx].to_string();
        let value = parse_value(&record, value_idx, line)?;

        if !seen.insert((date, geo.clone())) {
            return Err(IngestError::DuplicateKey { line, geo, date });
        }

        observations.push(Observation { date, geo, value });
    }

    if observations.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(MetricSeries::from_observations(metric_column, observations))
}

/// Case-insensitive header lookup
fn find_column(headers: &StringRecord, name: &str) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| IngestError::MissingColumn {
            column: name.to_string(),
            found: headers.iter().map(str::to_string).collect(),
        })
}

fn parse_date(record: &StringRecord, idx: usize, line: usize) -> Result<NaiveDate, IngestError> {
    let raw = &record[idx];
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .map_err(|_| IngestError::InvalidDate {
            line,
            value: raw.to_string(),
        })
}

fn parse_value(record: &StringRecord, idx: usize, line: usize) -> Result<f64, IngestError> {
    let raw = &record[idx];
    let value: f64 = raw.parse().map_err(|_| IngestError::InvalidValue {
        line,
        value: raw.to_string(),
    })?;

    if !value.is_finite() {
        return Err(IngestError::InvalidValue {
            line,
            value: raw.to_string(),
        });
    }

    Ok(value)
}
