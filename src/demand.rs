//! Hour × polygon demand table.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::ConfigError;
use crate::regions::PolygonId;

/// Accepted timestamp layouts for demand CSV files.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses a timestamp in any of the accepted layouts.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Non-negative hourly demand (MWh) per polygon.
///
/// Rows are contiguous hours starting at `start`; columns follow `polygons`.
/// Values are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandMatrix {
    start: NaiveDateTime,
    polygons: Vec<PolygonId>,
    values: Vec<f64>,
}

impl DemandMatrix {
    /// Builds a demand table from per-hour rows.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a row has the wrong width, a value is
    /// negative or non-finite, or a polygon appears twice.
    pub fn new(
        start: NaiveDateTime,
        polygons: Vec<PolygonId>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, ConfigError> {
        for (i, p) in polygons.iter().enumerate() {
            if polygons[..i].contains(p) {
                return Err(ConfigError::new(
                    "demand.polygons",
                    format!("polygon {p} appears more than once"),
                ));
            }
        }

        let width = polygons.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for (hour, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(ConfigError::new(
                    "demand",
                    format!("row {hour} has {} values, expected {width}", row.len()),
                ));
            }
            if let Some(v) = row.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(ConfigError::new(
                    "demand",
                    format!("row {hour} has invalid demand {v} (must be finite and >= 0)"),
                ));
            }
            values.extend(row);
        }

        Ok(Self {
            start,
            polygons,
            values,
        })
    }

    /// Reads a demand CSV file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be opened or parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|e| {
            ConfigError::new("demand.csv", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_csv_reader(file)
    }

    /// Reads demand CSV from any reader.
    ///
    /// The header is `timestamp` followed by one polygon id per column. Each
    /// subsequent row must be exactly one hour after the previous one.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for malformed headers, timestamps, values, or
    /// gaps in the hourly sequence.
    pub fn from_csv_reader(reader: impl Read) -> Result<Self, ConfigError> {
        let csv_err = |e: csv::Error| ConfigError::new("demand.csv", e.to_string());
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers().map_err(csv_err)?.clone();
        let polygons = headers
            .iter()
            .skip(1)
            .map(|h| {
                h.parse::<PolygonId>().map_err(|_| {
                    ConfigError::new("demand.csv", format!("header \"{h}\" is not a polygon id"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut start = None;
        let mut prev: Option<NaiveDateTime> = None;
        let mut rows = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_err)?;
            let raw_ts = record.get(0).unwrap_or_default();
            let ts = parse_timestamp(raw_ts).ok_or_else(|| {
                ConfigError::new(
                    "demand.csv",
                    format!("row {line}: invalid timestamp \"{raw_ts}\""),
                )
            })?;
            if let Some(p) = prev {
                if ts - p != TimeDelta::hours(1) {
                    return Err(ConfigError::new(
                        "demand.csv",
                        format!("row {line}: {ts} does not follow {p} by one hour"),
                    ));
                }
            }
            start.get_or_insert(ts);
            prev = Some(ts);

            let row = record
                .iter()
                .skip(1)
                .map(|v| {
                    v.parse::<f64>().map_err(|_| {
                        ConfigError::new("demand.csv", format!("row {line}: invalid number \"{v}\""))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let start = start.ok_or_else(|| ConfigError::new("demand.csv", "no data rows"))?;
        Self::new(start, polygons, rows)
    }

    /// Number of hourly rows.
    pub fn hours(&self) -> usize {
        if self.polygons.is_empty() {
            0
        } else {
            self.values.len() / self.polygons.len()
        }
    }

    pub fn polygons(&self) -> &[PolygonId] {
        &self.polygons
    }

    pub fn first_hour(&self) -> NaiveDateTime {
        self.start
    }

    /// Timestamp of the last row, or the start when the table is empty.
    pub fn last_hour(&self) -> NaiveDateTime {
        self.timestamp(self.hours().saturating_sub(1))
    }

    pub fn timestamp(&self, row: usize) -> NaiveDateTime {
        self.start + TimeDelta::hours(row as i64)
    }

    /// Row index of `ts`, if it falls on an hour inside the table.
    pub fn row_of(&self, ts: NaiveDateTime) -> Option<usize> {
        let delta = ts - self.start;
        if delta < TimeDelta::zero() || delta.num_seconds() % 3600 != 0 {
            return None;
        }
        let row = usize::try_from(delta.num_hours()).ok()?;
        (row < self.hours()).then_some(row)
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let w = self.polygons.len();
        &self.values[row * w..(row + 1) * w]
    }

    /// Aggregate demand across all polygons for one hour.
    pub fn row_sum(&self, row: usize) -> f64 {
        self.row(row).iter().sum()
    }

    /// Total demand over the whole table.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sets every hour of `polygon` to zero. Unknown polygons are ignored.
    pub fn zero_polygon(&mut self, polygon: PolygonId) {
        let Some(col) = self.polygons.iter().position(|p| *p == polygon) else {
            return;
        };
        let w = self.polygons.len();
        for v in self.values.iter_mut().skip(col).step_by(w) {
            *v = 0.0;
        }
    }
}
