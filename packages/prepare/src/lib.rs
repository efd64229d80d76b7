#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalizes the raw Seattle customer-service-request CSV export into
//! the JSON dataset document consumed by the dashboard.
//!
//! The pipeline keeps rows created in 2024-2025 that carry valid
//! coordinates, defaults missing categorical fields to `"Unknown"`,
//! reformats dates to ISO `YYYY-MM-DD`, and emits the records together
//! with precomputed summary statistics. Rows discarded by the date and
//! coordinate filters are counted and logged once per run.

use std::fs::File;
use std::io::{BufRead as _, BufReader, BufWriter, Read};
use std::path::Path;

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use request_map_cli_utils::ProgressCallback;
use request_map_request_models::{
    DatasetDocument, DateRange, GeoBounds, RawRecord, SummaryStats, UNKNOWN, top_n_values,
};
use thiserror::Error;

/// Timestamp format of the `Created Date` column in the raw export.
pub const CREATED_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Years retained by the normalizer.
pub const KEEP_YEARS: [i32; 2] = [2024, 2025];

/// Default output path for the dataset document.
pub const DEFAULT_OUTPUT: &str = "seattle_requests_2024_2025.json";

/// Fixed column names of the raw CSV export.
pub mod columns {
    /// Request creation timestamp.
    pub const CREATED_DATE: &str = "Created Date";
    /// Latitude.
    pub const LATITUDE: &str = "Latitude";
    /// Longitude.
    pub const LONGITUDE: &str = "Longitude";
    /// Request category.
    pub const REQUEST_TYPE: &str = "Service Request Type";
    /// Owning department.
    pub const DEPARTMENT: &str = "City Department";
    /// Free-form status.
    pub const STATUS: &str = "Status";
    /// Neighborhood name.
    pub const COMMUNITY: &str = "Community Reporting Area";
}

/// Errors that can occur while normalizing the raw export.
///
/// Every variant is fatal to the run: the normalizer either fully
/// succeeds or writes no output.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// Source file missing or unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV structure could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("missing required column '{name}'")]
    MissingColumn {
        /// The absent column name.
        name: String,
    },

    /// Every row was discarded by the validity filters.
    #[error("no records survived the year/coordinate filters")]
    NoRecords,

    /// The output document could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Column indices resolved from the header row.
struct Columns {
    created: usize,
    lat: usize,
    lon: usize,
    request_type: usize,
    department: usize,
    status: usize,
    community: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, PrepareError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| PrepareError::MissingColumn {
                    name: name.to_string(),
                })
        };
        Ok(Self {
            created: find(columns::CREATED_DATE)?,
            lat: find(columns::LATITUDE)?,
            lon: find(columns::LONGITUDE)?,
            request_type: find(columns::REQUEST_TYPE)?,
            department: find(columns::DEPARTMENT)?,
            status: find(columns::STATUS)?,
            community: find(columns::COMMUNITY)?,
        })
    }
}

/// Result of a normalization pass: the output document plus discard
/// accounting for the rows the validity filters dropped.
pub struct NormalizeOutcome {
    /// The dataset document ready to serialize.
    pub document: DatasetDocument,
    /// Rows read from the source.
    pub rows_read: u64,
    /// Rows whose timestamp failed to parse (treated as null-date).
    pub discarded_bad_date: u64,
    /// Rows with a parseable date outside the retained years.
    pub discarded_year: u64,
    /// Rows missing a finite latitude or longitude.
    pub discarded_coords: u64,
}

/// Parses a `Created Date` cell. Returns `None` for empty or
/// unparseable timestamps.
#[must_use]
pub fn parse_created_date(s: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(s.trim(), CREATED_DATE_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

/// Parses a coordinate cell. Returns `None` for empty, unparseable, or
/// non-finite values.
#[must_use]
pub fn parse_coordinate(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Returns the trimmed cell, or the `"Unknown"` sentinel if empty.
fn categorical(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Runs the normalization pass over an open CSV reader.
///
/// Row handling: an unparseable timestamp makes the row null-dated, which
/// the year filter then excludes; rows outside 2024-2025 and rows without
/// both coordinates are dropped. Each discard category is counted so the
/// caller can surface data-quality totals.
///
/// # Errors
///
/// Returns [`PrepareError`] if the header is missing a required column,
/// the CSV structure is unparseable, or no rows survive the filters.
pub fn normalize<R: Read>(
    reader: &mut csv::Reader<R>,
    progress: &dyn ProgressCallback,
) -> Result<NormalizeOutcome, PrepareError> {
    let cols = Columns::resolve(reader.headers()?)?;

    let mut data: Vec<RawRecord> = Vec::new();
    let mut rows_read = 0u64;
    let mut discarded_bad_date = 0u64;
    let mut discarded_year = 0u64;
    let mut discarded_coords = 0u64;

    for row in reader.records() {
        let row = row?;
        rows_read += 1;
        progress.inc(1);

        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let Some(date) = parse_created_date(cell(cols.created)) else {
            discarded_bad_date += 1;
            continue;
        };
        if !KEEP_YEARS.contains(&date.year()) {
            discarded_year += 1;
            continue;
        }

        let (Some(lat), Some(lon)) = (
            parse_coordinate(cell(cols.lat)),
            parse_coordinate(cell(cols.lon)),
        ) else {
            discarded_coords += 1;
            continue;
        };

        data.push(RawRecord {
            lat,
            lon,
            request_type: categorical(cell(cols.request_type)),
            department: categorical(cell(cols.department)),
            date: date.format("%Y-%m-%d").to_string(),
            status: categorical(cell(cols.status)),
            community: Some(categorical(cell(cols.community))),
        });
    }

    let stats = summary_stats(&data).ok_or(PrepareError::NoRecords)?;

    Ok(NormalizeOutcome {
        document: DatasetDocument { data, stats },
        rows_read,
        discarded_bad_date,
        discarded_year,
        discarded_coords,
    })
}

/// Computes full-dataset summary statistics. Returns `None` for an empty
/// record set (no meaningful date range or bounds exist).
#[must_use]
pub fn summary_stats(data: &[RawRecord]) -> Option<SummaryStats> {
    let first = data.first()?;

    let mut min_date = first.date.as_str();
    let mut max_date = first.date.as_str();
    let mut bounds = GeoBounds {
        min_lat: first.lat,
        max_lat: first.lat,
        min_lon: first.lon,
        max_lon: first.lon,
    };

    for record in data {
        let date = record.date.as_str();
        if date < min_date {
            min_date = date;
        }
        if date > max_date {
            max_date = date;
        }
        bounds.min_lat = bounds.min_lat.min(record.lat);
        bounds.max_lat = bounds.max_lat.max(record.lat);
        bounds.min_lon = bounds.min_lon.min(record.lon);
        bounds.max_lon = bounds.max_lon.max(record.lon);
    }

    Some(SummaryStats {
        total_records: data.len() as u64,
        date_range: DateRange {
            start: min_date.to_string(),
            end: max_date.to_string(),
        },
        top_request_types: top_n_values(data.iter().map(|r| r.request_type.as_str()), 10),
        top_departments: top_n_values(data.iter().map(|r| r.department.as_str()), 5),
        bounds: Some(bounds),
    })
}

/// Counts the data rows in the export so the progress bar can show a
/// percentage and ETA. Line-based: a quoted field holding a newline
/// overcounts by one, which only pads the bar total.
fn count_rows(path: &Path) -> Result<u64, PrepareError> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().count() as u64;
    Ok(lines.saturating_sub(1))
}

/// Reads the raw CSV export at `input`, normalizes it, and writes the
/// dataset document to `output`. Logs summary statistics and discard
/// totals mirroring the original preparation script.
///
/// # Errors
///
/// Returns [`PrepareError`] if the source is missing or unparseable, no
/// rows survive, or the output cannot be written. A failed run writes no
/// partial output.
pub fn run(
    input: &Path,
    output: &Path,
    progress: &dyn ProgressCallback,
) -> Result<NormalizeOutcome, PrepareError> {
    log::info!("Loading CSV data from {}...", input.display());
    progress.set_total(count_rows(input)?);

    let file = File::open(input)?;
    let mut reader = csv::Reader::from_reader(file);
    let outcome = normalize(&mut reader, progress)?;

    progress.finish(format!(
        "normalized {} of {} rows",
        outcome.document.data.len(),
        outcome.rows_read
    ));

    let writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer_pretty(writer, &outcome.document)?;

    let stats = &outcome.document.stats;
    log::info!("Total records loaded: {}", outcome.rows_read);
    log::info!(
        "Discarded: {} unparseable dates, {} outside {KEEP_YEARS:?}, {} missing coordinates",
        outcome.discarded_bad_date,
        outcome.discarded_year,
        outcome.discarded_coords
    );
    log::info!("Records written: {}", stats.total_records);
    log::info!(
        "Date range: {} to {}",
        stats.date_range.start,
        stats.date_range.end
    );
    if let Some(bounds) = &stats.bounds {
        log::info!(
            "Geographic bounds: lat {:.4} to {:.4}, lon {:.4} to {:.4}",
            bounds.min_lat,
            bounds.max_lat,
            bounds.min_lon,
            bounds.max_lon
        );
    }
    for entry in stats.top_request_types.iter().take(5) {
        log::info!("  {}: {}", entry.name, entry.count);
    }
    log::info!("Wrote {}", output.display());

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use request_map_cli_utils::{ProgressCallback, null_progress};

    use super::*;

    const HEADER: &str = "Created Date,Latitude,Longitude,Service Request Type,City Department,Status,Community Reporting Area\n";

    fn normalize_str(csv_text: &str) -> Result<NormalizeOutcome, PrepareError> {
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        normalize(&mut reader, null_progress().as_ref())
    }

    #[derive(Default)]
    struct RecordingProgress {
        total: AtomicU64,
        steps: AtomicU64,
        finished: AtomicU64,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn inc(&self, delta: u64) {
            self.steps.fetch_add(delta, Ordering::SeqCst);
        }

        fn finish(&self, _msg: String) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn keeps_only_valid_rows() {
        // One valid, one missing latitude, one dated 2023.
        let csv_text = format!(
            "{HEADER}\
             01/15/2024 08:30:00 AM,47.61,-122.33,Pothole,SDOT,Open,Ballard\n\
             02/01/2024 01:00:00 PM,,-122.30,Graffiti,SPU,Open,Fremont\n\
             06/01/2023 09:00:00 AM,47.62,-122.35,Noise,SPD,Closed,Queen Anne\n"
        );
        let outcome = normalize_str(&csv_text).unwrap();
        assert_eq!(outcome.document.data.len(), 1);
        assert_eq!(outcome.document.stats.total_records, 1);
        assert_eq!(outcome.rows_read, 3);
        assert_eq!(outcome.discarded_year, 1);
        assert_eq!(outcome.discarded_coords, 1);

        let record = &outcome.document.data[0];
        assert_eq!(record.date, "2024-01-15");
        assert_eq!(record.request_type, "Pothole");
    }

    #[test]
    fn unparseable_date_is_discarded_and_counted() {
        let csv_text = format!(
            "{HEADER}\
             not-a-date,47.61,-122.33,Pothole,SDOT,Open,Ballard\n\
             03/02/2025 11:00:00 PM,47.61,-122.33,Pothole,SDOT,Open,Ballard\n"
        );
        let outcome = normalize_str(&csv_text).unwrap();
        assert_eq!(outcome.document.data.len(), 1);
        assert_eq!(outcome.discarded_bad_date, 1);
        assert_eq!(outcome.document.data[0].date, "2025-03-02");
    }

    #[test]
    fn missing_categoricals_become_unknown() {
        let csv_text = format!(
            "{HEADER}\
             01/15/2024 08:30:00 AM,47.61,-122.33,,,Open,\n"
        );
        let outcome = normalize_str(&csv_text).unwrap();
        let record = &outcome.document.data[0];
        assert_eq!(record.request_type, UNKNOWN);
        assert_eq!(record.department, UNKNOWN);
        assert_eq!(record.community.as_deref(), Some(UNKNOWN));
        assert_eq!(record.status, "Open");
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let csv_text = format!(
            "{HEADER}\
             01/15/2024 08:30:00 AM,NaN,-122.33,Pothole,SDOT,Open,Ballard\n"
        );
        assert!(matches!(
            normalize_str(&csv_text),
            Err(PrepareError::NoRecords)
        ));
    }

    #[test]
    fn empty_survivor_set_is_an_error() {
        let csv_text = format!(
            "{HEADER}\
             06/01/2023 09:00:00 AM,47.62,-122.35,Noise,SPD,Closed,Queen Anne\n"
        );
        assert!(matches!(
            normalize_str(&csv_text),
            Err(PrepareError::NoRecords)
        ));
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv_text = "Created Date,Latitude\n01/15/2024 08:30:00 AM,47.61\n";
        assert!(matches!(
            normalize_str(csv_text),
            Err(PrepareError::MissingColumn { .. })
        ));
    }

    #[test]
    fn stats_are_idempotent_across_runs() {
        let csv_text = format!(
            "{HEADER}\
             01/15/2024 08:30:00 AM,47.61,-122.33,Pothole,SDOT,Open,Ballard\n\
             02/20/2024 02:15:00 PM,47.70,-122.40,Graffiti,SPU,Closed,Fremont\n\
             03/25/2025 10:45:00 AM,47.55,-122.28,Pothole,SDOT,Open,Delridge\n"
        );
        let a = serde_json::to_string(&normalize_str(&csv_text).unwrap().document).unwrap();
        let b = serde_json::to_string(&normalize_str(&csv_text).unwrap().document).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stats_cover_range_bounds_and_top_tables() {
        let csv_text = format!(
            "{HEADER}\
             01/15/2024 08:30:00 AM,47.61,-122.33,Pothole,SDOT,Open,Ballard\n\
             02/20/2024 02:15:00 PM,47.70,-122.40,Graffiti,SPU,Closed,Fremont\n\
             03/25/2025 10:45:00 AM,47.55,-122.28,Pothole,SDOT,Open,Delridge\n"
        );
        let stats = normalize_str(&csv_text).unwrap().document.stats;
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.date_range.start, "2024-01-15");
        assert_eq!(stats.date_range.end, "2025-03-25");

        let bounds = stats.bounds.unwrap();
        assert!((bounds.min_lat - 47.55).abs() < f64::EPSILON);
        assert!((bounds.max_lat - 47.70).abs() < f64::EPSILON);
        assert!((bounds.min_lon - -122.40).abs() < f64::EPSILON);
        assert!((bounds.max_lon - -122.28).abs() < f64::EPSILON);

        assert_eq!(stats.top_request_types[0].name, "Pothole");
        assert_eq!(stats.top_request_types[0].count, 2);
        assert_eq!(stats.top_departments[0].name, "SDOT");
    }

    #[test]
    fn run_sets_progress_total_and_writes_the_document() {
        let dir = std::env::temp_dir();
        let input = dir.join("request_map_prepare_run_test.csv");
        let output = dir.join("request_map_prepare_run_test.json");
        let csv_text = format!(
            "{HEADER}\
             01/15/2024 08:30:00 AM,47.61,-122.33,Pothole,SDOT,Open,Ballard\n\
             02/20/2024 02:15:00 PM,47.70,-122.40,Graffiti,SPU,Closed,Fremont\n\
             06/01/2023 09:00:00 AM,47.62,-122.35,Noise,SPD,Closed,Queen Anne\n"
        );
        std::fs::write(&input, &csv_text).unwrap();

        let progress = RecordingProgress::default();
        let outcome = run(&input, &output, &progress).unwrap();

        // Total is the data row count, known before normalization starts.
        assert_eq!(progress.total.load(Ordering::SeqCst), 3);
        assert_eq!(progress.steps.load(Ordering::SeqCst), 3);
        assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.document.data.len(), 2);

        let written: DatasetDocument =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, outcome.document);

        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
    }

    #[test]
    fn parses_am_pm_timestamps() {
        assert_eq!(
            parse_created_date("12/31/2024 11:59:59 PM"),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
        assert_eq!(
            parse_created_date("01/01/2024 12:00:00 AM"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert!(parse_created_date("2024-01-01 08:00:00").is_none());
        assert!(parse_created_date("").is_none());
    }
}
