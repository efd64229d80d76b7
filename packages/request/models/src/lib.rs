#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core record and dataset document types for the request map.
//!
//! This crate defines the normalized customer-service request record shared
//! across the pipeline, plus the wire types for the intermediate JSON
//! document produced by the normalizer and consumed by the dashboard
//! loader and the map payload builder.

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sentinel substituted for missing categorical values.
pub const UNKNOWN: &str = "Unknown";

/// Returns `true` if the status counts as closed.
///
/// Matching is a case-insensitive substring test against `"closed"`, not
/// equality — statuses like `"Closed - Duplicate"` must count as closed.
#[must_use]
pub fn is_closed_status(status: &str) -> bool {
    status.to_ascii_lowercase().contains("closed")
}

/// One normalized customer-service request, with calendar fields derived
/// from the request date at load time.
///
/// Invariants: `lat`/`lon` are finite (enforced once, at normalization);
/// the categorical fields are never empty — missing values were replaced
/// with [`UNKNOWN`] before this type is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Latitude of the request location.
    pub lat: f64,
    /// Longitude of the request location.
    pub lon: f64,
    /// Request category (e.g. "Abandoned Vehicle").
    pub request_type: String,
    /// Owning city department.
    pub department: String,
    /// Date the request was created (no time component).
    pub date: NaiveDate,
    /// Free-form status string.
    pub status: String,
    /// Neighborhood / community reporting area.
    pub community: String,
    /// Calendar year of `date`.
    pub year: i32,
    /// Calendar month of `date` (1-12).
    pub month: u32,
    /// ISO week number of `date` (1-53).
    pub iso_week: u32,
    /// English weekday name of `date` (e.g. "Monday").
    pub day_of_week: String,
}

impl RequestRecord {
    /// Builds a record from normalized fields, deriving the calendar
    /// columns from `date`.
    #[must_use]
    pub fn new(
        lat: f64,
        lon: f64,
        request_type: String,
        department: String,
        date: NaiveDate,
        status: String,
        community: String,
    ) -> Self {
        Self {
            lat,
            lon,
            request_type,
            department,
            year: date.year(),
            month: date.month(),
            iso_week: date.iso_week().week(),
            day_of_week: date.format("%A").to_string(),
            date,
            status,
            community,
        }
    }

    /// Returns `true` if this request counts as closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        is_closed_status(&self.status)
    }
}

/// One record as it appears in the intermediate JSON document.
///
/// The `date` stays a `YYYY-MM-DD` string on the wire; the loader parses
/// it into a [`NaiveDate`] and derives the calendar columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Request category.
    #[serde(rename = "type")]
    pub request_type: String,
    /// Owning city department.
    pub department: String,
    /// ISO `YYYY-MM-DD` date string.
    pub date: String,
    /// Free-form status string.
    pub status: String,
    /// Neighborhood name, possibly absent in older documents.
    pub community: Option<String>,
}

/// An entry in a top-N frequency table: a categorical value and how many
/// filtered records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    /// The categorical value.
    pub name: String,
    /// Number of records with this value.
    pub count: u64,
}

/// Builds a top-N frequency table over a stream of categorical values.
///
/// Sorted descending by count; ties keep first-encountered order, so the
/// table is stable across runs for identical input order. Used both by
/// the normalizer (full-dataset stats) and the aggregator (per-render
/// stats), which must rank identically.
#[must_use]
pub fn top_n_values<'a, I>(values: I, n: usize) -> Vec<FrequencyEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: std::collections::BTreeMap<&str, (u64, usize)> =
        std::collections::BTreeMap::new();

    for (idx, value) in values.into_iter().enumerate() {
        counts
            .entry(value)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, idx));
    }

    let mut entries: Vec<(&str, u64, usize)> = counts
        .into_iter()
        .map(|(name, (count, first_seen))| (name, count, first_seen))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    entries.truncate(n);

    entries
        .into_iter()
        .map(|(name, count, _)| FrequencyEntry {
            name: name.to_string(),
            count,
        })
        .collect()
}

/// Inclusive date range of a record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest date, `YYYY-MM-DD`.
    pub start: String,
    /// Latest date, `YYYY-MM-DD`.
    pub end: String,
}

/// Geographic bounding box of a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Southernmost latitude.
    pub min_lat: f64,
    /// Northernmost latitude.
    pub max_lat: f64,
    /// Westernmost longitude.
    pub min_lon: f64,
    /// Easternmost longitude.
    pub max_lon: f64,
}

/// Precomputed summary statistics over a record set.
///
/// Top-N tables serialize as ordered arrays so the descending-count order
/// (stable on ties) survives serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of records in the set.
    pub total_records: u64,
    /// Earliest and latest request date.
    pub date_range: DateRange,
    /// Top 10 request types by count.
    pub top_request_types: Vec<FrequencyEntry>,
    /// Top 5 departments by count.
    pub top_departments: Vec<FrequencyEntry>,
    /// Geographic bounding box, absent in filtered map payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<GeoBounds>,
}

/// The intermediate JSON document: the normalized records plus summary
/// statistics over the full set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDocument {
    /// Normalized records.
    pub data: Vec<RawRecord>,
    /// Summary statistics over `data`.
    pub stats: SummaryStats,
}
