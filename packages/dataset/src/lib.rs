#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The in-memory request dataset.
//!
//! [`Dataset::load`] reads the JSON document produced by the normalizer
//! exactly once; the resulting value is immutable and meant to be
//! constructed at process start and shared by handle (e.g. `Arc`) for the
//! process lifetime. Every filter/aggregate pass reads from it without
//! locking — there is no mutation anywhere downstream.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use request_map_request_models::{DatasetDocument, RequestRecord, SummaryStats, UNKNOWN};
use thiserror::Error;

/// Errors that can occur while loading the dataset document.
///
/// All of them are fatal startup conditions: the caller must halt rather
/// than proceed with a partial UI.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Document missing or unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document structure could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but contains no records.
    #[error("dataset document contains no records")]
    Empty,

    /// A record carries a date string that is not `YYYY-MM-DD`.
    #[error("invalid date '{value}' in dataset document")]
    InvalidDate {
        /// The malformed date string.
        value: String,
    },
}

/// The full normalized dataset, loaded once per process.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<RequestRecord>,
    stats: SummaryStats,
}

impl Dataset {
    /// Loads the dataset document from `path`.
    ///
    /// Parses the `data` array into typed records, parsing each date
    /// string and deriving the calendar columns (year, month, ISO week,
    /// weekday name). Only `community` is re-defaulted to `"Unknown"`
    /// here — type and department were already defaulted by the
    /// normalizer, but older documents may carry null communities.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file is missing or unparseable, a
    /// date string is malformed, or the document holds no records.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        log::info!("Loading dataset from {}...", path.display());

        let reader = BufReader::new(File::open(path)?);
        let document: DatasetDocument = serde_json::from_reader(reader)?;

        Self::from_document(document)
    }

    /// Builds the dataset from an already-parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Empty`] for a record-less document and
    /// [`DatasetError::InvalidDate`] for malformed date strings.
    pub fn from_document(document: DatasetDocument) -> Result<Self, DatasetError> {
        if document.data.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut records = Vec::with_capacity(document.data.len());
        for raw in document.data {
            let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").map_err(|_| {
                DatasetError::InvalidDate {
                    value: raw.date.clone(),
                }
            })?;
            let community = raw
                .community
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string());

            records.push(RequestRecord::new(
                raw.lat,
                raw.lon,
                raw.request_type,
                raw.department,
                date,
                raw.status,
                community,
            ));
        }

        log::info!("Loaded {} customer service requests", records.len());

        Ok(Self {
            records,
            stats: document.stats,
        })
    }

    /// All records, in document order.
    #[must_use]
    pub fn records(&self) -> &[RequestRecord] {
        &self.records
    }

    /// The precomputed full-dataset summary statistics.
    #[must_use]
    pub const fn stats(&self) -> &SummaryStats {
        &self.stats
    }

    /// Earliest and latest request date in the dataset.
    ///
    /// # Panics
    ///
    /// Never panics: construction guarantees at least one record.
    #[must_use]
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let mut min = self.records[0].date;
        let mut max = self.records[0].date;
        for record in &self.records {
            min = min.min(record.date);
            max = max.max(record.date);
        }
        (min, max)
    }

    /// Distinct departments, sorted.
    #[must_use]
    pub fn departments(&self) -> Vec<String> {
        self.distinct(|r| &r.department)
    }

    /// Distinct statuses, sorted.
    #[must_use]
    pub fn statuses(&self) -> Vec<String> {
        self.distinct(|r| &r.status)
    }

    /// Distinct request types, sorted.
    #[must_use]
    pub fn request_types(&self) -> Vec<String> {
        self.distinct(|r| &r.request_type)
    }

    /// Distinct communities, sorted, excluding the `"Unknown"` sentinel —
    /// the sentinel is never offered as a widget option because the
    /// filter engine exempts it from exclusion anyway.
    #[must_use]
    pub fn communities(&self) -> Vec<String> {
        self.distinct(|r| &r.community)
            .into_iter()
            .filter(|c| c != UNKNOWN)
            .collect()
    }

    fn distinct(&self, field: fn(&RequestRecord) -> &String) -> Vec<String> {
        self.records
            .iter()
            .map(field)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }
}
