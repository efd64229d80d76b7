#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds the map visualization payload and injects it into the
//! bundled HTML template.
//!
//! The template fetches the dataset document over HTTP when served
//! standalone; the injector replaces that exact fetch expression with an
//! inlined `Promise.resolve(...)` carrying the filtered payload. The
//! placeholder is an explicit contract: if the template no longer
//! contains the literal, injection fails loudly instead of silently
//! serving a page that fetches the unfiltered dataset.

use chrono::NaiveDate;
use request_map_analytics::{top_departments, top_request_types};
use request_map_request_models::{DateRange, RawRecord, RequestRecord, SummaryStats};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The bundled visualization page, carrying [`PLACEHOLDER`].
pub const TEMPLATE: &str = include_str!("../assets/visualization.html");

/// The exact fetch expression the injector replaces. The template and
/// this constant must change together.
pub const PLACEHOLDER: &str =
    "fetch('seattle_requests_2024_2025.json').then((response) => response.json())";

/// Errors that can occur while building or injecting the map payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Payload serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The template does not contain [`PLACEHOLDER`] verbatim.
    #[error("visualization template does not contain the data placeholder")]
    PlaceholderNotFound,
}

/// The JSON document handed to the map page: the filtered records plus
/// summary statistics over the filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPayload {
    /// Filtered records in wire form.
    pub data: Vec<RawRecord>,
    /// Statistics over the filtered subset (no bounds — the map derives
    /// its own viewport).
    pub stats: SummaryStats,
}

/// Builds the map payload for a filtered subset: wire-form records plus
/// top-10 request types and top-5 departments.
///
/// An empty subset is valid and produces an empty date range — the page
/// renders a zero-count panel rather than erroring.
#[must_use]
pub fn build_payload(subset: &[RequestRecord]) -> MapPayload {
    let data: Vec<RawRecord> = subset
        .iter()
        .map(|r| RawRecord {
            lat: r.lat,
            lon: r.lon,
            request_type: r.request_type.clone(),
            department: r.department.clone(),
            date: r.date.format("%Y-%m-%d").to_string(),
            status: r.status.clone(),
            community: Some(r.community.clone()),
        })
        .collect();

    let mut span: Option<(NaiveDate, NaiveDate)> = None;
    for record in subset {
        span = Some(span.map_or((record.date, record.date), |(min, max)| {
            (min.min(record.date), max.max(record.date))
        }));
    }
    let date_range = span.map_or_else(
        || DateRange {
            start: String::new(),
            end: String::new(),
        },
        |(min, max)| DateRange {
            start: min.format("%Y-%m-%d").to_string(),
            end: max.format("%Y-%m-%d").to_string(),
        },
    );

    MapPayload {
        stats: SummaryStats {
            total_records: data.len() as u64,
            date_range,
            top_request_types: top_request_types(subset, 10),
            top_departments: top_departments(subset, 5),
            bounds: None,
        },
        data,
    }
}

/// Replaces the template's fetch expression with the inlined payload.
///
/// # Errors
///
/// Returns [`PayloadError::PlaceholderNotFound`] if the template does not
/// contain [`PLACEHOLDER`], or [`PayloadError::Json`] if the payload
/// cannot be serialized.
pub fn inject(template: &str, payload: &MapPayload) -> Result<String, PayloadError> {
    if !template.contains(PLACEHOLDER) {
        return Err(PayloadError::PlaceholderNotFound);
    }
    let json = serde_json::to_string(payload)?;
    Ok(template.replace(PLACEHOLDER, &format!("Promise.resolve({json})")))
}

/// Builds the payload for `subset` and injects it into the bundled
/// template, yielding the final dashboard page.
///
/// # Errors
///
/// Returns [`PayloadError`] if serialization fails. The bundled template
/// always carries the placeholder.
pub fn render_map_page(subset: &[RequestRecord]) -> Result<String, PayloadError> {
    inject(TEMPLATE, &build_payload(subset))
}
