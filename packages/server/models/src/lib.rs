#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the request map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the dataset record types to allow independent evolution of the
//! API contract. Field names stay `snake_case` to match the dataset
//! document the bundled map page already consumes.

use chrono::NaiveDate;
use request_map_analytics_models::{Kpis, TimeGranularity, TimeSeriesPoint};
use request_map_request_models::FrequencyEntry;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Option lists for the filter widgets, from `GET /api/filters`.
///
/// Communities exclude the `"Unknown"` sentinel: it is a data artifact,
/// not a selectable area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct departments, sorted.
    pub departments: Vec<String>,
    /// Distinct statuses, sorted.
    pub statuses: Vec<String>,
    /// Distinct request types, sorted.
    pub request_types: Vec<String>,
    /// Distinct communities, sorted, sentinel removed.
    pub communities: Vec<String>,
    /// Earliest request date in the dataset.
    pub min_date: NaiveDate,
    /// Latest request date in the dataset.
    pub max_date: NaiveDate,
}

/// Filter query parameters shared by the summary, trend, and dashboard
/// endpoints.
///
/// Set-valued parameters are comma-separated; an omitted parameter means
/// "all values". Dates are `YYYY-MM-DD`; omitted bounds default to the
/// dataset's full date range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQueryParams {
    /// Inclusive lower date bound.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end_date: Option<NaiveDate>,
    /// Comma-separated list of departments to include.
    pub departments: Option<String>,
    /// Comma-separated list of statuses to include.
    pub statuses: Option<String>,
    /// Comma-separated list of request types to include.
    pub types: Option<String>,
    /// Comma-separated list of communities to include.
    pub communities: Option<String>,
}

/// Query parameters for the trend endpoint: the shared filter set plus
/// the bucketing resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendQueryParams {
    /// Bucketing resolution; defaults to daily when omitted.
    pub granularity: Option<TimeGranularity>,
    /// Inclusive lower date bound.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end_date: Option<NaiveDate>,
    /// Comma-separated list of departments to include.
    pub departments: Option<String>,
    /// Comma-separated list of statuses to include.
    pub statuses: Option<String>,
    /// Comma-separated list of request types to include.
    pub types: Option<String>,
    /// Comma-separated list of communities to include.
    pub communities: Option<String>,
}

impl TrendQueryParams {
    /// The shared filter portion of these parameters.
    #[must_use]
    pub fn filters(&self) -> FilterQueryParams {
        FilterQueryParams {
            start_date: self.start_date,
            end_date: self.end_date,
            departments: self.departments.clone(),
            statuses: self.statuses.clone(),
            types: self.types.clone(),
            communities: self.communities.clone(),
        }
    }
}

/// Response from `GET /api/summary`: the KPI block plus the chart
/// tables, all computed over the filtered subset.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    /// Headline counters.
    pub kpis: Kpis,
    /// Full status breakdown, descending by count.
    pub status_breakdown: Vec<FrequencyEntry>,
    /// Top 10 departments.
    pub top_departments: Vec<FrequencyEntry>,
    /// Top 15 request types.
    pub top_request_types: Vec<FrequencyEntry>,
}

/// Response from `GET /api/trend`.
#[derive(Debug, Clone, Serialize)]
pub struct TrendResponse {
    /// The resolution the series was bucketed at.
    pub granularity: TimeGranularity,
    /// Buckets ascending by anchor date; gaps are not zero-filled.
    pub points: Vec<TimeSeriesPoint>,
}
