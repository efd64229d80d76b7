#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter selection and aggregate result types.
//!
//! These are the value objects exchanged between the UI/API layer and the
//! filter/aggregate engine: the per-interaction [`FilterSelection`], the
//! KPI block, and the time-series point.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Time-bucketing resolution for the trend series.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimeGranularity {
    /// One bucket per calendar date.
    Daily,
    /// One bucket per ISO week, anchored on Monday.
    Weekly,
    /// One bucket per calendar month, anchored on the first.
    Monthly,
}

impl TimeGranularity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Daily, Self::Weekly, Self::Monthly]
    }
}

/// The set of predicates selected in the UI for one render pass.
///
/// Constructed per interaction from current widget state and discarded
/// after producing the filtered subset. All predicates are conjoined; the
/// community set carries the one non-obvious rule (sentinel exemption),
/// applied by the filter engine rather than encoded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Inclusive lower date bound.
    pub start_date: NaiveDate,
    /// Inclusive upper date bound.
    pub end_date: NaiveDate,
    /// Accepted departments.
    pub departments: BTreeSet<String>,
    /// Accepted statuses.
    pub statuses: BTreeSet<String>,
    /// Accepted request types.
    pub request_types: BTreeSet<String>,
    /// Accepted communities. Records with the `"Unknown"` sentinel pass
    /// regardless of this set.
    pub communities: BTreeSet<String>,
}

/// The KPI block computed over a filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Size of the filtered subset.
    pub total: u64,
    /// Records whose status contains "closed" (case-insensitive).
    pub closed: u64,
    /// `total - closed`.
    pub open: u64,
    /// `closed / total * 100`, or `0.0` when the subset is empty.
    pub closed_pct: f64,
    /// Distinct request types in the subset.
    pub unique_types: u64,
    /// Distinct departments in the subset.
    pub unique_departments: u64,
}

/// One bucket of the trend series: an anchor date and a record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Bucket anchor: the date itself (daily), the Monday of the ISO week
    /// (weekly), or the first of the month (monthly).
    pub date: NaiveDate,
    /// Number of requests in the bucket.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!(
            TimeGranularity::from_str("weekly").unwrap(),
            TimeGranularity::Weekly
        );
        assert_eq!(
            TimeGranularity::from_str("Monthly").unwrap(),
            TimeGranularity::Monthly
        );
        assert!(TimeGranularity::from_str("hourly").is_err());
    }

    #[test]
    fn granularity_serializes_lowercase() {
        let json = serde_json::to_string(&TimeGranularity::Daily).unwrap();
        assert_eq!(json, "\"daily\"");
    }
}
