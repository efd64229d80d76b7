//! The filter engine: predicate conjunction over the full dataset.

use request_map_analytics_models::FilterSelection;
use request_map_request_models::{RequestRecord, UNKNOWN};

/// Applies the selection to the full dataset and returns the matching
/// subset as a fresh, independent copy.
///
/// All predicates are ANDed: date within the inclusive bounds, and
/// department/status/type membership in their selected sets. The
/// community predicate carries the one non-obvious business rule: records
/// with the `"Unknown"` sentinel are exempt from exclusion, so requests
/// with missing neighborhood data never drop out of the KPI totals no
/// matter which neighborhoods are selected. This keeps the headline
/// counts consistent with what the map shows.
///
/// An unmatched selection yields an empty subset, which is not an error —
/// downstream consumers render zero-valued KPIs and empty charts.
#[must_use]
pub fn apply(records: &[RequestRecord], selection: &FilterSelection) -> Vec<RequestRecord> {
    records
        .iter()
        .filter(|r| r.date >= selection.start_date && r.date <= selection.end_date)
        .filter(|r| selection.departments.contains(&r.department))
        .filter(|r| selection.statuses.contains(&r.status))
        .filter(|r| selection.request_types.contains(&r.request_type))
        .filter(|r| r.community == UNKNOWN || selection.communities.contains(&r.community))
        .cloned()
        .collect()
}
