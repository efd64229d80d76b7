//! Aggregation over a filtered subset: KPIs, the time-bucketed trend
//! series, and top-N frequency tables.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate, Weekday};
use request_map_analytics_models::{Kpis, TimeGranularity, TimeSeriesPoint};
use request_map_request_models::{FrequencyEntry, RequestRecord, top_n_values};

/// Computes the KPI block for a subset.
///
/// The closed percentage is defined as `0.0` for an empty subset rather
/// than dividing by zero.
#[must_use]
pub fn kpis(subset: &[RequestRecord]) -> Kpis {
    let total = subset.len() as u64;
    let closed = subset.iter().filter(|r| r.is_closed()).count() as u64;

    #[allow(clippy::cast_precision_loss)]
    let closed_pct = if total > 0 {
        closed as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    Kpis {
        total,
        closed,
        open: total - closed,
        closed_pct,
        unique_types: distinct_count(subset, |r| r.request_type.as_str()),
        unique_departments: distinct_count(subset, |r| r.department.as_str()),
    }
}

fn distinct_count(subset: &[RequestRecord], field: fn(&RequestRecord) -> &str) -> u64 {
    subset
        .iter()
        .map(field)
        .collect::<std::collections::BTreeSet<_>>()
        .len() as u64
}

/// Buckets the subset into a trend series at the given granularity.
///
/// Bucket anchors: the date itself (daily), the Monday of the ISO week
/// (weekly), or the first of the month (monthly). The series is ordered
/// ascending by anchor; periods with zero requests do NOT appear — a
/// range spanning inactive weeks yields a shorter series, not a
/// zero-padded one.
#[must_use]
pub fn time_series(subset: &[RequestRecord], granularity: TimeGranularity) -> Vec<TimeSeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for record in subset {
        let anchor = match granularity {
            TimeGranularity::Daily => record.date,
            TimeGranularity::Weekly => {
                let iso = record.date.iso_week();
                // The ISO year differs from the calendar year around new
                // year; keying on it keeps each week in one bucket.
                NaiveDate::from_isoywd_opt(iso.year(), iso.week(), Weekday::Mon)
                    .unwrap_or(record.date)
            }
            TimeGranularity::Monthly => {
                NaiveDate::from_ymd_opt(record.year, record.month, 1).unwrap_or(record.date)
            }
        };
        *buckets.entry(anchor).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(date, count)| TimeSeriesPoint { date, count })
        .collect()
}

/// Builds a top-N frequency table over one categorical field.
///
/// Sorted descending by count; ties keep first-encountered order, so the
/// table is stable across runs for identical input order.
#[must_use]
pub fn top_n(
    subset: &[RequestRecord],
    field: fn(&RequestRecord) -> &str,
    n: usize,
) -> Vec<FrequencyEntry> {
    top_n_values(subset.iter().map(field), n)
}

/// Top-N request types (10 for the map payload and headline display, 15
/// for the dedicated type-analysis chart).
#[must_use]
pub fn top_request_types(subset: &[RequestRecord], n: usize) -> Vec<FrequencyEntry> {
    top_n(subset, |r| r.request_type.as_str(), n)
}

/// Top-N departments (5 for the map payload, 10 for the bar chart).
#[must_use]
pub fn top_departments(subset: &[RequestRecord], n: usize) -> Vec<FrequencyEntry> {
    top_n(subset, |r| r.department.as_str(), n)
}

/// Status breakdown for the distribution chart: every status with its
/// count, descending.
#[must_use]
pub fn status_breakdown(subset: &[RequestRecord]) -> Vec<FrequencyEntry> {
    top_n(subset, |r| r.status.as_str(), usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_on(date: (i32, u32, u32)) -> RequestRecord {
        record(date, "Pothole", "SDOT", "Open")
    }

    fn record(
        date: (i32, u32, u32),
        request_type: &str,
        department: &str,
        status: &str,
    ) -> RequestRecord {
        RequestRecord::new(
            47.6,
            -122.3,
            request_type.into(),
            department.into(),
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            status.into(),
            "Ballard".into(),
        )
    }

    #[test]
    fn empty_subset_yields_zero_kpis_without_panicking() {
        let k = kpis(&[]);
        assert_eq!(k.total, 0);
        assert_eq!(k.closed, 0);
        assert_eq!(k.open, 0);
        assert!((k.closed_pct - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn closed_plus_open_equals_total() {
        let subset = vec![
            record((2024, 1, 1), "Pothole", "SDOT", "Closed"),
            record((2024, 1, 2), "Pothole", "SDOT", "Closed - Duplicate (complete)"),
            record((2024, 1, 3), "Graffiti", "SPU", "Open - Assigned"),
        ];
        let k = kpis(&subset);
        assert_eq!(k.total, 3);
        assert_eq!(k.closed, 2);
        assert_eq!(k.open, 1);
        assert_eq!(k.closed + k.open, k.total);
        assert!((k.closed_pct - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn distinct_counts_cover_types_and_departments() {
        let subset = vec![
            record((2024, 1, 1), "Pothole", "SDOT", "Open"),
            record((2024, 1, 2), "Pothole", "SPU", "Open"),
            record((2024, 1, 3), "Graffiti", "SPU", "Open"),
        ];
        let k = kpis(&subset);
        assert_eq!(k.unique_types, 2);
        assert_eq!(k.unique_departments, 2);
    }

    #[test]
    fn weekly_series_buckets_distinct_iso_weeks() {
        // Three records in three distinct ISO weeks.
        let subset = vec![
            record_on((2024, 1, 1)),
            record_on((2024, 1, 8)),
            record_on((2024, 1, 15)),
        ];
        let series = time_series(&subset, TimeGranularity::Weekly);
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|p| p.count == 1));
        // Anchors are the Mondays themselves here.
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series[2].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn monthly_series_collapses_to_one_bucket() {
        let subset = vec![
            record_on((2024, 1, 1)),
            record_on((2024, 1, 8)),
            record_on((2024, 1, 15)),
        ];
        let series = time_series(&subset, TimeGranularity::Monthly);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].count, 3);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn daily_series_is_sorted_ascending_with_no_gap_fill() {
        let subset = vec![
            record_on((2024, 2, 10)),
            record_on((2024, 2, 1)),
            record_on((2024, 2, 10)),
        ];
        let series = time_series(&subset, TimeGranularity::Daily);
        // The 9 empty days in between do not appear.
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(series[0].count, 1);
        assert_eq!(series[1].count, 2);
    }

    #[test]
    fn weekly_anchor_uses_iso_year_across_new_year() {
        // 2024-12-30 and 2025-01-02 are both in ISO week 1 of 2025,
        // anchored on Monday 2024-12-30.
        let subset = vec![record_on((2024, 12, 30)), record_on((2025, 1, 2))];
        let series = time_series(&subset, TimeGranularity::Weekly);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].count, 2);
        assert_eq!(
            series[0].date,
            NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
        );
    }

    #[test]
    fn empty_subset_yields_empty_series_at_every_granularity() {
        for &granularity in TimeGranularity::all() {
            assert!(time_series(&[], granularity).is_empty());
        }
    }

    #[test]
    fn top_n_breaks_ties_by_first_encounter() {
        // A and B both have 5, A encountered first; C has 3.
        let mut subset = Vec::new();
        subset.push(record((2024, 1, 1), "A", "D", "Open"));
        for _ in 0..4 {
            subset.push(record((2024, 1, 2), "B", "D", "Open"));
        }
        for _ in 0..4 {
            subset.push(record((2024, 1, 3), "A", "D", "Open"));
        }
        subset.push(record((2024, 1, 4), "B", "D", "Open"));
        for _ in 0..3 {
            subset.push(record((2024, 1, 5), "C", "D", "Open"));
        }

        let table = top_request_types(&subset, 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].name, "A");
        assert_eq!(table[0].count, 5);
        assert_eq!(table[1].name, "B");
        assert_eq!(table[1].count, 5);
    }

    #[test]
    fn top_n_truncates_to_n() {
        let subset = vec![
            record((2024, 1, 1), "A", "D", "Open"),
            record((2024, 1, 1), "B", "D", "Open"),
            record((2024, 1, 1), "C", "D", "Open"),
        ];
        assert_eq!(top_request_types(&subset, 2).len(), 2);
        assert_eq!(top_departments(&subset, 5).len(), 1);
    }

    #[test]
    fn status_breakdown_counts_every_status() {
        let subset = vec![
            record((2024, 1, 1), "A", "D", "Closed"),
            record((2024, 1, 1), "A", "D", "Closed"),
            record((2024, 1, 1), "A", "D", "Open - Assigned"),
        ];
        let breakdown = status_breakdown(&subset);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].name, "Closed");
        assert_eq!(breakdown[0].count, 2);
    }
}
