//! HTTP handler functions for the request map API.

use std::collections::BTreeSet;

use actix_web::{HttpResponse, web};
use request_map_analytics::{
    apply, kpis, status_breakdown, time_series, top_departments, top_request_types,
};
use request_map_analytics_models::{FilterSelection, TimeGranularity};
use request_map_dataset::Dataset;
use request_map_server_models::{
    ApiHealth, FilterOptions, FilterQueryParams, SummaryResponse, TrendQueryParams, TrendResponse,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/filters`
///
/// Returns the option lists for the filter widgets: distinct categorical
/// values plus the dataset's date range.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    let dataset = &state.dataset;
    let (min_date, max_date) = dataset.date_range();

    HttpResponse::Ok().json(FilterOptions {
        departments: dataset.departments(),
        statuses: dataset.statuses(),
        request_types: dataset.request_types(),
        communities: dataset.communities(),
        min_date,
        max_date,
    })
}

/// `GET /api/summary`
///
/// Computes the KPI block and chart tables over the filtered subset.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let selection = selection(&state.dataset, &params);
    let subset = apply(state.dataset.records(), &selection);

    HttpResponse::Ok().json(SummaryResponse {
        kpis: kpis(&subset),
        status_breakdown: status_breakdown(&subset),
        top_departments: top_departments(&subset, 10),
        top_request_types: top_request_types(&subset, 15),
    })
}

/// `GET /api/trend`
///
/// Computes the time series over the filtered subset at the requested
/// granularity (daily when omitted).
pub async fn trend(
    state: web::Data<AppState>,
    params: web::Query<TrendQueryParams>,
) -> HttpResponse {
    let granularity = params.granularity.unwrap_or(TimeGranularity::Daily);
    let selection = selection(&state.dataset, &params.filters());
    let subset = apply(state.dataset.records(), &selection);

    HttpResponse::Ok().json(TrendResponse {
        granularity,
        points: time_series(&subset, granularity),
    })
}

/// `GET /dashboard`
///
/// Renders the visualization page with the filtered map payload inlined.
pub async fn dashboard(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let selection = selection(&state.dataset, &params);
    let subset = apply(state.dataset.records(), &selection);

    match request_map_payload::render_map_page(&subset) {
        Ok(page) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(page),
        Err(e) => {
            log::error!("Failed to render dashboard: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to render dashboard"
            }))
        }
    }
}

/// Resolves query parameters against the dataset: omitted date bounds
/// default to the dataset's full range, omitted sets to every distinct
/// value.
fn selection(dataset: &Dataset, params: &FilterQueryParams) -> FilterSelection {
    let (min_date, max_date) = dataset.date_range();

    FilterSelection {
        start_date: params.start_date.unwrap_or(min_date),
        end_date: params.end_date.unwrap_or(max_date),
        departments: comma_set(params.departments.as_deref())
            .unwrap_or_else(|| dataset.departments().into_iter().collect()),
        statuses: comma_set(params.statuses.as_deref())
            .unwrap_or_else(|| dataset.statuses().into_iter().collect()),
        request_types: comma_set(params.types.as_deref())
            .unwrap_or_else(|| dataset.request_types().into_iter().collect()),
        communities: comma_set(params.communities.as_deref())
            .unwrap_or_else(|| dataset.communities().into_iter().collect()),
    }
}

/// Splits a comma-separated parameter into a set, trimming whitespace
/// and dropping empty segments. `None` means the parameter was omitted.
fn comma_set(raw: Option<&str>) -> Option<BTreeSet<String>> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
