#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the request map dashboard.
//!
//! Serves the aggregate REST API (`/api/*`), the injected dashboard page
//! (`/dashboard`), and static files from the working directory so the
//! standalone visualization template can fetch the dataset document
//! directly. The dataset is loaded once at startup and shared read-only
//! across workers.

pub mod handlers;

use std::sync::Arc;

use actix_files::Files;
use actix_web::web;
use request_map_dataset::Dataset;

/// Shared application state.
pub struct AppState {
    /// The loaded dataset.
    pub dataset: Arc<Dataset>,
}

/// Registers all routes on an Actix-Web app.
///
/// Static file serving is registered last so it cannot shadow the API
/// scope or the dashboard route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/filters", web::get().to(handlers::filters))
            .route("/summary", web::get().to(handlers::summary))
            .route("/trend", web::get().to(handlers::trend)),
    )
    .route("/dashboard", web::get().to(handlers::dashboard))
    .service(Files::new("/", "."));
}

/// URL of the injected dashboard page for a bind address. The binary
/// opens this in the default browser at startup (best effort).
#[must_use]
pub fn dashboard_url(bind_addr: &str, port: u16) -> String {
    format!("http://{bind_addr}:{port}/dashboard")
}
