#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server binary for the request map dashboard.

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use request_map_dataset::Dataset;
use request_map_server::{AppState, configure, dashboard_url};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let dataset_path = std::env::var("DATASET_PATH")
        .unwrap_or_else(|_| "seattle_requests_2024_2025.json".to_string());

    log::info!("Loading dataset from {dataset_path}...");
    let dataset = Dataset::load(Path::new(&dataset_path))
        .expect("Failed to load dataset; run request_map_prepare first");
    log::info!("Loaded {} records", dataset.records().len());

    let state = web::Data::new(AppState {
        dataset: Arc::new(dataset),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    log::info!("Starting server on {bind_addr}:{port}");

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            // The dataset is regenerated in place; never let a browser
            // cache a stale copy.
            .wrap(middleware::DefaultHeaders::new().add((
                "Cache-Control",
                "no-store, no-cache, must-revalidate",
            )))
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr.as_str(), port))?;

    let url = dashboard_url(&bind_addr, port);
    log::info!("Dashboard available at {url}");
    if let Err(e) = open::that(&url) {
        log::warn!("Failed to open browser: {e}. Open {url} manually");
    }

    server.run().await
}
