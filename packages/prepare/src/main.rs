#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the dataset preparation tool.

use std::path::PathBuf;

use clap::Parser;
use request_map_cli_utils::IndicatifProgress;
use request_map_prepare::DEFAULT_OUTPUT;

#[derive(Parser)]
#[command(
    name = "request_map_prepare",
    about = "Normalize the raw customer-service-request CSV export into the dashboard dataset"
)]
struct Cli {
    /// Path to the raw CSV export.
    #[arg(long, default_value = "Customer_Service_Requests_20251106.csv")]
    input: PathBuf,

    /// Path of the JSON dataset document to write.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = request_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let progress = IndicatifProgress::records_bar(&multi, "Normalizing");
    request_map_prepare::run(&cli.input, &cli.output, progress.as_ref())?;

    Ok(())
}
