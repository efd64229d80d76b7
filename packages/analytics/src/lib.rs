#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter and aggregate engine over the request dataset.
//!
//! Everything here is a pure function over an in-memory record slice:
//! the dataset is loaded once, is immutable, and is small enough that
//! recomputing on every interaction is cheaper than any caching scheme.

pub mod aggregate;
pub mod filter;

pub use aggregate::{kpis, status_breakdown, time_series, top_departments, top_request_types};
pub use filter::apply;
