//! FRED REST API client
//!
//! Paginated access to the release, series, and observation endpoints.

pub mod client;
pub mod types;

pub use client::FredClient;
pub use types::{Observation, Release, Series};
