//! Wire types for FRED API responses
//!
//! The API serializes everything as JSON with string-typed observation
//! values; the missing-value sentinel is a literal `"."`.

use serde::{Deserialize, Serialize};

/// One release (a named collection of series)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub id: i64,
    pub name: String,
}

/// Envelope for the release metadata endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseResponse {
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// One series belonging to a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,
}

/// One page of the release series listing
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesPage {
    /// Total matching series reported by the API
    #[serde(default)]
    pub count: i64,

    /// The page of series; the API spells the field "seriess"
    #[serde(rename = "seriess", default)]
    pub series: Vec<Series>,
}

/// One raw observation as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date, "YYYY-MM-DD"
    pub date: String,

    /// Observation value; "." marks a missing value
    pub value: String,
}

/// One page of a series' observations
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationPage {
    /// Total observations reported by the API
    #[serde(default)]
    pub count: i64,

    #[serde(default)]
    pub observations: Vec<Observation>,
}
