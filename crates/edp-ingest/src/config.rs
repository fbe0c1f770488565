//! Configuration for FRED ingestion
//!
//! All settings are environment-driven so credentials stay out of source.

use edp_common::{EdpError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Ingestion Constants
// ============================================================================

/// Default FRED API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Compiled-in release id used when no runtime parameter is supplied.
pub const DEFAULT_RELEASE_ID: i64 = 10;

/// Default page size for paginated requests.
///
/// The series-listing endpoint rejects limits above [`MAX_PAGE_LIMIT`] with a
/// 400 response, so the configured limit is clamped to the cap.
pub const DEFAULT_PAGE_LIMIT: i64 = 1000;

/// Documented per-request cap on the series-listing page size.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Default per-request network timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// FRED API base URL
    pub base_url: String,

    /// API-key pool, one worker per key during observation fetch.
    /// Read-only for the duration of a run.
    pub api_keys: Vec<String>,

    /// Page size for paginated requests, clamped to the API cap
    pub page_limit: i64,

    /// Per-request network timeout in seconds
    pub request_timeout_secs: u64,

    /// Directory for the CSV sink
    pub data_dir: PathBuf,
}

impl IngestConfig {
    /// Create a config with the given key pool and defaults for the rest
    pub fn new(api_keys: Vec<String>) -> Result<Self> {
        let config = Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_keys,
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: PathBuf::from("./data"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `EDP_FRED_API_KEYS`: comma-separated API keys (required)
    /// - `EDP_FRED_BASE_URL`: API base URL
    /// - `EDP_FRED_PAGE_LIMIT`: page size for paginated requests
    /// - `EDP_REQUEST_TIMEOUT_SECS`: per-request timeout
    /// - `EDP_DATA_DIR`: directory for the CSV sink
    pub fn from_env() -> Result<Self> {
        let api_keys = std::env::var("EDP_FRED_API_KEYS")
            .map_err(|_| {
                EdpError::config("EDP_FRED_API_KEYS is not set; provide a comma-separated key pool")
            })?
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let mut config = Self::new(api_keys)?;

        if let Ok(url) = std::env::var("EDP_FRED_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(limit) = std::env::var("EDP_FRED_PAGE_LIMIT") {
            config.page_limit = limit
                .parse()
                .map_err(|_| EdpError::config(format!("invalid EDP_FRED_PAGE_LIMIT: {limit}")))?;
        }

        if let Ok(timeout) = std::env::var("EDP_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = timeout.parse().map_err(|_| {
                EdpError::config(format!("invalid EDP_REQUEST_TIMEOUT_SECS: {timeout}"))
            })?;
        }

        if let Ok(dir) = std::env::var("EDP_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    /// Page limit clamped to the documented API cap
    pub fn page_limit(&self) -> i64 {
        self.page_limit.clamp(1, MAX_PAGE_LIMIT)
    }

    fn validate(&self) -> Result<()> {
        if self.api_keys.is_empty() {
            return Err(EdpError::config("API-key pool is empty"));
        }
        Ok(())
    }
}
