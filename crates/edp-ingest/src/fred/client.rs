//! HTTP client for the FRED REST API
//!
//! All list endpoints are paginated with explicit `limit`/`offset` query
//! parameters. The offset advances by exactly the number of items consumed;
//! a page shorter than the limit (or empty) terminates the loop. Enumeration
//! is bounded and in-memory, with no pagination checkpointing across runs.

use crate::fred::types::{Observation, ObservationPage, Release, ReleaseResponse, Series, SeriesPage};
use edp_common::{EdpError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Client for the FRED REST API.
///
/// Holds one shared `reqwest::Client`; the API key is passed per call so the
/// same client can serve every credential in the pool.
#[derive(Debug, Clone)]
pub struct FredClient {
    http: Client,
    base_url: String,
    page_limit: i64,
}

impl FredClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>, page_limit: i64, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EdpError::network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            page_limit,
        })
    }

    /// Fetch release metadata (the human-readable release name)
    pub async fn get_release(&self, api_key: &str, release_id: i64) -> Result<Option<Release>> {
        let response: ReleaseResponse = self
            .get_json(
                "/release",
                api_key,
                &[("release_id", release_id.to_string())],
            )
            .await?;

        Ok(response.releases.into_iter().next())
    }

    /// Enumerate every series belonging to a release.
    ///
    /// Pages until a page comes back shorter than the limit or empty.
    /// Returns an order-preserving, deduplicated list.
    pub async fn list_release_series(&self, api_key: &str, release_id: i64) -> Result<Vec<Series>> {
        let mut series = Vec::new();
        let mut seen = HashSet::new();
        let mut offset: i64 = 0;

        loop {
            let page: SeriesPage = self
                .get_json(
                    "/release/series",
                    api_key,
                    &[
                        ("release_id", release_id.to_string()),
                        ("limit", self.page_limit.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let consumed = page.series.len() as i64;
            debug!(release_id, offset, consumed, "fetched series page");

            if consumed == 0 {
                break;
            }

            for s in page.series {
                if seen.insert(s.id.clone()) {
                    series.push(s);
                }
            }

            if consumed < self.page_limit {
                break;
            }
            offset += consumed;
        }

        Ok(series)
    }

    /// Fetch every observation of one series, in upstream pagination order
    pub async fn list_series_observations(
        &self,
        api_key: &str,
        series_id: &str,
    ) -> Result<Vec<Observation>> {
        let mut observations = Vec::new();
        let mut offset: i64 = 0;

        loop {
            let page: ObservationPage = self
                .get_json(
                    "/series/observations",
                    api_key,
                    &[
                        ("series_id", series_id.to_string()),
                        ("limit", self.page_limit.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let consumed = page.observations.len() as i64;
            debug!(series_id, offset, consumed, "fetched observation page");

            if consumed == 0 {
                break;
            }

            observations.extend(page.observations);

            if consumed < self.page_limit {
                break;
            }
            offset += consumed;
        }

        Ok(observations)
    }

    /// Issue one GET and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        api_key: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", api_key), ("file_type", "json")])
            .query(params)
            .send()
            .await
            .map_err(|e| EdpError::network(format!("GET {path}: {e}")))?
            .error_for_status()
            .map_err(|e| EdpError::network(format!("GET {path}: {e}")))?;

        response
            .json()
            .await
            .map_err(|e| EdpError::parse(format!("GET {path}: {e}")))
    }
}
