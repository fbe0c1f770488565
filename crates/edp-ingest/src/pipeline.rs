//! Release ingestion pipeline
//!
//! Coordinates the whole run: resolve the release id, enumerate the
//! release's series, fan observation fetches out across the API-key pool,
//! merge the assembled rows, and append them to the sink.
//!
//! Failure model: a failing series is logged and skipped; only a sink write
//! error fails the run. Fan-in is synchronous — nothing is written until
//! every worker has finished.

use crate::config::{IngestConfig, DEFAULT_RELEASE_ID};
use crate::fred::{FredClient, Series};
use crate::keypool::KeyPool;
use crate::params::{resolve_release_id, ParameterSource};
use crate::rows::{self, Assembled};
use crate::sink::{table_name, Sink};
use edp_common::Result;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Summary of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub release_id: i64,
    pub release_name: String,
    pub series_discovered: usize,
    pub series_failed: usize,
    pub rows_written: u64,
    pub observations_skipped: usize,
    pub duration_seconds: f64,
}

pub struct IngestPipeline<S> {
    client: FredClient,
    keys: KeyPool,
    sink: S,
}

impl<S: Sink> IngestPipeline<S> {
    /// Create a pipeline from configuration and a sink
    pub fn new(config: IngestConfig, sink: S) -> Result<Self> {
        let keys = KeyPool::new(config.api_keys.clone())?;
        let client = FredClient::new(
            config.base_url.clone(),
            config.page_limit(),
            Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self { client, keys, sink })
    }

    /// Enumerate the series of a release without ingesting
    pub async fn enumerate(&self, release_id: i64) -> Result<Vec<Series>> {
        self.client
            .list_release_series(self.keys.primary(), release_id)
            .await
    }

    /// Run a full ingestion.
    ///
    /// The release id comes from the optional parameter source, falling back
    /// to the compiled-in default.
    pub async fn run(&self, params: Option<&dyn ParameterSource>) -> Result<IngestReport> {
        let start = Instant::now();

        let release_id = resolve_release_id(params, DEFAULT_RELEASE_ID);

        // Release metadata is cosmetic (it only names the table); degrade on failure.
        let release_name = match self.client.get_release(self.keys.primary(), release_id).await {
            Ok(Some(release)) => release.name,
            Ok(None) => {
                warn!(release_id, "release metadata not found, using generic label");
                format!("release_{release_id}")
            },
            Err(e) => {
                warn!(release_id, error = %e, "release metadata lookup failed, using generic label");
                format!("release_{release_id}")
            },
        };

        info!(release_id, release_name = %release_name, "starting release ingestion");

        let series = match self.enumerate(release_id).await {
            Ok(series) => series,
            Err(e) => {
                error!(release_id, error = %e, "series enumeration failed, nothing to ingest");
                return Ok(IngestReport {
                    release_id,
                    release_name,
                    series_discovered: 0,
                    series_failed: 0,
                    rows_written: 0,
                    observations_skipped: 0,
                    duration_seconds: start.elapsed().as_secs_f64(),
                });
            },
        };

        info!(
            release_id,
            series = series.len(),
            workers = self.keys.len(),
            "discovered series, fetching observations"
        );

        let (merged, skipped, failed) = self.fetch_all(&series, release_id).await;

        let table = table_name(release_id, &release_name);
        let rows_written = if merged.is_empty() {
            warn!(release_id, table = %table, "no rows assembled, skipping sink write");
            0
        } else {
            self.sink.append(&table, &merged).await?
        };

        let report = IngestReport {
            release_id,
            release_name,
            series_discovered: series.len(),
            series_failed: failed,
            rows_written,
            observations_skipped: skipped,
            duration_seconds: start.elapsed().as_secs_f64(),
        };

        info!(
            release_id,
            rows_written = report.rows_written,
            series_failed = report.series_failed,
            observations_skipped = report.observations_skipped,
            duration_seconds = report.duration_seconds,
            "release ingestion complete"
        );

        Ok(report)
    }

    /// Fetch and assemble every series in parallel.
    ///
    /// Series index `i` uses credential `i % K`; concurrency is bounded by
    /// the pool size. Failed series are logged and skipped. Returns the
    /// merged rows, the invalid-date skip tally, and the failed-series count.
    async fn fetch_all(&self, series: &[Series], release_id: i64) -> (Vec<rows::Row>, usize, usize) {
        let concurrency = self.keys.len();

        let results: Vec<Option<Assembled>> = stream::iter(series.iter().enumerate())
            .map(|(index, s)| {
                let client = self.client.clone();
                let api_key = self.keys.assign(index).to_string();
                let series_id = s.id.clone();

                async move {
                    match client.list_series_observations(&api_key, &series_id).await {
                        Ok(observations) => {
                            Some(rows::assemble(&series_id, &observations, release_id))
                        },
                        Err(e) => {
                            error!(series_id = %series_id, error = %e, "series fetch failed, skipping");
                            None
                        },
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.is_none()).count();

        let mut merged = Vec::new();
        let mut skipped = 0;
        for assembled in results.into_iter().flatten() {
            skipped += assembled.skipped;
            merged.extend(assembled.rows);
        }

        (merged, skipped, failed)
    }
}
