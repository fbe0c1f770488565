//! End-to-end tests for the release ingestion pipeline
//!
//! These tests validate the full run against a mock FRED API:
//! - Parameter resolution fallback
//! - Series enumeration and fan-out fetching
//! - Row assembly (explicit nulls, invalid-date skips)
//! - CSV sink creation and row counts
//! - Per-series failure isolation

use edp_ingest::config::IngestConfig;
use edp_ingest::pipeline::IngestPipeline;
use edp_ingest::sink::CsvSink;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to build a config pointed at the mock server
fn test_config(server: &MockServer, keys: usize, data_dir: &TempDir) -> IngestConfig {
    let mut config = IngestConfig::new((0..keys).map(|i| format!("key-{i}")).collect())
        .expect("key pool must not be empty");
    config.base_url = server.uri();
    config.page_limit = 100;
    config.data_dir = data_dir.path().to_path_buf();
    config
}

/// Mount the release metadata endpoint
async fn mount_release(server: &MockServer, release_id: i64, name: &str) {
    Mock::given(method("GET"))
        .and(path("/release"))
        .and(query_param("release_id", release_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "releases": [{"id": release_id, "name": name}]
        })))
        .mount(server)
        .await;
}

/// Mount a single-page series listing
async fn mount_series_list(server: &MockServer, release_id: i64, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/release/series"))
        .and(query_param("release_id", release_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": ids.len(),
            "seriess": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
        })))
        .mount(server)
        .await;
}

/// Mount a single-page observation listing for one series
async fn mount_observations(server: &MockServer, series_id: &str, obs: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/series/observations"))
        .and(query_param("series_id", series_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": obs.len(),
            "observations": obs
                .iter()
                .map(|(date, value)| json!({"date": date, "value": value}))
                .collect::<Vec<_>>(),
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_writes_all_rows_and_tallies_skips() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_release(&server, 10, "Test Rates").await;
    mount_series_list(&server, 10, &["S1", "S2", "S3"]).await;
    mount_observations(&server, "S1", &[("2020-01-01", "1.0"), ("2020-01-02", "2.0")]).await;
    mount_observations(&server, "S2", &[("2020-01-01", "."), ("2020-01-02", "4.0")]).await;
    // One observation with an unparseable date gets dropped and tallied.
    mount_observations(&server, "S3", &[("bogus", "5.0"), ("2020-01-02", "6.0")]).await;

    let sink = CsvSink::new(data_dir.path());
    let pipeline = IngestPipeline::new(test_config(&server, 2, &data_dir), sink).unwrap();
    let report = pipeline.run(None).await.unwrap();

    assert_eq!(report.release_id, 10);
    assert_eq!(report.series_discovered, 3);
    assert_eq!(report.series_failed, 0);
    assert_eq!(report.rows_written, 5);
    assert_eq!(report.observations_skipped, 1);

    // Table file was created with a header and one line per row.
    let table_file = data_dir.path().join("fred_release_10_test_rates.csv");
    assert!(table_file.exists());
    let content = std::fs::read_to_string(table_file).unwrap();
    assert_eq!(content.lines().count(), 6);

    // The missing-value sentinel survived as an explicit empty field.
    assert!(content
        .lines()
        .any(|line| line.starts_with("S2,2020-01-01,,")));
}

#[tokio::test]
async fn test_failing_series_is_skipped_and_run_succeeds() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_release(&server, 10, "Test Rates").await;
    mount_series_list(&server, 10, &["S1", "S2", "S3"]).await;
    mount_observations(&server, "S1", &[("2020-01-01", "1.0")]).await;
    Mock::given(method("GET"))
        .and(path("/series/observations"))
        .and(query_param("series_id", "S2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_observations(&server, "S3", &[("2020-01-01", "3.0")]).await;

    let sink = CsvSink::new(data_dir.path());
    let pipeline = IngestPipeline::new(test_config(&server, 3, &data_dir), sink).unwrap();
    let report = pipeline.run(None).await.unwrap();

    assert_eq!(report.series_discovered, 3);
    assert_eq!(report.series_failed, 1);
    assert_eq!(report.rows_written, 2);
}

#[tokio::test]
async fn test_absent_parameter_source_uses_default_release() {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    // Only the compiled-in default release (10) is mocked; a run with no
    // parameter source must land on it.
    mount_release(&server, 10, "Default Release").await;
    mount_series_list(&server, 10, &[]).await;

    let sink = CsvSink::new(data_dir.path());
    let pipeline = IngestPipeline::new(test_config(&server, 1, &data_dir), sink).unwrap();
    let report = pipeline.run(None).await.unwrap();

    assert_eq!(report.release_id, 10);
    assert_eq!(report.series_discovered, 0);
    assert_eq!(report.rows_written, 0);
}

#[tokio::test]
async fn test_explicit_parameter_overrides_default() {
    use edp_ingest::params::{StaticParameterSource, RELEASE_ID_PARAM};

    let server = MockServer::start().await;
    let data_dir = TempDir::new().unwrap();

    mount_release(&server, 51, "Trade Balance").await;
    mount_series_list(&server, 51, &["BOPGSTB"]).await;
    mount_observations(&server, "BOPGSTB", &[("2020-01-01", "-43.1")]).await;

    let sink = CsvSink::new(data_dir.path());
    let pipeline = IngestPipeline::new(test_config(&server, 1, &data_dir), sink).unwrap();

    let source = StaticParameterSource::new(RELEASE_ID_PARAM, "51");
    let report = pipeline.run(Some(&source)).await.unwrap();

    assert_eq!(report.release_id, 51);
    assert_eq!(report.rows_written, 1);
    assert!(data_dir
        .path()
        .join("fred_release_51_trade_balance.csv")
        .exists());
}
