//! EDP Ingest Library
//!
//! Bulk-loads one FRED (Federal Reserve Economic Data) release — every series
//! in the release and every historical observation of each series — into an
//! append-only analytical table.
//!
//! # Pipeline stages
//!
//! 1. **Parameter resolution**: pick the release id from an optional runtime
//!    parameter source, falling back to a compiled-in default.
//! 2. **Series enumeration**: page through the release's series list.
//! 3. **Observation fetch**: fan out per series across the API-key pool.
//! 4. **Row assembly**: normalize observations into sink-ready rows.
//! 5. **Sink write**: append the rows, creating the target table if absent.
//!
//! # Example
//!
//! ```no_run
//! use edp_ingest::config::IngestConfig;
//! use edp_ingest::pipeline::IngestPipeline;
//! use edp_ingest::sink::CsvSink;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_env()?;
//!     let sink = CsvSink::new("./data");
//!     let pipeline = IngestPipeline::new(config, sink)?;
//!     let report = pipeline.run(None).await?;
//!     println!("{} rows written", report.rows_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod fred;
pub mod keypool;
pub mod params;
pub mod pipeline;
pub mod rows;
pub mod sink;
