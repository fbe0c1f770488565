//! EDP Ingest - FRED release ingestion tool

use anyhow::Result;
use clap::Parser;
use edp_common::logging::{init_logging, LogConfig, LogLevel};
use edp_ingest::config::IngestConfig;
use edp_ingest::params::{EnvParameterSource, ParameterSource, StaticParameterSource, RELEASE_ID_PARAM};
use edp_ingest::pipeline::IngestPipeline;
use edp_ingest::sink::CsvSink;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "edp-ingest")]
#[command(author, version, about = "EDP FRED release ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Ingest a full release into the sink
    Run {
        /// Release id; when omitted the runtime parameter source
        /// (EDP_RELEASE_ID) or the compiled-in default is used
        #[arg(short, long)]
        release_id: Option<i64>,

        /// Data directory for the CSV sink
        #[arg(short, long)]
        data_dir: Option<String>,
    },

    /// Enumerate the series of a release without ingesting
    ListSeries {
        /// Release id; defaults like `run`
        #[arg(short, long)]
        release_id: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("edp-ingest".to_string())
        .build();

    // Environment variables take precedence over CLI defaults; an invalid
    // override falls back to the CLI-built config.
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);

    init_logging(&log_config)?;

    match cli.command {
        Command::Run { release_id, data_dir } => {
            let mut config = IngestConfig::from_env()?;
            if let Some(dir) = data_dir {
                config.data_dir = dir.into();
            }

            let sink = CsvSink::new(config.data_dir.clone());
            let pipeline = IngestPipeline::new(config, sink)?;

            let report = pipeline.run(parameter_source(release_id).as_deref()).await?;
            info!(
                release_id = report.release_id,
                rows_written = report.rows_written,
                "ingestion complete"
            );
        },
        Command::ListSeries { release_id } => {
            let config = IngestConfig::from_env()?;
            let sink = CsvSink::new(config.data_dir.clone());
            let pipeline = IngestPipeline::new(config, sink)?;

            let resolved = edp_ingest::params::resolve_release_id(
                parameter_source(release_id).as_deref(),
                edp_ingest::config::DEFAULT_RELEASE_ID,
            );

            let series = pipeline.enumerate(resolved).await?;
            for s in &series {
                println!("{}", s.id);
            }
            info!(release_id = resolved, series = series.len(), "enumeration complete");
        },
    }

    Ok(())
}

/// Build the parameter source for the resolver: an explicit CLI value wins,
/// otherwise the environment is consulted.
fn parameter_source(release_id: Option<i64>) -> Option<Box<dyn ParameterSource>> {
    match release_id {
        Some(id) => Some(Box::new(StaticParameterSource::new(
            RELEASE_ID_PARAM,
            id.to_string(),
        ))),
        None => Some(Box::new(EnvParameterSource)),
    }
}
