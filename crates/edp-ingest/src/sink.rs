//! Sink writers
//!
//! Append-only destinations for assembled rows. The target table is created
//! on first append if absent. No deduplication is performed: re-running the
//! same release appends duplicate rows, and re-run semantics are the
//! caller's responsibility.
//!
//! A write error is fatal to the run; sinks report it rather than retrying.

use crate::rows::Row;
use edp_common::{EdpError, Result};
use std::path::PathBuf;
use tracing::info;

/// Destination table for one release, named from the release id and label
pub fn table_name(release_id: i64, release_name: &str) -> String {
    let slug = slug(release_name);
    if slug.is_empty() {
        format!("fred_release_{release_id}")
    } else {
        format!("fred_release_{release_id}_{slug}")
    }
}

/// Lowercase a label into a safe table identifier: `[a-z0-9_]` only,
/// runs of other characters collapsed to single underscores.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_underscore = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }

    out.trim_end_matches('_').to_string()
}

/// An append-only row sink
#[allow(async_fn_in_trait)]
pub trait Sink {
    /// Append rows to `table`, creating the table if absent.
    /// Returns the number of rows written.
    async fn append(&self, table: &str, rows: &[Row]) -> Result<u64>;
}

/// Sink writing one CSV file per table under a data directory.
///
/// The directory and file (with header) are created on first append; later
/// appends extend the existing file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `table`
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

impl Sink for CsvSink {
    async fn append(&self, table: &str, rows: &[Row]) -> Result<u64> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.table_path(table);
        let existed = path.exists();

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!existed)
            .from_writer(file);

        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| EdpError::sink(format!("{}: {e}", path.display())))?;
        }
        writer
            .flush()
            .map_err(|e| EdpError::sink(format!("{}: {e}", path.display())))?;

        info!(table, rows = rows.len(), path = %path.display(), "appended rows to CSV sink");
        Ok(rows.len() as u64)
    }
}

/// Sink appending into a Postgres table
#[cfg(feature = "database")]
pub use postgres::PostgresSink;

#[cfg(feature = "database")]
mod postgres {
    use super::Sink;
    use crate::rows::Row;
    use edp_common::{EdpError, Result};
    use sqlx::{PgPool, QueryBuilder};
    use tracing::info;

    /// Rows per INSERT statement
    const INSERT_BATCH_SIZE: usize = 500;

    pub struct PostgresSink {
        pool: PgPool,
    }

    impl PostgresSink {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }

        pub async fn connect(database_url: &str) -> Result<Self> {
            let pool = PgPool::connect(database_url)
                .await
                .map_err(|e| EdpError::Database(e.to_string()))?;
            Ok(Self::new(pool))
        }
    }

    impl Sink for PostgresSink {
        async fn append(&self, table: &str, rows: &[Row]) -> Result<u64> {
            // Table names come from `table_name` and contain only [a-z0-9_].
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 series_id TEXT NOT NULL, \
                 obs_date DATE NOT NULL, \
                 value DOUBLE PRECISION, \
                 release_id BIGINT NOT NULL)"
            );
            sqlx::query(&ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| EdpError::Database(e.to_string()))?;

            let mut written = 0u64;
            for chunk in rows.chunks(INSERT_BATCH_SIZE) {
                let mut builder = QueryBuilder::new(format!(
                    "INSERT INTO {table} (series_id, obs_date, value, release_id) "
                ));
                builder.push_values(chunk, |mut b, row| {
                    b.push_bind(&row.series_id)
                        .push_bind(row.date)
                        .push_bind(row.value)
                        .push_bind(row.release_id);
                });

                let result = builder
                    .build()
                    .execute(&self.pool)
                    .await
                    .map_err(|e| EdpError::Database(e.to_string()))?;
                written += result.rows_affected();
            }

            info!(table, rows = written, "appended rows to Postgres sink");
            Ok(written)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn row(series_id: &str, day: u32, value: Option<f64>) -> Row {
        Row {
            series_id: series_id.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            value,
            release_id: 10,
        }
    }

    #[test]
    fn test_table_name_slug() {
        assert_eq!(
            table_name(10, "H.15 Selected Interest Rates"),
            "fred_release_10_h_15_selected_interest_rates"
        );
        assert_eq!(table_name(53, "Gross Domestic Product"), "fred_release_53_gross_domestic_product");
    }

    #[test]
    fn test_table_name_without_usable_label() {
        // An all-punctuation label slugs to nothing; the identifier must not
        // end in a separator.
        assert_eq!(table_name(7, "---"), "fred_release_7");
        assert_eq!(table_name(7, ""), "fred_release_7");
    }

    #[tokio::test]
    async fn test_csv_sink_creates_table_file_with_header() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());

        let written = sink
            .append("fred_release_10_test", &[row("DGS10", 1, Some(1.5))])
            .await
            .unwrap();
        assert_eq!(written, 1);

        let content = std::fs::read_to_string(sink.table_path("fred_release_10_test")).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "series_id,date,value,release_id");
        assert_eq!(lines.next().unwrap(), "DGS10,2020-01-01,1.5,10");
    }

    #[tokio::test]
    async fn test_csv_sink_appends_without_repeating_header() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());

        sink.append("t", &[row("DGS10", 1, Some(1.5))]).await.unwrap();
        sink.append("t", &[row("DGS10", 2, None)]).await.unwrap();

        let content = std::fs::read_to_string(sink.table_path("t")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        // Null value serializes as an empty field, the row is not dropped.
        assert_eq!(lines[2], "DGS10,2020-01-02,,10");
    }

    #[tokio::test]
    async fn test_csv_sink_write_error_is_fatal() {
        // A data directory path that collides with an existing file
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();

        let sink = CsvSink::new(&blocker);
        let result = sink.append("t", &[row("DGS10", 1, None)]).await;
        assert!(result.is_err());
    }
}
