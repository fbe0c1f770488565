//! Row assembly
//!
//! Pure transformation from raw observations into sink-ready rows. A missing
//! or non-numeric upstream value becomes an explicit null, never a dropped
//! row; only an unparseable date drops that single observation, counted in
//! the skip tally.

use crate::fred::types::Observation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// FRED's sentinel for a missing observation value.
const MISSING_VALUE: &str = ".";

/// One flattened, sink-ready observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub series_id: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub release_id: i64,
}

/// Result of assembling one series' observations
#[derive(Debug, Clone, Default)]
pub struct Assembled {
    pub rows: Vec<Row>,
    /// Observations dropped for an unparseable date
    pub skipped: usize,
}

/// Assemble the rows for one series.
///
/// Produces exactly one row per observation with a valid date, in upstream
/// order.
pub fn assemble(series_id: &str, observations: &[Observation], release_id: i64) -> Assembled {
    let mut assembled = Assembled {
        rows: Vec::with_capacity(observations.len()),
        skipped: 0,
    };

    for obs in observations {
        let date = match NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                warn!(series_id, date = %obs.date, "skipping observation with invalid date");
                assembled.skipped += 1;
                continue;
            },
        };

        assembled.rows.push(Row {
            series_id: series_id.to_string(),
            date,
            value: parse_value(&obs.value),
            release_id,
        });
    }

    assembled
}

/// Parse an observation value, mapping the "." sentinel (and anything else
/// non-numeric) to an explicit null.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == MISSING_VALUE {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn obs(date: &str, value: &str) -> Observation {
        Observation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_assemble_keeps_row_count() {
        let observations = vec![
            obs("2020-01-01", "1.5"),
            obs("2020-01-02", "."),
            obs("2020-01-03", "2.25"),
        ];

        let assembled = assemble("DGS10", &observations, 10);
        assert_eq!(assembled.rows.len(), 3);
        assert_eq!(assembled.skipped, 0);
    }

    #[test]
    fn test_missing_value_becomes_null_not_dropped() {
        let assembled = assemble("DGS10", &[obs("2020-01-02", ".")], 10);
        assert_eq!(assembled.rows.len(), 1);
        assert_eq!(assembled.rows[0].value, None);
    }

    #[test]
    fn test_non_numeric_value_becomes_null() {
        let assembled = assemble("DGS10", &[obs("2020-01-02", "n/a")], 10);
        assert_eq!(assembled.rows.len(), 1);
        assert_eq!(assembled.rows[0].value, None);
    }

    #[test]
    fn test_invalid_date_dropped_and_tallied() {
        let observations = vec![
            obs("2020-01-01", "1.5"),
            obs("not-a-date", "2.0"),
            obs("2020-13-40", "3.0"),
            obs("2020-01-04", "4.0"),
        ];

        let assembled = assemble("DGS10", &observations, 10);
        assert_eq!(assembled.rows.len(), 2);
        assert_eq!(assembled.skipped, 2);
    }

    #[test]
    fn test_rows_carry_release_and_series() {
        let assembled = assemble("DGS2", &[obs("2021-06-30", "0.25")], 51);
        let row = &assembled.rows[0];
        assert_eq!(row.series_id, "DGS2");
        assert_eq!(row.release_id, 51);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2021, 6, 30).unwrap());
        assert_eq!(row.value, Some(0.25));
    }

    #[test]
    fn test_upstream_order_preserved() {
        let observations = vec![
            obs("2020-01-03", "3.0"),
            obs("2020-01-01", "1.0"),
            obs("2020-01-02", "2.0"),
        ];

        let assembled = assemble("DGS10", &observations, 10);
        let dates: Vec<String> = assembled.rows.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2020-01-03", "2020-01-01", "2020-01-02"]);
    }
}
