//! Data profiling module.
//!
//! Produces the [`TableSummary`] of a table: shape, column dtypes, missing
//! counts, duplicate count and per-column descriptive statistics.

mod statistics;

use crate::types::{ColumnInfo, MissingCount, TableSummary};
use crate::utils::duplicate_count;
use polars::prelude::*;
use statistics::describe_column;
use tracing::{debug, warn};

/// Data profiler for summarizing table structure and content.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize a table.
    ///
    /// Never fails: a column whose statistics cannot be computed is left out of
    /// the description and logged.
    pub fn summarize(df: &DataFrame) -> TableSummary {
        let (rows, cols) = df.shape();
        if cols == 0 {
            return TableSummary {
                shape: (rows, 0),
                ..TableSummary::empty()
            };
        }

        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                non_null_count: col.len() - col.null_count(),
            })
            .collect();

        let missing_values = df
            .get_columns()
            .iter()
            .map(|col| MissingCount {
                column: col.name().to_string(),
                count: col.null_count(),
            })
            .collect();

        // describe() of a table without rows has nothing to report
        let description = if rows == 0 {
            Vec::new()
        } else {
            df.get_columns()
                .iter()
                .filter_map(|col| match describe_column(col.as_materialized_series()) {
                    Ok(description) => Some(description),
                    Err(e) => {
                        warn!("Could not describe column {}: {}", col.name(), e);
                        None
                    }
                })
                .collect()
        };

        let summary = TableSummary {
            shape: (rows, cols),
            columns,
            missing_values,
            duplicate_count: duplicate_count(df).unwrap_or_else(|e| {
                warn!("Could not count duplicate rows: {}", e);
                0
            }),
            description,
        };
        debug!(
            "Summarized table: {} rows, {} columns, {} missing, {} duplicates",
            rows,
            cols,
            summary.total_missing(),
            summary.duplicate_count
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summarize_people() {
        let df = df![
            "age" => [Some(25i64), None, Some(30), Some(25)],
            "city" => ["NY", "NY", "LA", "NY"],
        ]
        .unwrap();

        let summary = DataProfiler::summarize(&df);

        assert_eq!(summary.shape, (4, 2));
        assert_eq!(summary.missing_for("age"), Some(1));
        assert_eq!(summary.missing_for("city"), Some(0));
        assert_eq!(summary.duplicate_count, 1);
        assert_eq!(summary.columns[0].name, "age");
        assert_eq!(summary.columns[0].dtype, "i64");
        assert_eq!(summary.columns[0].non_null_count, 3);
        assert_eq!(summary.description.len(), 2);
        assert_eq!(summary.description_for("age").unwrap().count(), 3);
    }

    #[test]
    fn test_summarize_zero_rows() {
        let df = df!["a" => Vec::<i64>::new(), "b" => Vec::<&str>::new()].unwrap();
        let summary = DataProfiler::summarize(&df);

        assert_eq!(summary.shape, (0, 2));
        assert_eq!(summary.columns.len(), 2);
        assert_eq!(summary.total_missing(), 0);
        assert_eq!(summary.duplicate_count, 0);
        assert!(summary.description.is_empty());
    }

    #[test]
    fn test_summarize_empty_table() {
        assert_eq!(DataProfiler::summarize(&DataFrame::empty()), TableSummary::empty());
    }
}
