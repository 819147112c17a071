//! Data cleaning module.
//!
//! [`TableCleaner`] owns a private working copy of a table and applies
//! cleaning operations to it in place:
//! - Removing duplicate rows
//! - Dropping or imputing missing values
//! - Capping outliers with IQR fences
//! - Inferring numeric columns and tightening dtypes
//!
//! Every operation returns the cleaner for chaining and appends a
//! [`CleaningStep`] to its audit trail. Columns that cannot be processed are
//! recorded as skipped or failed outcomes rather than aborting the operation.

mod converters;
mod outliers;

pub use outliers::{IqrBounds, OutlierHandler};

use crate::config::{CleanerConfig, MissingStrategy, OutlierStrategy};
use crate::error::Result;
use crate::imputers::{ModeFill, StatisticalImputer};
use crate::profiler::DataProfiler;
use crate::types::{CleaningOperation, CleaningStep, ColumnOutcome, TableSummary};
use crate::utils::is_numeric_dtype;
use converters::{string_to_numeric, tighten_column};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Label used for outcomes that concern the whole table rather than a column.
pub const ALL_COLUMNS: &str = "*";

/// Owns a working table and applies cleaning operations to it.
///
/// # Example
///
/// ```rust,ignore
/// use table_cleaner::{MissingStrategy, OutlierStrategy, TableCleaner};
///
/// let mut cleaner = TableCleaner::new(&df);
/// cleaner
///     .remove_duplicates()
///     .handle_missing_values(MissingStrategy::Median, Some(&["age"]))
///     .handle_outliers("income", OutlierStrategy::Iqr);
///
/// let cleaned = cleaner.get_cleaned_data();
/// ```
#[derive(Debug, Clone)]
pub struct TableCleaner {
    df: DataFrame,
    config: CleanerConfig,
    steps: Vec<CleaningStep>,
}

static_assertions::assert_impl_all!(TableCleaner: Send, Sync);

impl TableCleaner {
    /// Create a cleaner over an independent copy of `df`.
    pub fn new(df: &DataFrame) -> Self {
        info!(
            "TableCleaner initialized with {} rows and {} columns",
            df.height(),
            df.width()
        );
        Self {
            df: df.clone(),
            config: CleanerConfig::default(),
            steps: Vec::new(),
        }
    }

    /// Create a cleaner with a custom configuration.
    pub fn with_config(df: &DataFrame, config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        let mut cleaner = Self::new(df);
        cleaner.config = config;
        Ok(cleaner)
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// (rows, columns) of the working table.
    pub fn shape(&self) -> (usize, usize) {
        self.df.shape()
    }

    /// Profile the current working table.
    pub fn get_summary(&self) -> TableSummary {
        DataProfiler::summarize(&self.df)
    }

    /// Return an independent copy of the working table.
    pub fn get_cleaned_data(&self) -> DataFrame {
        self.df.clone()
    }

    /// Consume the cleaner and return the working table.
    pub fn into_inner(self) -> DataFrame {
        self.df
    }

    /// Audit trail, one step per operation, oldest first.
    pub fn steps(&self) -> &[CleaningStep] {
        &self.steps
    }

    pub fn last_step(&self) -> Option<&CleaningStep> {
        self.steps.last()
    }

    /// Take the audit trail, leaving it empty.
    pub fn take_steps(&mut self) -> Vec<CleaningStep> {
        std::mem::take(&mut self.steps)
    }

    /// Rows removed by the most recent [`remove_duplicates`](Self::remove_duplicates).
    pub fn duplicates_removed(&self) -> usize {
        self.steps
            .iter()
            .rev()
            .find(|s| s.operation == CleaningOperation::RemoveDuplicates)
            .map(CleaningStep::rows_removed)
            .unwrap_or(0)
    }

    // ========================================================================
    // Duplicate removal
    // ========================================================================

    /// Remove every row that repeats an earlier row, keeping the first.
    ///
    /// Missing equals missing for the comparison. Surviving rows keep their
    /// order.
    pub fn remove_duplicates(&mut self) -> &mut Self {
        let mut step = self.begin(CleaningOperation::RemoveDuplicates);

        if self.df.width() == 0 {
            debug!("No columns; nothing to deduplicate");
            return self.finish(step);
        }

        match self.df.unique_stable(None, UniqueKeepStrategy::First, None) {
            Ok(unique) => {
                let duplicates = self.df.height() - unique.height();
                if duplicates == 0 {
                    debug!("No duplicate rows found");
                } else {
                    self.df = unique;
                    info!("Removed {} duplicate rows", duplicates);
                    step.outcomes.push(ColumnOutcome::applied(
                        ALL_COLUMNS,
                        format!("removed {} duplicate rows", duplicates),
                    ));
                }
            }
            Err(e) => {
                warn!("Error removing duplicates: {}", e);
                step.outcomes
                    .push(ColumnOutcome::failed(ALL_COLUMNS, e.to_string()));
            }
        }

        self.finish(step)
    }

    // ========================================================================
    // Missing values
    // ========================================================================

    /// Handle missing values column by column.
    ///
    /// `columns` defaults to every column of the table. Columns are processed
    /// in the given order, so with [`MissingStrategy::Drop`] rows removed for
    /// one column are gone before the next column is examined. Unknown
    /// columns, non-numeric columns under mean/median and columns without a
    /// mode are skipped with a warning.
    pub fn handle_missing_values(
        &mut self,
        strategy: MissingStrategy,
        columns: Option<&[&str]>,
    ) -> &mut Self {
        let targets = self.resolve_columns(columns);
        let mut step = self.begin(CleaningOperation::HandleMissingValues { strategy });

        for col in &targets {
            let outcome = self.missing_for_column(col, strategy);
            step.outcomes.push(outcome);
        }

        self.finish(step)
    }

    fn missing_for_column(&mut self, col: &str, strategy: MissingStrategy) -> ColumnOutcome {
        let Ok(column) = self.df.column(col) else {
            warn!("Skipping missing-value handling for unknown column: {}", col);
            return ColumnOutcome::skipped(col, "column not found");
        };
        let series = column.as_materialized_series().clone();

        let missing = series.null_count();
        if missing == 0 {
            debug!("No missing values in column {}. Skipping.", col);
            return ColumnOutcome::unchanged(col, "no missing values");
        }

        match self.apply_missing(&series, strategy, missing) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to handle missing values for column {}: {}", col, e);
                ColumnOutcome::failed(col, e.to_string())
            }
        }
    }

    fn apply_missing(
        &mut self,
        series: &Series,
        strategy: MissingStrategy,
        missing: usize,
    ) -> PolarsResult<ColumnOutcome> {
        let col = series.name().to_string();

        match strategy {
            MissingStrategy::Drop => {
                let mask = series.is_not_null();
                self.df = self.df.filter(&mask)?;
                info!("Dropped {} rows where {} is missing", missing, col);
                Ok(ColumnOutcome::applied(
                    col,
                    format!("dropped {} rows with missing values", missing),
                ))
            }
            MissingStrategy::Mean | MissingStrategy::Median => {
                if !is_numeric_dtype(series.dtype()) {
                    warn!(
                        "Column {} is not numeric, cannot apply {}. Skipping.",
                        col, strategy
                    );
                    return Ok(ColumnOutcome::skipped(
                        col,
                        format!("column is not numeric ({}), cannot apply {}", series.dtype(), strategy),
                    ));
                }

                let fill_value = if strategy == MissingStrategy::Mean {
                    StatisticalImputer::mean_value(series)?
                } else {
                    StatisticalImputer::median_value(series)?
                };
                let Some(fill_value) = fill_value else {
                    warn!("Column {} has no values to compute a {}. Skipping.", col, strategy);
                    return Ok(ColumnOutcome::skipped(col, "column has no non-missing values"));
                };

                let filled = StatisticalImputer::fill_numeric(series, fill_value)?;
                self.df.replace(&col, filled)?;
                info!(
                    "Filled {} missing values in {} with {}={}",
                    missing, col, strategy, fill_value
                );
                Ok(ColumnOutcome::applied(
                    col,
                    format!("filled {} missing values with {} {}", missing, strategy, fill_value),
                ))
            }
            MissingStrategy::Mode => match StatisticalImputer::fill_with_mode(series)? {
                ModeFill::Filled { series: filled, value } => {
                    self.df.replace(&col, filled)?;
                    info!(
                        "Filling {} missing values in {} using mode={}",
                        missing, col, value
                    );
                    Ok(ColumnOutcome::applied(
                        col,
                        format!("filled {} missing values with mode '{}'", missing, value),
                    ))
                }
                ModeFill::NoValues => {
                    warn!("No mode found for column {}. Skipping.", col);
                    Ok(ColumnOutcome::skipped(col, "no mode: column has no non-missing values"))
                }
                ModeFill::Unsupported(dtype) => {
                    warn!("Mode fill is not supported for column {} ({}). Skipping.", col, dtype);
                    Ok(ColumnOutcome::skipped(
                        col,
                        format!("mode fill is not supported for dtype {}", dtype),
                    ))
                }
            },
        }
    }

    // ========================================================================
    // Outliers
    // ========================================================================

    /// Cap the values of a numeric column at its IQR fences.
    ///
    /// Fences are `[Q1 - k*IQR, Q3 + k*IQR]` over the non-missing values, with
    /// `k` taken from [`CleanerConfig::iqr_multiplier`]. Unknown, non-numeric
    /// and all-missing columns are skipped.
    pub fn handle_outliers(&mut self, column: &str, strategy: OutlierStrategy) -> &mut Self {
        let mut step = self.begin(CleaningOperation::HandleOutliers {
            column: column.to_string(),
            strategy,
        });

        let outcome = self.outliers_for_column(column, strategy);
        step.outcomes.push(outcome);

        self.finish(step)
    }

    fn outliers_for_column(&mut self, column: &str, strategy: OutlierStrategy) -> ColumnOutcome {
        let Ok(col) = self.df.column(column) else {
            warn!("Column {} not found. Skipping outlier handling.", column);
            return ColumnOutcome::skipped(column, "column not found");
        };
        let series = col.as_materialized_series().clone();

        if !is_numeric_dtype(series.dtype()) {
            warn!("Column {} is not numeric. Skipping outlier handling.", column);
            return ColumnOutcome::skipped(
                column,
                format!("column is not numeric ({})", series.dtype()),
            );
        }

        match self.cap_column(&series, strategy) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to handle outliers for column {}: {}", column, e);
                ColumnOutcome::failed(column, e.to_string())
            }
        }
    }

    fn cap_column(&mut self, series: &Series, strategy: OutlierStrategy) -> PolarsResult<ColumnOutcome> {
        let column = series.name().to_string();

        let bounds = match strategy {
            OutlierStrategy::Iqr => OutlierHandler::iqr_bounds(series, self.config.iqr_multiplier)?,
        };
        let Some(bounds) = bounds else {
            debug!("Column {} has no non-null values. Skipping outlier handling.", column);
            return Ok(ColumnOutcome::skipped(column, "column has no non-missing values"));
        };

        info!(
            "Capping values in {} to [{}, {}] using IQR method (Q1={}, Q3={}, IQR={})",
            column, bounds.lower, bounds.upper, bounds.q1, bounds.q3, bounds.iqr
        );

        let outside = OutlierHandler::count_outside(series, &bounds)?;
        if outside == 0 {
            return Ok(ColumnOutcome::unchanged(
                column,
                format!("no values outside [{}, {}]", bounds.lower, bounds.upper),
            ));
        }

        let capped = OutlierHandler::cap(series, &bounds)?;
        self.df.replace(&column, capped)?;
        Ok(ColumnOutcome::applied(
            column,
            format!(
                "capped {} values to [{}, {}]",
                outside, bounds.lower, bounds.upper
            ),
        ))
    }

    // ========================================================================
    // Type conversion
    // ========================================================================

    /// Convert text columns to numbers where every value parses, then tighten
    /// dtypes across the whole table.
    ///
    /// Unparseable text simply leaves its column as text. The tightening pass
    /// narrows integral float columns to Int64 and boolean-like text columns to
    /// Boolean; a column that fails to tighten is left as it was.
    pub fn convert_data_types(&mut self, columns: Option<&[&str]>) -> &mut Self {
        let targets = self.resolve_columns(columns);
        let mut step = self.begin(CleaningOperation::ConvertDataTypes);

        for col in &targets {
            let Ok(column) = self.df.column(col) else {
                debug!("Skipping convert for unknown column: {}", col);
                step.outcomes
                    .push(ColumnOutcome::skipped(col.as_str(), "column not found"));
                continue;
            };
            let series = column.as_materialized_series().clone();
            if series.dtype() != &DataType::String {
                continue;
            }

            let outcome = match string_to_numeric(&series) {
                Ok(Some(converted)) => match self.df.replace(col, converted) {
                    Ok(_) => ColumnOutcome::applied(col.as_str(), "parsed text as numbers"),
                    Err(e) => {
                        warn!("Failed converting column {} to numeric: {}", col, e);
                        ColumnOutcome::failed(col.as_str(), e.to_string())
                    }
                },
                Ok(None) => {
                    debug!("Column {} has non-numeric values; left as text", col);
                    ColumnOutcome::unchanged(col.as_str(), "not every value is numeric")
                }
                Err(e) => {
                    warn!("Failed converting column {} to numeric: {}", col, e);
                    ColumnOutcome::failed(col.as_str(), e.to_string())
                }
            };
            step.outcomes.push(outcome);
        }

        self.tighten_types(&mut step);
        info!(
            "convert_data_types applied; inferred dtypes: {:?}",
            self.df.dtypes()
        );

        self.finish(step)
    }

    fn tighten_types(&mut self, step: &mut CleaningStep) {
        let names: Vec<String> = self
            .df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for name in names {
            let Ok(column) = self.df.column(&name) else {
                continue;
            };
            let series = column.as_materialized_series().clone();

            match tighten_column(&series) {
                Ok(Some((narrowed, dtype))) => match self.df.replace(&name, narrowed) {
                    Ok(_) => {
                        debug!("Narrowed column {} from {} to {}", name, series.dtype(), dtype);
                        step.outcomes.push(ColumnOutcome::applied(
                            name,
                            format!("narrowed {} to {}", series.dtype(), dtype),
                        ));
                    }
                    Err(e) => {
                        warn!("Failed to tighten column {}: {}", name, e);
                        step.outcomes.push(ColumnOutcome::failed(name, e.to_string()));
                    }
                },
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to tighten column {}: {}", name, e);
                    step.outcomes.push(ColumnOutcome::failed(name, e.to_string()));
                }
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn resolve_columns(&self, columns: Option<&[&str]>) -> Vec<String> {
        match columns {
            Some(cols) => cols.iter().map(|c| c.to_string()).collect(),
            None => self
                .df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn begin(&self, operation: CleaningOperation) -> CleaningStep {
        let (rows, columns) = self.df.shape();
        CleaningStep {
            operation,
            rows_before: rows,
            rows_after: rows,
            columns_before: columns,
            columns_after: columns,
            outcomes: Vec::new(),
        }
    }

    fn finish(&mut self, mut step: CleaningStep) -> &mut Self {
        let (rows, columns) = self.df.shape();
        step.rows_after = rows;
        step.columns_after = columns;
        debug!(
            "{}: {} -> {} rows, {} warnings",
            step.operation.display_name(),
            step.rows_before,
            step.rows_after,
            step.warnings().count()
        );
        self.steps.push(step);
        self
    }
}
