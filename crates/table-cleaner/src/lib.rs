//! Column-wise Data Cleaning Library
//!
//! A data-cleaning engine for delimited-text tables built with Rust and Polars.
//!
//! # Overview
//!
//! This library provides interactive cleaning of a single table:
//!
//! - **Profiling**: Shape, dtypes, missing counts, duplicate count and
//!   descriptive statistics per column
//! - **Duplicate Removal**: Full-row duplicates, first occurrence kept
//! - **Missing Values**: Drop rows or impute with mean, median or mode
//! - **Outliers**: Cap numeric columns at their IQR fences
//! - **Type Inference**: Parse numeric text and tighten dtypes
//! - **Charts**: Missing-value bars, histograms, box plots and count plots for
//!   before/after views
//! - **Sessions**: Original and current table with one operation applied per
//!   interaction, plus JSON recipes
//!
//! Per-column problems (unknown column, wrong dtype, nothing to impute) never
//! abort an operation. They are logged and recorded in the audit trail as
//! skipped outcomes. Only malformed requests such as an unknown strategy name
//! are errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use table_cleaner::{CleanerConfig, MissingStrategy, OutlierStrategy, TableCleaner};
//! use table_cleaner::io::read_csv_file;
//!
//! let config = CleanerConfig::default();
//! let df = read_csv_file("people.csv", &config)?;
//!
//! let mut cleaner = TableCleaner::with_config(&df, config)?;
//! cleaner
//!     .convert_data_types(None)
//!     .remove_duplicates()
//!     .handle_missing_values(MissingStrategy::Median, Some(&["age"]))
//!     .handle_outliers("income", OutlierStrategy::Iqr);
//!
//! println!("{:?}", cleaner.get_summary());
//! for step in cleaner.steps() {
//!     println!("{}: {} rows removed", step.operation.display_name(), step.rows_removed());
//! }
//! ```
//!
//! # Sessions
//!
//! ```rust,ignore
//! use table_cleaner::{CleaningAction, CleaningSession};
//!
//! let mut session = CleaningSession::new(df);
//! session.apply(CleaningAction::RemoveDuplicates)?;
//!
//! // Unknown strategy: rejected, current table untouched
//! let err = session.apply(CleaningAction::HandleMissingValues {
//!     strategy: "interpolate".to_string(),
//!     columns: None,
//! });
//! assert!(err.is_err());
//!
//! session.reset();
//! ```

pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod profiler;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{IqrBounds, OutlierHandler, TableCleaner};
pub use config::{
    CleanerConfig, CleanerConfigBuilder, ConfigValidationError, MissingStrategy, OutlierStrategy,
};
pub use error::{CleanerError, Result as CleanerResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use profiler::DataProfiler;
pub use session::{CleaningAction, CleaningSession, HistoryEntry, load_recipe};
pub use types::{
    CleaningOperation, CleaningStep, ColumnDescription, ColumnInfo, ColumnOutcome, MissingCount,
    OutcomeStatus, TableSummary,
};
