//! Imputation module for handling missing values.
//!
//! Provides the statistical fill strategies (mean, median, mode) used by
//! [`TableCleaner::handle_missing_values`](crate::cleaner::TableCleaner::handle_missing_values).

mod statistical;

pub use statistical::{ModeFill, StatisticalImputer};
