//! Configuration types for the table cleaner.
//!
//! This module holds the cleaning strategies accepted by the operations and
//! the [`CleanerConfig`] tuning knobs, built with a fluent builder.

use crate::error::CleanerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy for handling missing values in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStrategy {
    /// Drop every row where the column is missing
    Drop,
    /// Fill with the mean of non-missing values (numeric only)
    Mean,
    /// Fill with the median of non-missing values (numeric only)
    Median,
    /// Fill with the most frequent non-missing value
    Mode,
}

impl MissingStrategy {
    pub const ALL: [MissingStrategy; 4] = [Self::Drop, Self::Mean, Self::Median, Self::Mode];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
        }
    }
}

impl fmt::Display for MissingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingStrategy {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == wanted)
            .ok_or_else(|| {
                CleanerError::InvalidArgument(format!(
                    "strategy must be one of drop, mean, median, mode (got '{}')",
                    s
                ))
            })
    }
}

/// Strategy for handling outliers in a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierStrategy {
    /// Cap values at the IQR fences (Q1 - k*IQR, Q3 + k*IQR)
    #[default]
    Iqr,
}

impl OutlierStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
        }
    }
}

impl fmt::Display for OutlierStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlierStrategy {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iqr" => Ok(Self::Iqr),
            _ => Err(CleanerError::InvalidArgument(format!(
                "Unsupported outlier strategy: {}",
                s
            ))),
        }
    }
}

/// Configuration for the table cleaner and its collaborators.
///
/// Use [`CleanerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use table_cleaner::config::CleanerConfig;
///
/// let config = CleanerConfig::builder()
///     .iqr_multiplier(3.0)
///     .separator(b';')
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Multiplier applied to the IQR when computing the capping fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Number of equal-width bins for distribution charts.
    /// Default: 20
    pub histogram_bins: usize,

    /// Number of categories shown in count charts before grouping into "Other".
    /// Default: 15
    pub top_categories: usize,

    /// Number of rows used by the CSV reader to infer column types.
    /// `None` scans the whole file.
    /// Default: Some(100)
    pub infer_schema_length: Option<usize>,

    /// Field separator for CSV ingestion and export.
    /// Default: b','
    pub separator: u8,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            histogram_bins: 20,
            top_categories: 15,
            infer_schema_length: Some(100),
            separator: b',',
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "histogram_bins".to_string(),
            });
        }

        if self.top_categories == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "top_categories".to_string(),
            });
        }

        if !self.separator.is_ascii() || matches!(self.separator, b'\n' | b'\r' | b'"') {
            return Err(ConfigValidationError::InvalidSeparator(self.separator));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid value for '{field}': must be at least 1")]
    InvalidCount { field: String },

    #[error("Invalid separator byte: {0:#04x}")]
    InvalidSeparator(u8),
}

impl From<ConfigValidationError> for CleanerError {
    fn from(err: ConfigValidationError) -> Self {
        CleanerError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    iqr_multiplier: Option<f64>,
    histogram_bins: Option<usize>,
    top_categories: Option<usize>,
    infer_schema_length: Option<Option<usize>>,
    separator: Option<u8>,
}

impl CleanerConfigBuilder {
    /// Set the IQR multiplier used for outlier fences.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the number of histogram bins for distribution charts.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many categories a count chart shows before grouping the rest.
    pub fn top_categories(mut self, top_n: usize) -> Self {
        self.top_categories = Some(top_n);
        self
    }

    /// Set how many rows the CSV reader scans to infer types.
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the CSV field separator.
    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let defaults = CleanerConfig::default();
        let config = CleanerConfig {
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            top_categories: self.top_categories.unwrap_or(defaults.top_categories),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            separator: self.separator.unwrap_or(defaults.separator),
        };

        config.validate()?;
        Ok(config)
    }
}
