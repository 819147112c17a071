//! Shared utilities for the table cleaner.
//!
//! This module contains common helper functions used across the cleaner,
//! the profiler and the chart builders.

use polars::prelude::*;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for cleaning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Get the dtype category of a Series.
pub fn series_dtype_category(series: &Series) -> DtypeCategory {
    get_dtype_category(series.dtype())
}

// =============================================================================
// Value Utilities
// =============================================================================

/// Render a cell as plain text, or `None` for the missing marker.
///
/// Strings are returned without the quotes polars adds when displaying an
/// `AnyValue`, and floats use Rust's shortest round-trip form so that distinct
/// values never render the same.
pub fn display_value(value: &AnyValue) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some((*s).to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        AnyValue::Boolean(b) => Some(b.to_string()),
        AnyValue::Float64(v) => Some(format_float(*v)),
        AnyValue::Float32(v) => Some(format_float(*v as f64)),
        other => Some(other.to_string()),
    }
}

fn format_float(v: f64) -> String {
    // -0.0 and 0.0 compare equal, so they must render the same
    if v == 0.0 { "0".to_string() } else { v.to_string() }
}

/// Render every cell of a Series with [`display_value`].
pub fn column_values(series: &Series) -> Vec<Option<String>> {
    (0..series.len())
        .map(|i| series.get(i).ok().and_then(|v| display_value(&v)))
        .collect()
}

/// Collect the non-missing, non-NaN values of a numeric Series as f64.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Find the most frequent non-missing value.
///
/// Returns the row index of the first occurrence of the mode together with its
/// count. Ties are broken by first appearance in row order.
pub fn mode_index(values: &[Option<String>]) -> Option<(usize, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, value) in values.iter().enumerate() {
        if let Some(v) = value {
            counts.entry(v.as_str()).or_insert((0, idx)).0 += 1;
        }
    }

    counts
        .into_values()
        .max_by(|(count_a, first_a), (count_b, first_b)| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(count, first)| (first, count))
}

/// Count distinct non-missing values.
pub fn distinct_count(values: &[Option<String>]) -> usize {
    values.iter().flatten().collect::<HashSet<_>>().len()
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Quantile of already-sorted values using linear interpolation between
/// order statistics.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

/// Sort values ascending; NaN sorts as equal.
pub fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

// =============================================================================
// Row Utilities
// =============================================================================

/// Number of rows that repeat an earlier row under full-row equality.
///
/// Missing equals missing for this comparison.
pub fn duplicate_count(df: &DataFrame) -> PolarsResult<usize> {
    if df.width() == 0 {
        return Ok(0);
    }
    let unique = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    Ok(df.height() - unique.height())
}

/// Non-missing, non-NaN values of a numeric Series as a Float64 Series.
pub fn clean_numeric_series(series: &Series) -> PolarsResult<Series> {
    Ok(Series::new(series.name().clone(), numeric_values(series)?))
}

// =============================================================================
// Boolean Detection Utilities
// =============================================================================

/// Text recognised as boolean true during type tightening.
pub const BOOLEAN_TRUE_VALUES: [&str; 4] = ["true", "yes", "t", "y"];

/// Text recognised as boolean false during type tightening.
pub const BOOLEAN_FALSE_VALUES: [&str; 4] = ["false", "no", "f", "n"];

/// Parse a boolean-like string, case-insensitively.
pub fn parse_boolean_string(s: &str) -> Option<bool> {
    let lower = s.trim().to_ascii_lowercase();
    if BOOLEAN_TRUE_VALUES.contains(&lower.as_str()) {
        Some(true)
    } else if BOOLEAN_FALSE_VALUES.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
