//! Outlier handling module.
//!
//! Contains the IQR fence computation and the capping rewrite for numeric
//! columns.

use crate::utils::{numeric_values, quantile_sorted, sort_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Interquartile-range fences of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute fences from sorted values: `[Q1 - k*IQR, Q3 + k*IQR]`.
    pub fn from_sorted(sorted: &[f64], multiplier: f64) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }
        let q1 = quantile_sorted(sorted, 0.25);
        let q3 = quantile_sorted(sorted, 0.75);
        let iqr = q3 - q1;
        let bounds = Self {
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        };
        // Infinite inputs make the fences meaningless
        (bounds.lower.is_finite() && bounds.upper.is_finite()).then_some(bounds)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Handles outlier detection and treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// IQR fences over the non-missing values of a numeric column.
    ///
    /// Returns `None` if the column has no usable values.
    pub fn iqr_bounds(series: &Series, multiplier: f64) -> PolarsResult<Option<IqrBounds>> {
        let mut values = numeric_values(series)?;
        sort_values(&mut values);
        Ok(IqrBounds::from_sorted(&values, multiplier))
    }

    /// Count non-missing values outside the fences.
    pub fn count_outside(series: &Series, bounds: &IqrBounds) -> PolarsResult<usize> {
        let casted = series.cast(&DataType::Float64)?;
        Ok(casted
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| *v < bounds.lower || *v > bounds.upper)
            .count())
    }

    /// Replace values below the lower fence with the fence, and likewise above.
    ///
    /// Missing values stay missing. The result is Float64.
    pub fn cap(series: &Series, bounds: &IqrBounds) -> PolarsResult<Series> {
        let casted = series.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = casted
            .f64()?
            .into_iter()
            .map(|v| {
                v.map(|val| {
                    if val < bounds.lower {
                        bounds.lower
                    } else if val > bounds.upper {
                        bounds.upper
                    } else {
                        val
                    }
                })
            })
            .collect();

        Ok(Series::new(series.name().clone(), values))
    }
}
