//! Statistical imputation methods.
//!
//! Provides mean, median and mode fill values and the column rewrites that
//! apply them. Fill values are computed over non-missing values only.

use crate::utils::{
    DtypeCategory, clean_numeric_series, column_values, get_dtype_category, is_integer_dtype,
    mode_index,
};
use polars::prelude::*;

/// Result of a mode fill.
#[derive(Debug)]
pub enum ModeFill {
    /// Missing cells were filled with `value`.
    Filled { series: Series, value: String },
    /// The column has no non-missing value to take a mode from.
    NoValues,
    /// The column's dtype has no mode fill.
    Unsupported(DataType),
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Mean of the non-missing values of a numeric column.
    pub fn mean_value(series: &Series) -> PolarsResult<Option<f64>> {
        Ok(clean_numeric_series(series)?.mean())
    }

    /// Median of the non-missing values of a numeric column.
    pub fn median_value(series: &Series) -> PolarsResult<Option<f64>> {
        Ok(clean_numeric_series(series)?.median())
    }

    /// Fill every missing cell of a numeric column with `fill_value`.
    ///
    /// The result is always Float64.
    pub fn fill_numeric(series: &Series, fill_value: f64) -> PolarsResult<Series> {
        let casted = series.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = casted
            .f64()?
            .into_iter()
            .map(|v| v.or(Some(fill_value)))
            .collect();

        Ok(Series::new(series.name().clone(), values))
    }

    /// Fill every missing cell with the column's most frequent value.
    ///
    /// Ties go to the value that appears first in row order. The column keeps
    /// its dtype.
    pub fn fill_with_mode(series: &Series) -> PolarsResult<ModeFill> {
        let rendered = column_values(series);
        let Some((first_idx, _count)) = mode_index(&rendered) else {
            return Ok(ModeFill::NoValues);
        };
        let value = rendered[first_idx].clone().unwrap_or_default();

        match Self::fill_from_index(series, first_idx)? {
            Some(filled) => Ok(ModeFill::Filled {
                series: filled,
                value,
            }),
            None => Ok(ModeFill::Unsupported(series.dtype().clone())),
        }
    }

    /// Fill missing cells with the value found at row `idx`.
    fn fill_from_index(series: &Series, idx: usize) -> PolarsResult<Option<Series>> {
        let name = series.name().clone();
        let dtype = series.dtype().clone();

        let filled = match get_dtype_category(&dtype) {
            DtypeCategory::Numeric if is_integer_dtype(&dtype) => {
                let casted = series.cast(&DataType::Int64)?;
                let ca = casted.i64()?;
                let fill = ca.get(idx);
                let values: Vec<Option<i64>> = ca.into_iter().map(|v| v.or(fill)).collect();
                Series::new(name, values).cast(&dtype)?
            }
            DtypeCategory::Numeric => {
                let casted = series.cast(&DataType::Float64)?;
                let ca = casted.f64()?;
                let fill = ca.get(idx);
                let values: Vec<Option<f64>> = ca.into_iter().map(|v| v.or(fill)).collect();
                Series::new(name, values).cast(&dtype)?
            }
            DtypeCategory::Boolean => {
                let ca = series.bool()?;
                let fill = ca.get(idx);
                let values: Vec<Option<bool>> = ca.into_iter().map(|v| v.or(fill)).collect();
                Series::new(name, values)
            }
            DtypeCategory::String => {
                let casted = series.cast(&DataType::String)?;
                let ca = casted.str()?;
                let fill = ca.get(idx).map(str::to_string);
                let values: Vec<Option<String>> = ca
                    .into_iter()
                    .map(|v| v.map(str::to_string).or_else(|| fill.clone()))
                    .collect();
                let filled = Series::new(name, values);
                if dtype == DataType::String {
                    filled
                } else {
                    filled.cast(&dtype)?
                }
            }
            DtypeCategory::Datetime | DtypeCategory::Other => return Ok(None),
        };

        Ok(Some(filled))
    }
}
