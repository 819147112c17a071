//! Per-column descriptive statistics.

use crate::types::ColumnDescription;
use crate::utils::{
    clean_numeric_series, column_values, distinct_count, is_numeric_dtype, mode_index,
    numeric_values, quantile_sorted, sort_values,
};
use polars::prelude::*;

/// Describe a column: numeric columns get central tendency and spread, every
/// other dtype gets the categorical form.
pub(crate) fn describe_column(series: &Series) -> PolarsResult<ColumnDescription> {
    if is_numeric_dtype(series.dtype()) {
        describe_numeric(series)
    } else {
        Ok(describe_categorical(series))
    }
}

fn describe_numeric(series: &Series) -> PolarsResult<ColumnDescription> {
    let cleaned = clean_numeric_series(series)?;
    let mut values = numeric_values(&cleaned)?;
    sort_values(&mut values);

    let quantile = |q: f64| (!values.is_empty()).then(|| quantile_sorted(&values, q));

    Ok(ColumnDescription::Numeric {
        column: series.name().to_string(),
        count: values.len(),
        mean: cleaned.mean(),
        std: cleaned.std(1),
        min: values.first().copied(),
        q25: quantile(0.25),
        median: quantile(0.5),
        q75: quantile(0.75),
        max: values.last().copied(),
    })
}

fn describe_categorical(series: &Series) -> ColumnDescription {
    let rendered = column_values(series);
    let count = rendered.iter().filter(|v| v.is_some()).count();
    let (top, freq) = match mode_index(&rendered) {
        Some((idx, freq)) => (rendered[idx].clone(), freq),
        None => (None, 0),
    };

    ColumnDescription::Categorical {
        column: series.name().to_string(),
        count,
        unique: distinct_count(&rendered),
        top,
        freq,
    }
}
