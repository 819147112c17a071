//! Type conversion functions for data cleaning.

use crate::utils::{is_float_dtype, parse_boolean_string};
use polars::prelude::*;

/// Parse a text column as numbers.
///
/// Succeeds only if every non-missing value parses; otherwise the column is
/// not numeric and `None` is returned. Non-text columns and columns without
/// any value also return `None`.
///
/// Columns of whole numbers become Int64 so that values beyond 2^53 keep
/// every digit; anything else becomes Float64.
pub(crate) fn string_to_numeric(series: &Series) -> PolarsResult<Option<Series>> {
    if series.dtype() != &DataType::String {
        return Ok(None);
    }

    let str_series = series.str()?;
    if str_series.null_count() == str_series.len() {
        return Ok(None);
    }

    if let Some(ints) = parse_all::<i64>(str_series) {
        return Ok(Some(Series::new(series.name().clone(), ints)));
    }

    Ok(parse_all::<f64>(str_series).map(|floats| Series::new(series.name().clone(), floats)))
}

/// Parse every non-missing value, or `None` if any of them fails.
fn parse_all<T: std::str::FromStr>(ca: &StringChunked) -> Option<Vec<Option<T>>> {
    ca.into_iter()
        .map(|opt_val| match opt_val {
            Some(val) => val.trim().parse::<T>().ok().map(Some),
            None => Some(None),
        })
        .collect()
}

/// Narrow a column to a tighter dtype if all its values allow it.
///
/// - float columns holding only integral values become Int64
/// - text columns holding only boolean-like values become Boolean
///
/// Returns the narrowed column and the name of its new dtype.
pub(crate) fn tighten_column(series: &Series) -> PolarsResult<Option<(Series, &'static str)>> {
    if is_float_dtype(series.dtype()) {
        return Ok(float_to_integer(series)?.map(|s| (s, "i64")));
    }

    if series.dtype() == &DataType::String {
        return Ok(string_to_boolean(series)?.map(|s| (s, "bool")));
    }

    Ok(None)
}

fn float_to_integer(series: &Series) -> PolarsResult<Option<Series>> {
    const LIMIT: f64 = i64::MAX as f64;

    let casted = series.cast(&DataType::Float64)?;
    let float_series = casted.f64()?;
    let mut result_vec: Vec<Option<i64>> = Vec::with_capacity(float_series.len());
    let mut saw_value = false;

    for opt_val in float_series.into_iter() {
        match opt_val {
            Some(val) if val.is_finite() && val.fract() == 0.0 && val.abs() < LIMIT => {
                saw_value = true;
                result_vec.push(Some(val as i64));
            }
            Some(_) => return Ok(None),
            None => result_vec.push(None),
        }
    }

    if !saw_value {
        return Ok(None);
    }

    Ok(Some(Series::new(series.name().clone(), result_vec)))
}

fn string_to_boolean(series: &Series) -> PolarsResult<Option<Series>> {
    let str_series = series.str()?;
    let mut result_vec: Vec<Option<bool>> = Vec::with_capacity(str_series.len());
    let mut saw_value = false;

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) => match parse_boolean_string(val) {
                Some(b) => {
                    saw_value = true;
                    result_vec.push(Some(b));
                }
                None => return Ok(None),
            },
            None => result_vec.push(None),
        }
    }

    if !saw_value {
        return Ok(None);
    }

    Ok(Some(Series::new(series.name().clone(), result_vec)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // string_to_numeric() tests
    // ========================================================================

    #[test]
    fn test_string_to_numeric_all_parse() {
        let series = Series::new("values".into(), &[Some("1.5"), None, Some(" 3 ")]);
        let result = string_to_numeric(&series).unwrap().unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        let ca = result.f64().unwrap();
        assert_eq!(ca.get(0), Some(1.5));
        assert_eq!(ca.get(1), None);
        assert_eq!(ca.get(2), Some(3.0));
    }

    #[test]
    fn test_string_to_numeric_keeps_large_integers_exact() {
        let series = Series::new("id".into(), &["9007199254740993", "12345678901234567"]);
        let result = string_to_numeric(&series).unwrap().unwrap();

        assert_eq!(result.dtype(), &DataType::Int64);
        let ca = result.i64().unwrap();
        assert_eq!(ca.get(0), Some(9_007_199_254_740_993));
        assert_eq!(ca.get(1), Some(12_345_678_901_234_567));
    }

    #[test]
    fn test_string_to_numeric_whole_numbers_become_integers() {
        let series = Series::new("n".into(), &[Some(" 7"), None, Some("-3")]);
        let result = string_to_numeric(&series).unwrap().unwrap();

        assert_eq!(result.dtype(), &DataType::Int64);
        let ca = result.i64().unwrap();
        assert_eq!(ca.get(0), Some(7));
        assert_eq!(ca.get(1), None);
        assert_eq!(ca.get(2), Some(-3));
    }

    #[test]
    fn test_string_to_numeric_mixed_integer_and_decimal() {
        let series = Series::new("n".into(), &["1", "2.5"]);
        let result = string_to_numeric(&series).unwrap().unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        let ca = result.f64().unwrap();
        assert_eq!(ca.get(0), Some(1.0));
        assert_eq!(ca.get(1), Some(2.5));
    }

    #[test]
    fn test_string_to_numeric_one_bad_value_leaves_column() {
        let series = Series::new("values".into(), &["1", "2", "three"]);
        assert!(string_to_numeric(&series).unwrap().is_none());
    }

    #[test]
    fn test_string_to_numeric_ignores_non_text() {
        let series = Series::new("values".into(), &[1i64, 2, 3]);
        assert!(string_to_numeric(&series).unwrap().is_none());
    }

    #[test]
    fn test_string_to_numeric_all_null() {
        let series = Series::new("values".into(), &[Option::<&str>::None, None]);
        assert!(string_to_numeric(&series).unwrap().is_none());
    }

    // ========================================================================
    // tighten_column() tests
    // ========================================================================

    #[test]
    fn test_tighten_integral_floats() {
        let series = Series::new("n".into(), &[Some(1.0), None, Some(42.0)]);
        let (result, dtype) = tighten_column(&series).unwrap().unwrap();

        assert_eq!(dtype, "i64");
        assert_eq!(result.dtype(), &DataType::Int64);
        assert_eq!(result.i64().unwrap().get(2), Some(42));
        assert_eq!(result.null_count(), 1);
    }

    #[test]
    fn test_tighten_keeps_fractional_floats() {
        let series = Series::new("n".into(), &[1.0, 2.5]);
        assert!(tighten_column(&series).unwrap().is_none());
    }

    #[test]
    fn test_tighten_keeps_nan_floats() {
        let series = Series::new("n".into(), &[1.0, f64::NAN]);
        assert!(tighten_column(&series).unwrap().is_none());
    }

    #[test]
    fn test_tighten_boolean_strings() {
        let series = Series::new("flag".into(), &[Some("Yes"), Some("no"), None, Some("TRUE")]);
        let (result, dtype) = tighten_column(&series).unwrap().unwrap();

        assert_eq!(dtype, "bool");
        let ca = result.bool().unwrap();
        assert_eq!(ca.get(0), Some(true));
        assert_eq!(ca.get(1), Some(false));
        assert_eq!(ca.get(2), None);
        assert_eq!(ca.get(3), Some(true));
    }

    #[test]
    fn test_tighten_leaves_mixed_strings() {
        let series = Series::new("flag".into(), &["yes", "maybe"]);
        assert!(tighten_column(&series).unwrap().is_none());
    }

    #[test]
    fn test_tighten_leaves_integers() {
        let series = Series::new("n".into(), &[1i64, 2]);
        assert!(tighten_column(&series).unwrap().is_none());
    }
}
