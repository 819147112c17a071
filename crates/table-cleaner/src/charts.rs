//! Chart data for the before/after views.
//!
//! Every builder returns `None` when there is nothing to show: an empty table,
//! an unknown column, a column of the wrong dtype or a column without values.
//! Rendering is left to the caller.

use crate::config::CleanerConfig;
use crate::cleaner::IqrBounds;
use crate::utils::{
    DtypeCategory, column_values, numeric_values, quantile_sorted, series_dtype_category,
    sort_values,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Label of the bar that aggregates categories beyond the top N.
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionChart {
    pub column: String,
    /// Number of values binned.
    pub count: usize,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlot {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values still inside the IQR fences.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    /// Values outside the fences, ascending.
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountPlot {
    pub column: String,
    /// Number of non-missing values counted.
    pub total: usize,
    pub categories: Vec<CategoryCount>,
}

/// The chart appropriate to a column's dtype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnChart {
    Numeric {
        distribution: DistributionChart,
        box_plot: BoxPlot,
    },
    Categorical(CountPlot),
}

/// Side-by-side view of one column before and after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnComparison {
    pub column: String,
    pub before: Option<ColumnChart>,
    pub after: Option<ColumnChart>,
}

/// Bars for the columns that have missing values, fewest first.
pub fn missing_values_chart(df: &DataFrame) -> Option<Vec<Bar>> {
    let mut bars: Vec<Bar> = df
        .get_columns()
        .iter()
        .filter(|col| col.null_count() > 0)
        .map(|col| Bar {
            label: col.name().to_string(),
            count: col.null_count(),
        })
        .collect();

    if bars.is_empty() {
        debug!("No missing values to chart");
        return None;
    }

    bars.sort_by_key(|bar| bar.count);
    Some(bars)
}

/// Equal-width histogram of a numeric column.
///
/// `bins` is raised to one if zero. A constant column produces a single bin.
pub fn distribution_chart(df: &DataFrame, column: &str, bins: usize) -> Option<DistributionChart> {
    let mut values = chart_numeric_values(df, column)?;
    sort_values(&mut values);

    Some(DistributionChart {
        column: column.to_string(),
        count: values.len(),
        bins: build_histogram(&values, bins),
    })
}

/// Five-number summary with whiskers and outliers of a numeric column.
pub fn box_plot(df: &DataFrame, column: &str, iqr_multiplier: f64) -> Option<BoxPlot> {
    let mut values = chart_numeric_values(df, column)?;
    sort_values(&mut values);
    let bounds = IqrBounds::from_sorted(&values, iqr_multiplier)?;

    let inside = values.iter().copied().filter(|v| bounds.contains(*v));
    let (lower_whisker, upper_whisker) = inside.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    let outliers = values.iter().copied().filter(|v| !bounds.contains(*v)).collect();

    Some(BoxPlot {
        column: column.to_string(),
        min: *values.first()?,
        q1: bounds.q1,
        median: quantile_sorted(&values, 0.5),
        q3: bounds.q3,
        max: *values.last()?,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Category counts of a text, categorical or boolean column.
///
/// Categories are ordered by count, most frequent first, ties in order of first
/// appearance. Categories beyond `top_n` are folded into one
/// [`OTHER_LABEL`] bar.
pub fn count_plot(df: &DataFrame, column: &str, top_n: usize) -> Option<CountPlot> {
    if top_n == 0 {
        warn!("Count plot for {} requested with top_n = 0", column);
        return None;
    }

    let series = df.column(column).ok()?.as_materialized_series();
    if !matches!(
        series_dtype_category(series),
        DtypeCategory::String | DtypeCategory::Boolean
    ) {
        debug!("Column {} is not categorical; no count plot", column);
        return None;
    }

    let mut order: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for value in column_values(series).into_iter().flatten() {
        match positions.get(&value) {
            Some(&pos) => order[pos].1 += 1,
            None => {
                positions.insert(value.clone(), order.len());
                order.push((value, 1));
            }
        }
    }

    let total: usize = order.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return None;
    }

    // Stable sort keeps first-appearance order among equal counts
    order.sort_by(|a, b| b.1.cmp(&a.1));
    let other: usize = order.iter().skip(top_n).map(|(_, count)| count).sum();
    order.truncate(top_n);
    if other > 0 {
        order.push((OTHER_LABEL.to_string(), other));
    }

    let categories = order
        .into_iter()
        .map(|(value, count)| CategoryCount {
            value,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();

    Some(CountPlot {
        column: column.to_string(),
        total,
        categories,
    })
}

/// The dtype-appropriate chart of one column.
pub fn column_chart(df: &DataFrame, column: &str, config: &CleanerConfig) -> Option<ColumnChart> {
    let series = df.column(column).ok()?.as_materialized_series();
    match series_dtype_category(series) {
        DtypeCategory::Numeric => Some(ColumnChart::Numeric {
            distribution: distribution_chart(df, column, config.histogram_bins)?,
            box_plot: box_plot(df, column, config.iqr_multiplier)?,
        }),
        DtypeCategory::String | DtypeCategory::Boolean => {
            count_plot(df, column, config.top_categories).map(ColumnChart::Categorical)
        }
        DtypeCategory::Datetime | DtypeCategory::Other => None,
    }
}

/// Charts of `column` in the table before and after cleaning.
///
/// Either side may be `None`, e.g. when cleaning turned a text column numeric
/// or dropped every row. Returns `None` only when neither side has a chart.
pub fn column_comparison(
    before: &DataFrame,
    after: &DataFrame,
    column: &str,
    config: &CleanerConfig,
) -> Option<ColumnComparison> {
    let comparison = ColumnComparison {
        column: column.to_string(),
        before: column_chart(before, column, config),
        after: column_chart(after, column, config),
    };

    if comparison.before.is_none() && comparison.after.is_none() {
        return None;
    }
    Some(comparison)
}

fn chart_numeric_values(df: &DataFrame, column: &str) -> Option<Vec<f64>> {
    let series = df.column(column).ok()?.as_materialized_series();
    if series_dtype_category(series) != DtypeCategory::Numeric {
        debug!("Column {} is not numeric; nothing to chart", column);
        return None;
    }
    let values = numeric_values(series).ok()?;
    (!values.is_empty()).then_some(values)
}

fn build_histogram(sorted: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let bin_count = bins.max(1);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for value in sorted {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: min + (idx as f64 + 1.0) * width,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DataFrame {
        df![
            "value" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(100.0), None],
            "city" => [Some("NY"), Some("LA"), Some("SF"), Some("LA"), None, Some("NY")],
            "flag" => [Some(true), None, Some(false), Some(true), Some(true), None],
        ]
        .unwrap()
    }

    #[test]
    fn test_missing_values_chart_sorted_ascending() {
        let bars = missing_values_chart(&sample()).unwrap();
        assert_eq!(
            bars,
            vec![
                Bar {
                    label: "value".to_string(),
                    count: 1
                },
                Bar {
                    label: "city".to_string(),
                    count: 1
                },
                Bar {
                    label: "flag".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_missing_values_chart_none_when_complete() {
        let df = df!["a" => [1, 2]].unwrap();
        assert!(missing_values_chart(&df).is_none());
        assert!(missing_values_chart(&DataFrame::empty()).is_none());
    }

    #[test]
    fn test_distribution_chart_bins() {
        let chart = distribution_chart(&sample(), "value", 4).unwrap();

        assert_eq!(chart.count, 5);
        assert_eq!(chart.bins.len(), 4);
        assert_eq!(chart.bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(chart.bins[0].count, 4);
        assert_eq!(chart.bins[3].count, 1);
        assert_eq!(chart.bins[3].end, 100.0);
    }

    #[test]
    fn test_distribution_chart_constant_column() {
        let df = df!["c" => [5.0, 5.0, 5.0]].unwrap();
        let chart = distribution_chart(&df, "c", 10).unwrap();
        assert_eq!(chart.bins.len(), 1);
        assert_eq!(chart.bins[0].count, 3);
    }

    #[test]
    fn test_distribution_chart_nothing_to_show() {
        assert!(distribution_chart(&sample(), "city", 10).is_none());
        assert!(distribution_chart(&sample(), "missing", 10).is_none());
        let empty = df!["x" => [Option::<f64>::None]].unwrap();
        assert!(distribution_chart(&empty, "x", 10).is_none());
    }

    #[test]
    fn test_box_plot() {
        let plot = box_plot(&sample(), "value", 1.5).unwrap();

        assert_eq!(plot.min, 1.0);
        assert_eq!(plot.q1, 2.0);
        assert_eq!(plot.median, 3.0);
        assert_eq!(plot.q3, 4.0);
        assert_eq!(plot.max, 100.0);
        assert_eq!(plot.lower_whisker, 1.0);
        assert_eq!(plot.upper_whisker, 4.0);
        assert_eq!(plot.outliers, vec![100.0]);
    }

    #[test]
    fn test_count_plot_orders_by_count_then_appearance() {
        let plot = count_plot(&sample(), "city", 10).unwrap();

        assert_eq!(plot.total, 5);
        let labels: Vec<&str> = plot.categories.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(labels, vec!["NY", "LA", "SF"]);
        assert_eq!(plot.categories[0].count, 2);
        assert!((plot.categories[2].percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_count_plot_folds_other() {
        let plot = count_plot(&sample(), "city", 1).unwrap();

        assert_eq!(plot.categories.len(), 2);
        assert_eq!(plot.categories[0].value, "NY");
        assert_eq!(plot.categories[1].value, OTHER_LABEL);
        assert_eq!(plot.categories[1].count, 3);
    }

    #[test]
    fn test_count_plot_boolean_and_rejections() {
        let plot = count_plot(&sample(), "flag", 5).unwrap();
        assert_eq!(plot.categories[0].value, "true");
        assert_eq!(plot.categories[0].count, 3);

        assert!(count_plot(&sample(), "city", 0).is_none());
        assert!(count_plot(&sample(), "value", 5).is_none());
    }

    #[test]
    fn test_column_comparison_after_conversion() {
        let before = df!["n" => ["1", "2", "2"]].unwrap();
        let after = df!["n" => [1i64, 2, 2]].unwrap();

        let comparison = column_comparison(&before, &after, "n", &CleanerConfig::default()).unwrap();
        assert!(matches!(comparison.before, Some(ColumnChart::Categorical(_))));
        assert!(matches!(comparison.after, Some(ColumnChart::Numeric { .. })));

        assert!(column_comparison(&before, &after, "zip", &CleanerConfig::default()).is_none());
    }
}
