//! CLI entry point for the table cleaner.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use table_cleaner::charts::{ColumnChart, ColumnComparison, column_comparison, missing_values_chart};
use table_cleaner::io::{read_csv_file, write_csv_file};
use table_cleaner::{
    CleanerConfig, CleanerError, CleaningAction, CleaningSession, ColumnDescription, HistoryEntry,
    TableSummary, load_recipe,
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Column-wise data cleaning for CSV tables",
    long_about = "Profile a CSV table and apply cleaning operations to it.\n\n\
                  Operations run one at a time in a fixed order: convert types, remove\n\
                  duplicates, missing values, outliers. A recipe runs its actions in\n\
                  the order given instead.\n\n\
                  EXAMPLES:\n  \
                  # Show a profile of the table\n  \
                  table-cleaner -i data.csv --summary\n\n  \
                  # Dedupe, fill missing ages with the median and cap income\n  \
                  table-cleaner -i data.csv --remove-duplicates --missing median \\\n    \
                  --columns age --outliers income -o cleaned.csv\n\n  \
                  # Run a JSON recipe and print the report as JSON\n  \
                  table-cleaner -i data.csv --recipe recipe.json --json"
)]
struct Args {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: String,

    /// Where to write the cleaned CSV
    ///
    /// Nothing is written if any requested action is rejected
    #[arg(short, long)]
    output: Option<String>,

    /// JSON file with an array of cleaning actions to apply in order
    #[arg(long, conflicts_with_all = ["remove_duplicates", "missing", "outliers", "convert_types"])]
    recipe: Option<String>,

    /// Remove duplicate rows, keeping the first occurrence
    #[arg(long)]
    remove_duplicates: bool,

    /// Missing-value strategy: drop, mean, median or mode
    #[arg(long)]
    missing: Option<String>,

    /// Columns for --missing and --convert-types (comma separated, default all)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Cap outliers in this numeric column (repeatable)
    #[arg(long)]
    outliers: Vec<String>,

    /// Parse numeric text columns and tighten dtypes
    #[arg(long)]
    convert_types: bool,

    /// Print the table profile before and after cleaning
    #[arg(long)]
    summary: bool,

    /// Show the before/after chart data of this column (repeatable)
    #[arg(long)]
    chart: Vec<String>,

    /// IQR multiplier for outlier fences
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// Field separator of the input and output
    #[arg(long, default_value = ",")]
    separator: char,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the result)
    #[arg(short, long)]
    quiet: bool,

    /// Output a JSON report to stdout instead of human-readable text
    ///
    /// Disables all logs so that stdout carries only the report.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Report printed with `--json`.
#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    output: Option<&'a str>,
    original: TableSummary,
    cleaned: TableSummary,
    history: &'a [HistoryEntry],
    charts: Vec<ColumnComparison>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }
    let df = read_csv_file(&args.input, &config)?;

    // Chart columns must exist in the input
    if let Some(column) = args.chart.iter().find(|c| df.column(c.as_str()).is_err()) {
        return Err(CleanerError::ColumnNotFound(column.clone()).into());
    }

    let actions = match &args.recipe {
        Some(recipe) => load_recipe(recipe)?,
        None => actions_from_flags(&args),
    };
    debug!("Planned {} actions", actions.len());

    let mut session = CleaningSession::with_config(df, config.clone())?;
    for action in actions {
        // A rejected action aborts before anything is written
        session.apply(action)?;
    }

    let charts: Vec<ColumnComparison> = args
        .chart
        .iter()
        .filter_map(|column| column_comparison(session.original(), session.current(), column, &config))
        .collect();

    if let Some(output) = &args.output {
        write_csv_file(session.current(), output, &config)
            .with_context(|| format!("Failed to write {}", output))?;
    }

    if args.json {
        let report = Report {
            input: &args.input,
            output: args.output.as_deref(),
            original: session.original_summary(),
            cleaned: session.current_summary(),
            history: session.history(),
            charts,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_history(session.history());
    if args.summary {
        print_summary("ORIGINAL TABLE", &session.original_summary());
        if session.is_modified() {
            print_summary("CLEANED TABLE", &session.current_summary());
        }
        if let Some(bars) = missing_values_chart(session.current()) {
            println!("MISSING VALUES (cleaned)");
            for bar in bars {
                println!("  {:<20} {}", truncate_str(&bar.label, 19), bar.count);
            }
            println!();
        }
    }
    for comparison in &charts {
        print_comparison(comparison);
    }
    for column in args.chart.iter().filter(|c| !charts.iter().any(|cmp| &cmp.column == *c)) {
        println!("Nothing to chart for column '{}'", column);
    }

    if let Some(output) = &args.output {
        info!("Cleaned table written to {}", output);
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<CleanerConfig> {
    let separator = u8::try_from(args.separator)
        .map_err(|_| anyhow!("Separator must be a single ASCII character"))?;
    let config = CleanerConfig::builder()
        .iqr_multiplier(args.iqr_multiplier)
        .separator(separator)
        .build()?;
    Ok(config)
}

/// Actions requested by flags, in the fixed order.
fn actions_from_flags(args: &Args) -> Vec<CleaningAction> {
    let mut actions = Vec::new();

    if args.convert_types {
        actions.push(CleaningAction::ConvertDataTypes {
            columns: args.columns.clone(),
        });
    }
    if args.remove_duplicates {
        actions.push(CleaningAction::RemoveDuplicates);
    }
    if let Some(strategy) = &args.missing {
        actions.push(CleaningAction::HandleMissingValues {
            strategy: strategy.clone(),
            columns: args.columns.clone(),
        });
    }
    for column in &args.outliers {
        actions.push(CleaningAction::HandleOutliers {
            column: column.clone(),
            strategy: "iqr".to_string(),
        });
    }

    actions
}

/// Print applied operations and their notices.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_history(history: &[HistoryEntry]) {
    if history.is_empty() {
        return;
    }

    println!("\n{}", "=".repeat(80));
    println!("CLEANING STEPS");
    println!("{}", "=".repeat(80));
    for entry in history {
        let step = &entry.step;
        println!(
            "  {} ({} -> {} rows)",
            step.operation.display_name(),
            step.rows_before,
            step.rows_after
        );
        for outcome in step.applied() {
            println!("    {}: {}", outcome.column, outcome.reason);
        }
        for notice in step.warnings() {
            println!("    notice: {} {}", notice.column, notice.reason);
        }
    }
    println!();
}

fn print_summary(title: &str, summary: &TableSummary) {
    println!("{}", title);
    println!("{}", "-".repeat(40));
    println!("  Rows: {}", summary.shape.0);
    println!("  Columns: {}", summary.shape.1);
    println!("  Duplicate rows: {}", summary.duplicate_count);
    println!("  Missing cells: {}", summary.total_missing());
    println!();

    println!(
        "{:<20} {:<10} {:<10} {:<12} {:<12}",
        "Column", "Type", "Missing", "Mean/Top", "Std/Freq"
    );
    println!("{}", "-".repeat(70));
    for column in &summary.columns {
        let missing = summary.missing_for(&column.name).unwrap_or(0);
        let (center, spread) = match summary.description_for(&column.name) {
            Some(ColumnDescription::Numeric { mean, std, .. }) => {
                (format_opt(*mean), format_opt(*std))
            }
            Some(ColumnDescription::Categorical { top, freq, .. }) => (
                top.as_deref().map(|t| truncate_str(t, 11)).unwrap_or_else(|| "-".to_string()),
                freq.to_string(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<20} {:<10} {:<10} {:<12} {:<12}",
            truncate_str(&column.name, 19),
            column.dtype,
            missing,
            center,
            spread
        );
    }
    println!();
}

fn print_comparison(comparison: &ColumnComparison) {
    println!("CHART: {}", comparison.column);
    println!("{}", "-".repeat(40));
    print_chart("before", comparison.before.as_ref());
    print_chart("after", comparison.after.as_ref());
    println!();
}

fn print_chart(label: &str, chart: Option<&ColumnChart>) {
    match chart {
        None => println!("  {}: nothing to show", label),
        Some(ColumnChart::Numeric {
            distribution,
            box_plot,
        }) => {
            println!(
                "  {}: min {:.2} | q1 {:.2} | median {:.2} | q3 {:.2} | max {:.2} | {} outliers",
                label,
                box_plot.min,
                box_plot.q1,
                box_plot.median,
                box_plot.q3,
                box_plot.max,
                box_plot.outliers.len()
            );
            let peak = distribution.bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
            for bin in &distribution.bins {
                println!(
                    "    [{:>10.2}, {:>10.2}) {}",
                    bin.start,
                    bin.end,
                    "#".repeat(bin.count * 40 / peak)
                );
            }
        }
        Some(ColumnChart::Categorical(plot)) => {
            println!("  {}: {} values", label, plot.total);
            for category in &plot.categories {
                println!(
                    "    {:<20} {:>6} ({:.1}%)",
                    truncate_str(&category.value, 19),
                    category.count,
                    category.percentage
                );
            }
        }
    }
}

fn format_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
