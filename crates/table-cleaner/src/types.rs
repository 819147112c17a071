use crate::config::{MissingStrategy, OutlierStrategy};
use serde::{Deserialize, Serialize};

// ============================================================================
// Summary Types
// ============================================================================

/// Read-only profile of a table, computed fresh on each request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    /// (rows, columns)
    pub shape: (usize, usize),
    /// Column name, dtype and non-null count, in table order.
    pub columns: Vec<ColumnInfo>,
    /// Missing-value count per column, in table order.
    pub missing_values: Vec<MissingCount>,
    /// Rows that repeat an earlier row under full-row equality.
    pub duplicate_count: usize,
    /// Descriptive statistics per column. Empty for a table without rows.
    pub description: Vec<ColumnDescription>,
}

impl TableSummary {
    /// A well-formed summary of a table with no rows and no columns.
    pub fn empty() -> Self {
        Self {
            shape: (0, 0),
            columns: Vec::new(),
            missing_values: Vec::new(),
            duplicate_count: 0,
            description: Vec::new(),
        }
    }

    /// Total number of missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.missing_values.iter().map(|m| m.count).sum()
    }

    /// Missing-value count of one column.
    pub fn missing_for(&self, column: &str) -> Option<usize> {
        self.missing_values
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.count)
    }

    /// Descriptive statistics of one column.
    pub fn description_for(&self, column: &str) -> Option<&ColumnDescription> {
        self.description.iter().find(|d| d.column() == column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

/// Descriptive statistics of a single column.
///
/// Numeric columns get central tendency and spread; every other column
/// degrades to the categorical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnDescription {
    Numeric {
        column: String,
        count: usize,
        mean: Option<f64>,
        std: Option<f64>,
        min: Option<f64>,
        q25: Option<f64>,
        median: Option<f64>,
        q75: Option<f64>,
        max: Option<f64>,
    },
    Categorical {
        column: String,
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: usize,
    },
}

impl ColumnDescription {
    pub fn column(&self) -> &str {
        match self {
            Self::Numeric { column, .. } | Self::Categorical { column, .. } => column,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Numeric { count, .. } | Self::Categorical { count, .. } => *count,
        }
    }
}

// ============================================================================
// Audit Trail Types
// ============================================================================

/// The operation a [`CleaningStep`] records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum CleaningOperation {
    RemoveDuplicates,
    HandleMissingValues { strategy: MissingStrategy },
    HandleOutliers { column: String, strategy: OutlierStrategy },
    ConvertDataTypes,
}

impl CleaningOperation {
    pub fn display_name(&self) -> String {
        match self {
            Self::RemoveDuplicates => "Remove duplicates".to_string(),
            Self::HandleMissingValues { strategy } => {
                format!("Handle missing values ({})", strategy)
            }
            Self::HandleOutliers { column, strategy } => {
                format!("Handle outliers in '{}' ({})", column, strategy)
            }
            Self::ConvertDataTypes => "Convert data types".to_string(),
        }
    }
}

/// What happened to one column during an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The column was modified.
    Applied,
    /// Nothing needed doing (e.g. no missing values).
    Unchanged,
    /// The column was passed over with a warning.
    Skipped,
    /// An unexpected failure; the column was left as it was.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOutcome {
    pub column: String,
    pub status: OutcomeStatus,
    pub reason: String,
}

impl ColumnOutcome {
    pub fn applied(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(column, OutcomeStatus::Applied, reason)
    }

    pub fn unchanged(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(column, OutcomeStatus::Unchanged, reason)
    }

    pub fn skipped(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(column, OutcomeStatus::Skipped, reason)
    }

    pub fn failed(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(column, OutcomeStatus::Failed, reason)
    }

    fn new(column: impl Into<String>, status: OutcomeStatus, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Skipped and failed outcomes are surfaced to the operator as notices.
    pub fn is_warning(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped | OutcomeStatus::Failed)
    }
}

/// Audit record of one cleaning operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningStep {
    pub operation: CleaningOperation,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub outcomes: Vec<ColumnOutcome>,
}

impl CleaningStep {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    pub fn applied(&self) -> impl Iterator<Item = &ColumnOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Applied)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ColumnOutcome> {
        self.outcomes.iter().filter(|o| o.is_warning())
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}
