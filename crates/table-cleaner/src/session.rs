//! Interactive cleaning session.
//!
//! A [`CleaningSession`] keeps the table as loaded and the current cleaned
//! table. Each [`apply`](CleaningSession::apply) runs exactly one operation on
//! a fresh [`TableCleaner`] built from the current table and persists the
//! result only on success, so a rejected action leaves the session as it was.

use crate::cleaner::TableCleaner;
use crate::config::{CleanerConfig, MissingStrategy, OutlierStrategy};
use crate::error::{CleanerError, Result, ResultExt};
use crate::io::write_csv_bytes;
use crate::profiler::DataProfiler;
use crate::types::{CleaningStep, TableSummary};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_outlier_strategy() -> String {
    OutlierStrategy::default().as_str().to_string()
}

/// One user-requested cleaning operation.
///
/// Strategy names stay strings until applied so that an unknown name is
/// reported as an invalid argument of that action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CleaningAction {
    RemoveDuplicates,
    HandleMissingValues {
        strategy: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<Vec<String>>,
    },
    HandleOutliers {
        column: String,
        #[serde(default = "default_outlier_strategy")]
        strategy: String,
    },
    ConvertDataTypes {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<Vec<String>>,
    },
}

impl CleaningAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "remove_duplicates",
            Self::HandleMissingValues { .. } => "handle_missing_values",
            Self::HandleOutliers { .. } => "handle_outliers",
            Self::ConvertDataTypes { .. } => "convert_data_types",
        }
    }

    /// Parse a single action from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CleanerError::InvalidArgument(format!("invalid action: {}", e)))
    }

    /// Run this action on `cleaner`.
    ///
    /// Strategy names are validated before anything is touched.
    pub fn apply_to(&self, cleaner: &mut TableCleaner) -> Result<()> {
        match self {
            Self::RemoveDuplicates => {
                cleaner.remove_duplicates();
            }
            Self::HandleMissingValues { strategy, columns } => {
                let strategy: MissingStrategy = strategy.parse()?;
                let columns = borrow_columns(columns.as_deref());
                cleaner.handle_missing_values(strategy, columns.as_deref());
            }
            Self::HandleOutliers { column, strategy } => {
                let strategy: OutlierStrategy = strategy.parse()?;
                cleaner.handle_outliers(column, strategy);
            }
            Self::ConvertDataTypes { columns } => {
                let columns = borrow_columns(columns.as_deref());
                cleaner.convert_data_types(columns.as_deref());
            }
        }
        Ok(())
    }
}

fn borrow_columns(columns: Option<&[String]>) -> Option<Vec<&str>> {
    columns.map(|cols| cols.iter().map(String::as_str).collect())
}

/// Read a recipe: a JSON array of [`CleaningAction`]s applied in order.
pub fn load_recipe(path: impl AsRef<Path>) -> Result<Vec<CleaningAction>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).context(format!("Reading recipe {}", path.display()))?;
    parse_recipe(&text)
}

/// Parse a recipe from JSON text.
pub fn parse_recipe(json: &str) -> Result<Vec<CleaningAction>> {
    serde_json::from_str(json)
        .map_err(|e| CleanerError::InvalidArgument(format!("invalid recipe: {}", e)))
}

/// A successfully applied action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub applied_at: DateTime<Utc>,
    pub action: CleaningAction,
    pub step: CleaningStep,
}

/// Original and current table plus the history of applied actions.
#[derive(Debug, Clone)]
pub struct CleaningSession {
    original: DataFrame,
    current: DataFrame,
    config: CleanerConfig,
    history: Vec<HistoryEntry>,
}

static_assertions::assert_impl_all!(CleaningSession: Send, Sync);

impl CleaningSession {
    pub fn new(df: DataFrame) -> Self {
        Self {
            current: df.clone(),
            original: df,
            config: CleanerConfig::default(),
            history: Vec::new(),
        }
    }

    pub fn with_config(df: DataFrame, config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Self::new(df);
        session.config = config;
        Ok(session)
    }

    /// The table as loaded.
    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    /// The table after every applied action.
    pub fn current(&self) -> &DataFrame {
        &self.current
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_modified(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn original_summary(&self) -> TableSummary {
        DataProfiler::summarize(&self.original)
    }

    pub fn current_summary(&self) -> TableSummary {
        DataProfiler::summarize(&self.current)
    }

    /// Apply one action to the current table.
    ///
    /// On error the current table and the history are unchanged.
    pub fn apply(&mut self, action: CleaningAction) -> Result<&CleaningStep> {
        let mut cleaner = TableCleaner::with_config(&self.current, self.config.clone())?;
        action
            .apply_to(&mut cleaner)
            .map_err(|e| e.with_context(format!("Applying {}", action.name())))?;

        let step = cleaner.take_steps().pop().ok_or_else(|| {
            CleanerError::Internal(format!("{} recorded no cleaning step", action.name()))
        })?;
        self.current = cleaner.into_inner();

        info!(
            "Applied {}: {} -> {} rows",
            action.name(),
            step.rows_before,
            step.rows_after
        );
        self.history.push(HistoryEntry {
            applied_at: Utc::now(),
            action,
            step,
        });

        let entry = self.history.len() - 1;
        Ok(&self.history[entry].step)
    }

    /// Apply actions in order, stopping at the first error.
    ///
    /// Actions before the failing one stay applied.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = CleaningAction>) -> Result<usize> {
        let mut applied = 0;
        for action in actions {
            self.apply(action)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Discard every applied action.
    pub fn reset(&mut self) {
        info!("Resetting session ({} actions discarded)", self.history.len());
        self.current = self.original.clone();
        self.history.clear();
    }

    /// The current table as delimited text.
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        write_csv_bytes(&self.current, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CleaningOperation;
    use pretty_assertions::assert_eq;

    fn people() -> DataFrame {
        df![
            "age" => [Some(25i64), None, Some(30), Some(25)],
            "city" => ["NY", "NY", "LA", "NY"],
        ]
        .unwrap()
    }

    #[test]
    fn test_action_json_shapes() {
        let action = CleaningAction::from_json(r#"{"action": "handle_outliers", "column": "age"}"#).unwrap();
        assert_eq!(
            action,
            CleaningAction::HandleOutliers {
                column: "age".to_string(),
                strategy: "iqr".to_string(),
            }
        );

        let action = CleaningAction::from_json(r#"{"action": "convert_data_types"}"#).unwrap();
        assert_eq!(action, CleaningAction::ConvertDataTypes { columns: None });
    }

    #[test]
    fn test_columns_must_be_a_list() {
        let err = CleaningAction::from_json(
            r#"{"action": "handle_missing_values", "strategy": "mean", "columns": "age"}"#,
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_apply_persists_and_records_history() {
        let mut session = CleaningSession::new(people());

        let step = session.apply(CleaningAction::RemoveDuplicates).unwrap();
        assert_eq!(step.rows_removed(), 1);

        session
            .apply(CleaningAction::HandleMissingValues {
                strategy: "mean".to_string(),
                columns: Some(vec!["age".to_string()]),
            })
            .unwrap();

        assert_eq!(session.current().height(), 3);
        assert_eq!(session.current().column("age").unwrap().null_count(), 0);
        assert_eq!(session.original().height(), 4);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].step.operation, CleaningOperation::RemoveDuplicates);
        assert!(session.history()[0].applied_at <= session.history()[1].applied_at);
    }

    #[test]
    fn test_unknown_strategy_leaves_session_untouched() {
        let mut session = CleaningSession::new(people());
        session.apply(CleaningAction::RemoveDuplicates).unwrap();

        let err = session
            .apply(CleaningAction::HandleMissingValues {
                strategy: "interpolate".to_string(),
                columns: None,
            })
            .unwrap_err();

        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("handle_missing_values"));
        assert_eq!(session.current().height(), 3);
        assert_eq!(session.history().len(), 1);

        let err = session
            .apply(CleaningAction::HandleOutliers {
                column: "age".to_string(),
                strategy: "zscore".to_string(),
            })
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_reset_restores_original() {
        let mut session = CleaningSession::new(people());
        session
            .apply(CleaningAction::HandleMissingValues {
                strategy: "drop".to_string(),
                columns: None,
            })
            .unwrap();
        assert!(session.is_modified());
        assert_eq!(session.current_summary().shape, (3, 2));

        session.reset();

        assert!(!session.is_modified());
        assert!(session.current().equals_missing(session.original()));
        assert_eq!(session.current_summary(), session.original_summary());
    }

    #[test]
    fn test_apply_all_stops_at_first_error() {
        let recipe = parse_recipe(
            r#"[
                {"action": "remove_duplicates"},
                {"action": "handle_missing_values", "strategy": "bogus"},
                {"action": "convert_data_types"}
            ]"#,
        )
        .unwrap();

        let mut session = CleaningSession::new(people());
        assert!(session.apply_all(recipe).is_err());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_parse_recipe_rejects_non_array() {
        let err = parse_recipe(r#"{"action": "remove_duplicates"}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }
}
