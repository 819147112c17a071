//! Error types for the table cleaner.
//!
//! Only structurally wrong requests surface as errors. Conditions such as an
//! unknown column or a column of the wrong type are not errors: they are
//! recorded as skipped [`ColumnOutcome`](crate::types::ColumnOutcome)s and the
//! operation carries on.
//!
//! Errors are serializable so a front-end can display them as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the table cleaner.
#[derive(Error, Debug)]
pub enum CleanerError {
    /// Caller passed a structurally wrong request (unknown strategy name,
    /// malformed column list).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Delimited-text input could not be parsed into a table.
    #[error("Failed to read table: {0}")]
    Ingestion(String),

    /// Table could not be serialized to delimited text.
    #[error("Failed to export table: {0}")]
    Export(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The cleaner broke one of its own guarantees; not caused by the request.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleanerError>,
    },
}

impl CleanerError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleanerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Ingestion(_) => "INGESTION_FAILED",
            Self::Export(_) => "EXPORT_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a rejected request rather than a data or IO failure.
    ///
    /// The presentation layer treats these as fatal to the current action only;
    /// previously persisted state stays valid.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Self::InvalidArgument(_) => true,
            Self::WithContext { source, .. } => source.is_invalid_argument(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleanerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleanerError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for table cleaner operations.
pub type Result<T> = std::result::Result<T, CleanerError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleanerError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::io::Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleanerError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleanerError::InvalidArgument("bad".to_string()).error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            CleanerError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_is_invalid_argument() {
        assert!(CleanerError::InvalidArgument("x".to_string()).is_invalid_argument());
        assert!(!CleanerError::Ingestion("x".to_string()).is_invalid_argument());
        assert!(
            CleanerError::InvalidArgument("x".to_string())
                .with_context("Applying action")
                .is_invalid_argument()
        );
    }

    #[test]
    fn test_internal_error_is_not_a_rejected_request() {
        let error = CleanerError::Internal("no cleaning step recorded".to_string())
            .with_context("Applying remove_duplicates");
        assert_eq!(error.error_code(), "INTERNAL_ERROR");
        assert!(!error.is_invalid_argument());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleanerError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = CleanerError::InvalidArgument("strategy".to_string())
            .with_context("During missing-value handling");
        assert!(error.to_string().contains("During missing-value handling"));
        assert_eq!(error.error_code(), "INVALID_ARGUMENT");
    }
}
