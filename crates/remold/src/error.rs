//! Error types for the remold library.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::Stage;
use crate::table::TableError;

/// Main error type for remold operations.
///
/// Every variant is fatal to a pipeline run; nothing here is retried.
#[derive(Debug, Error)]
pub enum RemoldError {
    /// A configured column does not exist at the stage that needs it.
    #[error("Column '{column}' not found during {stage} stage")]
    MissingColumn { column: String, stage: Stage },

    /// The configuration names an operation the registry does not know.
    #[error("Unknown operation '{operation}' configured for column '{column}'")]
    UnknownOperationKind { operation: String, column: String },

    /// A registered operation could not execute against its column.
    #[error("Operation '{operation}' failed on column '{column}': {source}")]
    OperationFailed {
        operation: String,
        column: String,
        #[source]
        source: Box<RemoldError>,
    },

    /// The configuration is structurally invalid.
    #[error("Malformed configuration in {context}: {reason}")]
    ConfigurationMalformed { context: String, reason: String },

    /// An operation received a parameter it cannot use.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The plan references a dataset the extract step did not provide.
    #[error("No raw table was extracted for dataset '{0}'")]
    MissingDataset(String),

    /// The extract collaborator failed.
    #[error("Extract failed for table '{table}': {reason}")]
    Extract { table: String, reason: String },

    /// The load collaborator failed.
    #[error("Load failed for table '{table}': {reason}")]
    Load { table: String, reason: String },

    /// Structural table error (length mismatch, duplicate or missing column).
    #[error(transparent)]
    Table(#[from] TableError),

    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl RemoldError {
    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        RemoldError::ConfigurationMalformed {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RemoldError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for remold operations.
pub type Result<T> = std::result::Result<T, RemoldError>;
