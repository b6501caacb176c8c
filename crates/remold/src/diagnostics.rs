//! Diagnostics handle passed into the engine and the operation registry.
//!
//! The engine never logs through a global; it reports [`StageEvent`]s to a
//! [`DiagnosticsSink`]. [`TracingSink`] forwards them to `tracing`, and
//! [`CapturingSink`] keeps them in memory so tests can assert on them.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::engine::Stage;

/// Something worth reporting while a table is transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    /// The extract step produced a raw table.
    TableExtracted {
        dataset: String,
        source_table: String,
        rows: usize,
    },

    /// The load step accepted a clean table.
    TableLoaded {
        dataset: String,
        destination: String,
        rows: usize,
    },

    /// A dataset entered the engine.
    TableStarted { dataset: String, rows: usize, columns: usize },

    /// A stage finished for a dataset.
    StageCompleted {
        dataset: String,
        stage: Stage,
        rows: usize,
        columns: usize,
    },

    /// An operation ran against a column.
    OperationApplied {
        dataset: String,
        operation: String,
        column: String,
    },

    /// The registry ran an operation.
    OperationInvoked {
        operation: String,
        column: String,
        parameter: String,
        rows_before: usize,
        rows_after: usize,
    },

    /// An operation was disabled by a falsy parameter.
    OperationSkipped {
        dataset: String,
        operation: String,
        column: String,
    },

    /// A clean table was written to the diagnostic export directory.
    TableExported { dataset: String, path: String },

    /// A dataset left the engine.
    TableFinished {
        dataset: String,
        destination: String,
        rows: usize,
    },

    /// A failure that aborts the run.
    Failed {
        dataset: String,
        operation: Option<String>,
        column: Option<String>,
        error: String,
    },
}

impl fmt::Display for StageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageEvent::TableExtracted {
                dataset,
                source_table,
                rows,
            } => write!(f, "[{}] extracted {} rows from '{}'", dataset, rows, source_table),
            StageEvent::TableLoaded {
                dataset,
                destination,
                rows,
            } => write!(f, "[{}] loaded {} rows into '{}'", dataset, rows, destination),
            StageEvent::TableStarted { dataset, rows, columns } => {
                write!(f, "[{}] started with {} rows, {} columns", dataset, rows, columns)
            }
            StageEvent::StageCompleted {
                dataset,
                stage,
                rows,
                columns,
            } => write!(
                f,
                "[{}] {} complete: {} rows, {} columns",
                dataset, stage, rows, columns
            ),
            StageEvent::OperationApplied {
                dataset,
                operation,
                column,
            } => write!(f, "[{}] applied '{}' to '{}'", dataset, operation, column),
            StageEvent::OperationInvoked {
                operation,
                column,
                parameter,
                rows_before,
                rows_after,
            } => write!(
                f,
                "'{}' ({}) on '{}': {} -> {} rows",
                operation, parameter, column, rows_before, rows_after
            ),
            StageEvent::OperationSkipped {
                dataset,
                operation,
                column,
            } => write!(f, "[{}] skipped disabled '{}' on '{}'", dataset, operation, column),
            StageEvent::TableExported { dataset, path } => {
                write!(f, "[{}] exported to {}", dataset, path)
            }
            StageEvent::TableFinished {
                dataset,
                destination,
                rows,
            } => write!(f, "[{}] finished as '{}' with {} rows", dataset, destination, rows),
            StageEvent::Failed { dataset, error, .. } => {
                write!(f, "[{}] failed: {}", dataset, error)
            }
        }
    }
}

/// Receiver for [`StageEvent`]s.
pub trait DiagnosticsSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: &StageEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &StageEvent) {
        match event {
            StageEvent::TableExtracted {
                dataset,
                source_table,
                rows,
            } => {
                tracing::info!(dataset = %dataset, source_table = %source_table, rows, "table extracted");
            }
            StageEvent::TableLoaded {
                dataset,
                destination,
                rows,
            } => {
                tracing::info!(dataset = %dataset, destination = %destination, rows, "table loaded");
            }
            StageEvent::TableStarted { dataset, rows, columns } => {
                tracing::info!(dataset = %dataset, rows, columns, "transforming table");
            }
            StageEvent::StageCompleted {
                dataset,
                stage,
                rows,
                columns,
            } => {
                tracing::debug!(dataset = %dataset, stage = %stage, rows, columns, "stage complete");
            }
            StageEvent::OperationApplied {
                dataset,
                operation,
                column,
            } => {
                tracing::debug!(dataset = %dataset, operation = %operation, column = %column, "operation applied");
            }
            StageEvent::OperationInvoked {
                operation,
                column,
                parameter,
                rows_before,
                rows_after,
            } => {
                tracing::trace!(
                    operation = %operation,
                    column = %column,
                    parameter = %parameter,
                    rows_before,
                    rows_after,
                    "operation invoked"
                );
            }
            StageEvent::OperationSkipped {
                dataset,
                operation,
                column,
            } => {
                tracing::debug!(dataset = %dataset, operation = %operation, column = %column, "operation disabled, skipped");
            }
            StageEvent::TableExported { dataset, path } => {
                tracing::debug!(dataset = %dataset, path = %path, "clean table exported");
            }
            StageEvent::TableFinished {
                dataset,
                destination,
                rows,
            } => {
                tracing::info!(dataset = %dataset, destination = %destination, rows, "table transformed");
            }
            StageEvent::Failed {
                dataset,
                operation,
                column,
                error,
            } => {
                tracing::error!(
                    dataset = %dataset,
                    operation = operation.as_deref().unwrap_or("-"),
                    column = column.as_deref().unwrap_or("-"),
                    error = %error,
                    "transformation failed"
                );
            }
        }
    }
}

/// Captures events in memory.
#[derive(Debug, Default)]
pub struct CapturingSink {
    events: Mutex<Vec<StageEvent>>,
}

impl CapturingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink behind an `Arc`, ready to hand to an engine.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<StageEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of recorded failures.
    pub fn failure_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, StageEvent::Failed { .. }))
            .count()
    }
}

impl DiagnosticsSink for CapturingSink {
    fn record(&self, event: &StageEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<T> {
    fn record(&self, event: &StageEvent) {
        (**self).record(event)
    }
}
