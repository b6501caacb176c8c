//! Registry of named column operations.
//!
//! Each operation is a function `(Table, column, parameter) -> Table`. The
//! registry is filled at startup with the built-in set and can be extended
//! with [`OperationRegistry::register`].

mod columns;
mod lookup;
mod patterns;
mod text;

pub use columns::RENAMED_COLUMN;
pub use lookup::{CITY_CODE_COLUMN, CityDirectory, STATE_COLUMN};
pub use patterns::{format_value, split_value};
pub use text::clear_value;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::diagnostics::{DiagnosticsSink, StageEvent, TracingSink};
use crate::error::{RemoldError, Result};
use crate::plan::OperationParams;
use crate::table::Table;

/// Signature shared by every registered operation.
pub type OperationFn =
    Arc<dyn Fn(Table, &str, &OperationParams) -> Result<Table> + Send + Sync>;

/// Names of the built-in operations, in registration order.
pub const BUILTIN_OPERATIONS: &[&str] = &[
    "trim", "upper", "lower", "switch", "rename", "clear", "select", "copy", "format", "split",
    "search",
];

/// Catalog of operations addressable by name.
#[derive(Clone)]
pub struct OperationRegistry {
    operations: IndexMap<String, OperationFn>,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl OperationRegistry {
    /// Create a registry with no operations.
    pub fn empty() -> Self {
        Self {
            operations: IndexMap::new(),
            diagnostics: Arc::new(TracingSink),
        }
    }

    /// Create a registry holding the built-in operations.
    ///
    /// `cities` backs the `search` operation.
    pub fn with_builtins(cities: Arc<CityDirectory>) -> Self {
        let mut registry = Self::empty();
        registry.register("trim", text::trim);
        registry.register("upper", text::upper);
        registry.register("lower", text::lower);
        registry.register("switch", text::switch);
        registry.register("rename", columns::rename);
        registry.register("clear", text::clear);
        registry.register("select", columns::select);
        registry.register("copy", columns::copy);
        registry.register("format", patterns::format);
        registry.register("split", patterns::split);
        registry.register("search", move |table: Table, column: &str, params: &OperationParams| {
            lookup::search(&cities, table, column, params)
        });
        registry
    }

    /// Report invocations to `sink` instead of `tracing`.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.set_diagnostics(sink);
        self
    }

    /// Replace the diagnostics sink in place.
    pub fn set_diagnostics(&mut self, sink: Arc<dyn DiagnosticsSink>) {
        self.diagnostics = sink;
    }

    /// Add or replace an operation.
    pub fn register<F>(&mut self, name: impl Into<String>, operation: F)
    where
        F: Fn(Table, &str, &OperationParams) -> Result<Table> + Send + Sync + 'static,
    {
        self.operations.insert(name.into(), Arc::new(operation));
    }

    /// Whether an operation is registered under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(|k| k.as_str())
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run operation `name` against `column`.
    ///
    /// Fails with `UnknownOperationKind` for unregistered names and wraps any
    /// fault raised by the operation in `OperationFailed`.
    pub fn apply(
        &self,
        name: &str,
        table: Table,
        column: &str,
        params: &OperationParams,
    ) -> Result<Table> {
        let operation = self
            .operations
            .get(name)
            .ok_or_else(|| RemoldError::UnknownOperationKind {
                operation: name.to_string(),
                column: column.to_string(),
            })?;

        let rows_before = table.row_count();
        let table = operation(table, column, params).map_err(|e| match e {
            RemoldError::OperationFailed { .. } => e,
            other => RemoldError::OperationFailed {
                operation: name.to_string(),
                column: column.to_string(),
                source: Box::new(other),
            },
        })?;

        self.diagnostics.record(&StageEvent::OperationInvoked {
            operation: name.to_string(),
            column: column.to_string(),
            parameter: params.label(),
            rows_before,
            rows_after: table.row_count(),
        });
        Ok(table)
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_builtins(Arc::new(CityDirectory::default()))
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Fail with `InvalidParameter` when an operation gets the wrong parameter shape.
pub(crate) fn unexpected_params(operation: &str, params: &OperationParams) -> RemoldError {
    RemoldError::InvalidParameter(format!(
        "'{}' cannot use parameter {}",
        operation,
        params.label()
    ))
}
