//! Transform engine: runs a table plan through its four stages.
//!
//! Every raw table goes through, in order:
//!
//! 1. **Project** keeps the columns the plan names (matched ignoring case).
//! 2. **Rename** gives each column its destination name.
//! 3. **Operate** applies each field's operations in declared order.
//! 4. **Prune** drops the plan's `remove` columns.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticsSink, StageEvent, TracingSink};
use crate::error::{RemoldError, Result};
use crate::output::write_csv;
use crate::plan::{PipelinePlan, TablePlan};
use crate::registry::OperationRegistry;
use crate::table::{Table, TableError};

/// Engine stage, used in errors and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Project,
    Rename,
    Operate,
    Prune,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Project => write!(f, "project"),
            Stage::Rename => write!(f, "rename"),
            Stage::Operate => write!(f, "operate"),
            Stage::Prune => write!(f, "prune"),
        }
    }
}

/// A transformed table ready for the load step.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable {
    /// Dataset the table came from.
    pub dataset: String,
    /// Table name the load step writes to.
    pub destination: String,
    pub table: Table,
}

/// Result of transforming every dataset of a plan.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Clean tables in plan order.
    pub clean: Vec<CleanTable>,
    /// When the transformation finished.
    pub transformed_at: DateTime<Utc>,
}

impl TransformOutput {
    /// Total rows across all clean tables.
    pub fn total_rows(&self) -> usize {
        self.clean.iter().map(|c| c.table.row_count()).sum()
    }
}

/// Executes table plans against raw tables.
pub struct TransformEngine {
    registry: OperationRegistry,
    diagnostics: Arc<dyn DiagnosticsSink>,
    export_dir: Option<PathBuf>,
}

impl TransformEngine {
    /// Create an engine around a registry, reporting to `tracing`.
    pub fn new(registry: OperationRegistry) -> Self {
        Self {
            registry,
            diagnostics: Arc::new(TracingSink),
            export_dir: None,
        }
    }

    /// Report engine and registry events to `sink`.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.registry.set_diagnostics(Arc::clone(&sink));
        self.diagnostics = sink;
        self
    }

    /// Write each clean table to `<dir>/<dataset>.csv` after pruning.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// The sink events are reported to.
    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticsSink> {
        &self.diagnostics
    }

    /// The registry operations are looked up in.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Check that every enabled operation in the plan is registered.
    pub fn check(&self, plan: &PipelinePlan) -> Result<()> {
        plan.tables.values().try_for_each(|table| self.check_table(table))
    }

    /// Check a single table plan against the registry.
    pub fn check_table(&self, plan: &TablePlan) -> Result<()> {
        for (field, step) in plan.enabled_steps() {
            if !self.registry.has(&step.name) {
                return Err(RemoldError::UnknownOperationKind {
                    operation: step.name.clone(),
                    column: field.destination.clone(),
                });
            }
        }
        Ok(())
    }

    /// Transform every dataset in the plan, in plan order.
    ///
    /// The whole plan is checked before any table is touched. Each dataset
    /// must have a raw table in `raw_tables`.
    pub fn transform(
        &self,
        plan: &PipelinePlan,
        mut raw_tables: IndexMap<String, Table>,
    ) -> Result<TransformOutput> {
        self.check(plan)?;

        let mut clean = Vec::with_capacity(plan.len());
        for (dataset, table_plan) in &plan.tables {
            let raw = raw_tables
                .shift_remove(dataset)
                .ok_or_else(|| RemoldError::MissingDataset(dataset.clone()))?;
            let table = self.transform_table(table_plan, raw)?;
            clean.push(CleanTable {
                dataset: dataset.clone(),
                destination: table_plan.destination.clone(),
                table,
            });
        }

        Ok(TransformOutput {
            clean,
            transformed_at: Utc::now(),
        })
    }

    /// Transform one raw table according to its plan.
    pub fn transform_table(&self, plan: &TablePlan, raw: Table) -> Result<Table> {
        self.diagnostics.record(&StageEvent::TableStarted {
            dataset: plan.dataset.clone(),
            rows: raw.row_count(),
            columns: raw.column_count(),
        });

        match self.run_stages(plan, raw) {
            Ok(table) => {
                self.diagnostics.record(&StageEvent::TableFinished {
                    dataset: plan.dataset.clone(),
                    destination: plan.destination.clone(),
                    rows: table.row_count(),
                });
                Ok(table)
            }
            Err(e) => {
                let (operation, column) = match &e {
                    RemoldError::OperationFailed {
                        operation, column, ..
                    }
                    | RemoldError::UnknownOperationKind { operation, column } => {
                        (Some(operation.clone()), Some(column.clone()))
                    }
                    RemoldError::MissingColumn { column, .. } => (None, Some(column.clone())),
                    _ => (None, None),
                };
                self.diagnostics.record(&StageEvent::Failed {
                    dataset: plan.dataset.clone(),
                    operation,
                    column,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn run_stages(&self, plan: &TablePlan, raw: Table) -> Result<Table> {
        self.check_table(plan)?;

        let (table, sources) = self.project(plan, raw)?;
        self.stage_completed(plan, Stage::Project, &table);

        let table = self.rename(plan, table, &sources)?;
        self.stage_completed(plan, Stage::Rename, &table);

        let table = self.operate(plan, table)?;
        self.stage_completed(plan, Stage::Operate, &table);

        let table = self.prune(plan, table)?;
        self.stage_completed(plan, Stage::Prune, &table);

        if let Some(dir) = &self.export_dir {
            self.export(plan, &table, dir)?;
        }

        Ok(table)
    }

    fn project(&self, plan: &TablePlan, raw: Table) -> Result<(Table, Vec<String>)> {
        let mut sources = Vec::with_capacity(plan.fields.len());
        for source in plan.fields.keys() {
            let stored = raw
                .find_column_ignore_case(source)
                .ok_or_else(|| missing(source, Stage::Project))?;
            sources.push(stored.to_string());
        }
        let table = raw
            .select_columns(&sources)
            .map_err(|e| at_stage(e, Stage::Project))?;
        Ok((table, sources))
    }

    /// Rename in plan order. A column produced by an earlier rename is no
    /// longer available as a source, even if its new name matches.
    fn rename(&self, plan: &TablePlan, mut table: Table, sources: &[String]) -> Result<Table> {
        let mut produced = HashSet::new();
        for (field, source) in plan.fields.values().zip(sources) {
            if produced.contains(source.as_str()) || !table.has_column(source) {
                return Err(missing(source, Stage::Rename));
            }
            table
                .rename_column(source, &field.destination)
                .map_err(|e| at_stage(e, Stage::Rename))?;
            produced.insert(field.destination.as_str());
        }
        Ok(table)
    }

    fn operate(&self, plan: &TablePlan, mut table: Table) -> Result<Table> {
        for field in plan.fields.values() {
            for step in &field.operations {
                let Some(params) = &step.params else {
                    self.diagnostics.record(&StageEvent::OperationSkipped {
                        dataset: plan.dataset.clone(),
                        operation: step.name.clone(),
                        column: field.destination.clone(),
                    });
                    continue;
                };

                table = self
                    .registry
                    .apply(&step.name, table, &field.destination, params)?;

                self.diagnostics.record(&StageEvent::OperationApplied {
                    dataset: plan.dataset.clone(),
                    operation: step.name.clone(),
                    column: field.destination.clone(),
                });
            }
        }
        Ok(table)
    }

    fn prune(&self, plan: &TablePlan, mut table: Table) -> Result<Table> {
        for column in &plan.remove {
            table
                .drop_column(column)
                .map_err(|e| at_stage(e, Stage::Prune))?;
        }
        Ok(table)
    }

    fn export(&self, plan: &TablePlan, table: &Table, dir: &Path) -> Result<()> {
        let path = dir.join(format!("{}.csv", plan.dataset));
        write_csv(&path, table)?;
        self.diagnostics.record(&StageEvent::TableExported {
            dataset: plan.dataset.clone(),
            path: path.display().to_string(),
        });
        Ok(())
    }

    fn stage_completed(&self, plan: &TablePlan, stage: Stage, table: &Table) {
        self.diagnostics.record(&StageEvent::StageCompleted {
            dataset: plan.dataset.clone(),
            stage,
            rows: table.row_count(),
            columns: table.column_count(),
        });
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(OperationRegistry::default())
    }
}

fn missing(column: &str, stage: Stage) -> RemoldError {
    RemoldError::MissingColumn {
        column: column.to_string(),
        stage,
    }
}

fn at_stage(err: TableError, stage: Stage) -> RemoldError {
    match err {
        TableError::ColumnNotFound(column) => RemoldError::MissingColumn { column, stage },
        other => RemoldError::Table(other),
    }
}
