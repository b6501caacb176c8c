//! Extract → transform → load driver and its collaborators.
//!
//! [`TableSource`] and [`TableSink`] are the seams a database-backed
//! implementation plugs into. The crate ships CSV-directory and in-memory
//! versions of both.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::diagnostics::StageEvent;
use crate::engine::TransformEngine;
use crate::error::{RemoldError, Result};
use crate::input::{CsvReader, ExtractRecord};
use crate::output::append_csv;
use crate::plan::PipelinePlan;
use crate::table::Table;

/// Supplies raw tables.
pub trait TableSource {
    /// Read the raw table for `dataset`, stored under `source_table`.
    fn extract(&mut self, dataset: &str, source_table: &str) -> Result<Table>;
}

/// Consumes clean tables with append semantics.
pub trait TableSink {
    /// Append `table` to `destination`, returning the rows written.
    fn load(&mut self, destination: &str, table: &Table) -> Result<usize>;
}

/// Reads `<dir>/<source_table>.csv` for each dataset.
#[derive(Debug)]
pub struct CsvDirectorySource {
    dir: PathBuf,
    reader: CsvReader,
    extracted: Vec<ExtractRecord>,
}

impl CsvDirectorySource {
    /// Create a source over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            reader: CsvReader::new(),
            extracted: Vec::new(),
        }
    }

    /// Use a custom reader.
    pub fn with_reader(mut self, reader: CsvReader) -> Self {
        self.reader = reader;
        self
    }

    /// Directory the source reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every dataset extracted so far, in extraction order.
    pub fn extracted(&self) -> &[ExtractRecord] {
        &self.extracted
    }
}

impl TableSource for CsvDirectorySource {
    fn extract(&mut self, dataset: &str, source_table: &str) -> Result<Table> {
        let path = self.dir.join(format!("{}.csv", source_table));
        if !path.is_file() {
            return Err(RemoldError::Extract {
                table: source_table.to_string(),
                reason: format!("no file at {}", path.display()),
            });
        }
        let (table, delimiter) = self.reader.read_file(&path)?;
        self.extracted
            .push(ExtractRecord::new(dataset, source_table, &path, delimiter, &table));
        Ok(table)
    }
}

/// Appends each clean table to `<dir>/<destination>.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectorySink {
    dir: PathBuf,
}

impl CsvDirectorySink {
    /// Create a sink writing into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| RemoldError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Directory the sink writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableSink for CsvDirectorySink {
    fn load(&mut self, destination: &str, table: &Table) -> Result<usize> {
        let path = self.dir.join(format!("{}.csv", destination));
        append_csv(&path, table).map_err(|e| RemoldError::Load {
            table: destination.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Raw tables held in memory, keyed by source table name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: IndexMap<String, Table>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table under `source_table`.
    pub fn with_table(mut self, source_table: impl Into<String>, table: Table) -> Self {
        self.insert(source_table, table);
        self
    }

    pub fn insert(&mut self, source_table: impl Into<String>, table: Table) {
        self.tables.insert(source_table.into(), table);
    }
}

impl TableSource for MemorySource {
    fn extract(&mut self, dataset: &str, source_table: &str) -> Result<Table> {
        self.tables
            .get(source_table)
            .cloned()
            .ok_or_else(|| RemoldError::Extract {
                table: source_table.to_string(),
                reason: "no such table".to_string(),
            })
    }
}

/// Records every load in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    loads: Vec<(String, Table)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(destination, table)` load, in order.
    pub fn loads(&self) -> &[(String, Table)] {
        &self.loads
    }

    /// Tables appended to `destination`, in order.
    pub fn loaded(&self, destination: &str) -> Vec<&Table> {
        self.loads
            .iter()
            .filter(|(d, _)| d == destination)
            .map(|(_, t)| t)
            .collect()
    }

    /// Total rows appended to `destination`.
    pub fn row_count(&self, destination: &str) -> usize {
        self.loaded(destination).iter().map(|t| t.row_count()).sum()
    }
}

impl TableSink for MemorySink {
    fn load(&mut self, destination: &str, table: &Table) -> Result<usize> {
        self.loads.push((destination.to_string(), table.clone()));
        Ok(table.row_count())
    }
}

/// One dataset's trip through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTable {
    pub dataset: String,
    pub source_table: String,
    pub destination: String,
    pub rows_extracted: usize,
    pub rows_loaded: usize,
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub transformed_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<LoadedTable>,
}

impl RunSummary {
    /// Rows loaded across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows_loaded).sum()
    }
}

/// Runs extract, transform and load for every dataset in a plan.
///
/// All datasets are extracted before any is transformed, and all are
/// transformed before any is loaded, so a failing table leaves the sink
/// untouched.
pub struct Pipeline {
    engine: TransformEngine,
    plan: PipelinePlan,
}

impl Pipeline {
    pub fn new(engine: TransformEngine, plan: PipelinePlan) -> Self {
        Self { engine, plan }
    }

    pub fn plan(&self) -> &PipelinePlan {
        &self.plan
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    /// Run the pipeline end to end.
    pub fn run(
        &self,
        source: &mut dyn TableSource,
        sink: &mut dyn TableSink,
    ) -> Result<RunSummary> {
        let started_at = Utc::now();
        let diagnostics = self.engine.diagnostics();

        self.engine.check(&self.plan)?;

        let mut raw_tables = IndexMap::with_capacity(self.plan.len());
        let mut extracted = IndexMap::with_capacity(self.plan.len());
        for (dataset, table_plan) in &self.plan.tables {
            let source_table = table_plan.source_table();
            let table = source.extract(dataset, source_table)?;
            diagnostics.record(&StageEvent::TableExtracted {
                dataset: dataset.clone(),
                source_table: source_table.to_string(),
                rows: table.row_count(),
            });
            extracted.insert(dataset.clone(), table.row_count());
            raw_tables.insert(dataset.clone(), table);
        }

        let output = self.engine.transform(&self.plan, raw_tables)?;

        let mut tables = Vec::with_capacity(output.clean.len());
        for clean in &output.clean {
            let rows = sink.load(&clean.destination, &clean.table)?;
            diagnostics.record(&StageEvent::TableLoaded {
                dataset: clean.dataset.clone(),
                destination: clean.destination.clone(),
                rows,
            });
            let source_table = self
                .plan
                .table(&clean.dataset)
                .map(|p| p.source_table().to_string())
                .unwrap_or_else(|| clean.dataset.clone());
            tables.push(LoadedTable {
                dataset: clean.dataset.clone(),
                source_table,
                destination: clean.destination.clone(),
                rows_extracted: extracted.get(&clean.dataset).copied().unwrap_or(0),
                rows_loaded: rows,
            });
        }

        Ok(RunSummary {
            started_at,
            transformed_at: output.transformed_at,
            finished_at: Utc::now(),
            tables,
        })
    }
}
