//! Remold: configuration-driven table transformation for ETL pipelines.
//!
//! A JSON plan describes, per dataset, which source columns to keep, what
//! to call them, which named operations to run on each of them and which
//! columns to drop at the end. The engine applies that plan to raw tables
//! in four stages: project, rename, operate, prune.
//!
//! # Core Principles
//!
//! - **Configuration, not code**: every table is described by data
//! - **Fail fast**: unknown operations are rejected before any row is touched
//! - **Tables are values**: each stage takes a table and returns a new one
//!
//! # Example
//!
//! ```
//! use remold::{PipelinePlan, Table, TransformEngine};
//!
//! let plan = PipelinePlan::from_json_str(r#"{
//!     "clientes": {
//!         "destiny": "Clientes",
//!         "fields": {
//!             "nome": {"field_destiny": "Nome", "transform": {"trim": true, "upper": true}}
//!         }
//!     }
//! }"#).unwrap();
//!
//! let raw = Table::from_text_columns(&[("NOME", &["  ana "])]).unwrap();
//! let engine = TransformEngine::default();
//! let clean = engine.transform_table(plan.table("clientes").unwrap(), raw).unwrap();
//!
//! assert_eq!(clean.get(0, "Nome"), Some("ANA"));
//! ```

pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod registry;
pub mod table;

pub use diagnostics::{CapturingSink, DiagnosticsSink, StageEvent, TracingSink};
pub use engine::{CleanTable, Stage, TransformEngine, TransformOutput};
pub use error::{RemoldError, Result};
pub use input::{CsvReader, ExtractRecord};
pub use pipeline::{
    CsvDirectorySink, CsvDirectorySource, MemorySink, MemorySource, Pipeline, RunSummary,
    TableSink, TableSource,
};
pub use plan::{OperationParams, PipelinePlan, TablePlan};
pub use registry::{CityDirectory, OperationRegistry};
pub use table::{Cell, Table, TableError};
