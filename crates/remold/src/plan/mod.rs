//! Per-table transformation plans parsed from the JSON configuration.
//!
//! The configuration is keyed by dataset name:
//!
//! ```json
//! {
//!   "clientes": {
//!     "table": "CLIENTES",
//!     "destiny": "Clientes",
//!     "fields": {
//!       "nome": { "field_destiny": "Nome", "transform": { "trim": true, "upper": true } },
//!       "cpf":  { "field_destiny": "CPF",  "transform": { "format": "CPF" } }
//!     },
//!     "remove": { "1": "CPF" }
//!   }
//! }
//! ```

mod params;

pub use params::{
    FormatKind, OperationParams, SearchKind, SplitKind, SwitchParams, is_truthy, parse_params,
};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{RemoldError, Result};

/// One configured `(operation, parameter)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStep {
    /// Registry name of the operation.
    pub name: String,
    /// Typed parameter; `None` when a falsy value disabled the step.
    pub params: Option<OperationParams>,
}

impl OperationStep {
    /// Whether the step will run.
    pub fn is_enabled(&self) -> bool {
        self.params.is_some()
    }
}

/// How one source column becomes one destination column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    /// Column name in the raw table (matched ignoring case).
    pub source: String,
    /// Column name after the rename stage.
    pub destination: String,
    /// Operations in declared order.
    pub operations: Vec<OperationStep>,
}

/// Plan for a single dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    /// Logical dataset name (configuration key).
    pub dataset: String,
    /// Table name in the source system, if it differs from the dataset name.
    pub source_table: Option<String>,
    /// Table name handed to the load step.
    pub destination: String,
    /// Fields in configuration order, keyed by source column name.
    pub fields: IndexMap<String, FieldPlan>,
    /// Destination columns dropped after all operations.
    pub remove: Vec<String>,
}

impl TablePlan {
    /// Name the extract step should read.
    pub fn source_table(&self) -> &str {
        self.source_table.as_deref().unwrap_or(&self.dataset)
    }

    /// Enabled steps paired with the destination column they target.
    pub fn enabled_steps(&self) -> impl Iterator<Item = (&FieldPlan, &OperationStep)> {
        self.fields.values().flat_map(|field| {
            field
                .operations
                .iter()
                .filter(|step| step.is_enabled())
                .map(move |step| (field, step))
        })
    }
}

/// All table plans of a run, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelinePlan {
    pub tables: IndexMap<String, TablePlan>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    table: Option<String>,
    destiny: String,
    fields: IndexMap<String, RawField>,
    #[serde(default)]
    remove: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    field_destiny: String,
    #[serde(default)]
    transform: Option<IndexMap<String, Value>>,
}

impl PipelinePlan {
    /// Load and validate a plan from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RemoldError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a plan from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: IndexMap<String, Value> = serde_json::from_str(content)
            .map_err(|e| RemoldError::malformed("configuration", e.to_string()))?;
        Self::from_entries(raw)
    }

    /// Build a plan from an already-parsed configuration object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            RemoldError::malformed("configuration", "top level must be an object")
        })?;
        Self::from_entries(obj.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Result<Self> {
        let mut tables = IndexMap::new();
        for (dataset, value) in entries {
            let plan = parse_table(&dataset, value)?;
            tables.insert(dataset, plan);
        }
        Ok(Self { tables })
    }

    /// Get a table plan by dataset name.
    pub fn table(&self, dataset: &str) -> Option<&TablePlan> {
        self.tables.get(dataset)
    }

    /// Number of table plans.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the plan has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Keep only the named datasets, preserving configuration order.
    pub fn retain_datasets(&mut self, datasets: &[String]) {
        self.tables.retain(|name, _| datasets.iter().any(|d| d == name));
    }
}

fn parse_table(dataset: &str, value: Value) -> Result<TablePlan> {
    let raw: RawTable = serde_json::from_value(value)
        .map_err(|e| RemoldError::malformed(format!("table '{}'", dataset), e.to_string()))?;

    if raw.destiny.trim().is_empty() {
        return Err(RemoldError::malformed(
            format!("table '{}'", dataset),
            "'destiny' must not be empty",
        ));
    }

    let mut seen = HashSet::new();
    let mut fields = IndexMap::new();
    for (source, field) in raw.fields {
        let context = format!("table '{}', field '{}'", dataset, source);
        if !seen.insert(source.to_lowercase()) {
            return Err(RemoldError::malformed(
                context,
                "field is listed twice (names are compared ignoring case)",
            ));
        }
        if field.field_destiny.trim().is_empty() {
            return Err(RemoldError::malformed(context, "'field_destiny' must not be empty"));
        }

        let mut operations = Vec::new();
        for (name, param) in field.transform.unwrap_or_default() {
            let params = parse_params(&name, &param, &context)?;
            operations.push(OperationStep { name, params });
        }

        fields.insert(
            source.clone(),
            FieldPlan {
                source,
                destination: field.field_destiny,
                operations,
            },
        );
    }

    Ok(TablePlan {
        dataset: dataset.to_string(),
        source_table: raw.table,
        destination: raw.destiny,
        fields,
        remove: raw.remove.into_values().collect(),
    })
}
