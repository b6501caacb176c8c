//! City code lookup backing the `search` operation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::unexpected_params;
use crate::error::{RemoldError, Result};
use crate::plan::{OperationParams, SearchKind};
use crate::table::{Cell, Table, TableError};

/// State column the lookup pairs with the searched column.
pub const STATE_COLUMN: &str = "UF";

/// Column `search` appends.
pub const CITY_CODE_COLUMN: &str = "Codigo_Cidade";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct CityRecord {
    #[serde(rename = "Cidade", alias = "city")]
    city: String,
    #[serde(rename = "Estado", alias = "state")]
    state: String,
    #[serde(rename = "Codigo", alias = "code")]
    code: RawCode,
}

/// City codes keyed by `(city, state)`.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    codes: HashMap<(String, String), String>,
}

impl CityDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of `{"Cidade", "Estado", "Codigo"}` records.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RemoldError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Parse the lookup data from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let records: Vec<CityRecord> = serde_json::from_str(content)
            .map_err(|e| RemoldError::malformed("city lookup data", e.to_string()))?;

        let mut directory = Self::new();
        for record in records {
            let code = match record.code {
                RawCode::Number(n) => n.to_string(),
                RawCode::Text(s) => s,
            };
            directory.insert(record.city, record.state, code);
        }
        Ok(directory)
    }

    /// Add a record. An existing `(city, state)` key keeps its first code.
    pub fn insert(
        &mut self,
        city: impl Into<String>,
        state: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.codes
            .entry((city.into(), state.into()))
            .or_insert_with(|| code.into());
    }

    /// Look up the code for a city in a state.
    pub fn code(&self, city: &str, state: &str) -> Option<&str> {
        self.codes
            .get(&(city.to_string(), state.to_string()))
            .map(|s| s.as_str())
    }

    /// Number of known cities.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no cities are loaded.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

pub(super) fn search(
    cities: &CityDirectory,
    mut table: Table,
    column: &str,
    params: &OperationParams,
) -> Result<Table> {
    let OperationParams::Search(SearchKind::City) = params else {
        return Err(unexpected_params("search", params));
    };

    if table.has_column(CITY_CODE_COLUMN) {
        return Err(TableError::DuplicateColumn(CITY_CODE_COLUMN.to_string()).into());
    }

    let names = table.require_column(column)?;
    let states = table.require_column(STATE_COLUMN)?;

    let codes: Vec<Cell> = names
        .iter()
        .zip(states)
        .map(|(name, state)| match (name.as_deref(), state.as_deref()) {
            (Some(name), Some(state)) => cities.code(name, state).map(str::to_string),
            _ => None,
        })
        .collect();

    table.push_column(CITY_CODE_COLUMN, codes)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITIES: &str = r#"[
        {"Cidade": "BELO HORIZONTE", "Estado": "MG", "Codigo": 2547},
        {"Cidade": "RIO DE JANEIRO", "Estado": "RJ", "Codigo": 6343},
        {"Cidade": "RIO DE JANEIRO", "Estado": "RJ", "Codigo": 9999}
    ]"#;

    fn directory() -> CityDirectory {
        CityDirectory::from_json_str(CITIES).unwrap()
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let cities = directory();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities.code("RIO DE JANEIRO", "RJ"), Some("6343"));
    }

    #[test]
    fn test_search_appends_codes() {
        let table = Table::from_columns(vec![
            (
                "Cidade",
                vec![
                    Some("BELO HORIZONTE".into()),
                    Some("RIO DE JANEIRO".into()),
                    Some("ATLANTIS".into()),
                    None,
                ],
            ),
            (
                "UF",
                vec![Some("MG".into()), Some("RJ".into()), Some("MG".into()), Some("SP".into())],
            ),
        ])
        .unwrap();

        let out = search(
            &directory(),
            table,
            "Cidade",
            &OperationParams::Search(SearchKind::City),
        )
        .unwrap();

        assert_eq!(out.row_count(), 4);
        assert_eq!(out.get(0, CITY_CODE_COLUMN), Some("2547"));
        assert_eq!(out.get(1, CITY_CODE_COLUMN), Some("6343"));
        assert_eq!(out.get(2, CITY_CODE_COLUMN), None);
        assert_eq!(out.get(3, CITY_CODE_COLUMN), None);
    }

    #[test]
    fn test_search_requires_state_column() {
        let table = Table::from_text_columns(&[("Cidade", &["BELO HORIZONTE"])]).unwrap();
        let err = search(
            &directory(),
            table,
            "Cidade",
            &OperationParams::Search(SearchKind::City),
        )
        .unwrap_err();
        assert!(err.to_string().contains("UF"));
    }

    #[test]
    fn test_search_rejects_existing_code_column() {
        let table = Table::from_text_columns(&[
            ("Cidade", &["BELO HORIZONTE"]),
            ("UF", &["MG"]),
            ("Codigo_Cidade", &["1"]),
        ])
        .unwrap();
        assert!(
            search(
                &directory(),
                table,
                "Cidade",
                &OperationParams::Search(SearchKind::City)
            )
            .is_err()
        );
    }

    #[test]
    fn test_malformed_lookup_data() {
        let err = CityDirectory::from_json_str(r#"{"Cidade": "X"}"#).unwrap_err();
        assert!(matches!(err, RemoldError::ConfigurationMalformed { .. }));
    }
}
