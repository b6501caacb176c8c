//! What the Extract stage knows about each raw table it handed over.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::table::Table;

/// One extracted dataset, as read from `<dir>/<source_table>.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractRecord {
    pub dataset: String,
    pub source_table: String,
    pub path: PathBuf,
    /// Field separator the file was read with.
    pub delimiter: char,
    pub row_count: usize,
    pub column_count: usize,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractRecord {
    pub fn new(
        dataset: &str,
        source_table: &str,
        path: &Path,
        delimiter: u8,
        table: &Table,
    ) -> Self {
        Self {
            dataset: dataset.to_string(),
            source_table: source_table.to_string(),
            path: path.to_path_buf(),
            delimiter: char::from(delimiter),
            row_count: table.row_count(),
            column_count: table.column_count(),
            extracted_at: Utc::now(),
        }
    }
}
