//! In-memory tabular value shared by every pipeline stage.

use indexmap::IndexMap;
use thiserror::Error;

/// A single cell. `None` is the null marker.
pub type Cell = Option<String>;

/// Structural errors raised by [`Table`] methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Column is not present in the table.
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// Column name is already taken.
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    /// Column length does not match the table's row count.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Ordered collection of equal-length named columns.
///
/// Columns keep their insertion order and names are unique. Every cell is
/// text or null; source types are not preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: IndexMap<String, Vec<Cell>>,
    row_count: usize,
}

impl Table {
    /// Create an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, Vec<Cell>)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, values) in columns {
            let name = name.into();
            if table.columns.contains_key(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Build a table from headers and row-major data.
    ///
    /// Short rows are padded with nulls, long rows are truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let mut columns: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next().flatten());
            }
        }
        Self::from_columns(headers.into_iter().zip(columns))
    }

    /// Convenience constructor for text-only columns.
    pub fn from_text_columns(columns: &[(&str, &[&str])]) -> Result<Self, TableError> {
        Self::from_columns(columns.iter().map(|(name, values)| {
            (
                name.to_string(),
                values.iter().map(|v| Some(v.to_string())).collect(),
            )
        }))
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Check whether a column exists (exact name).
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Find the stored name of a column, ignoring case.
    pub fn find_column_ignore_case(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.columns.get_key_value(name) {
            return Some(key.as_str());
        }
        let wanted = name.to_lowercase();
        self.columns
            .keys()
            .find(|k| k.to_lowercase() == wanted)
            .map(|k| k.as_str())
    }

    /// Get a column's values by name.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Get a column's values, failing when the column is absent.
    pub fn require_column(&self, name: &str) -> Result<&[Cell], TableError> {
        self.column(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|values| values.get(row))
            .and_then(|cell| cell.as_deref())
    }

    /// Iterate rows as vectors of cell references, in column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&str>>> + '_ {
        (0..self.row_count).map(move |row| {
            self.columns
                .values()
                .map(|values| values[row].as_deref())
                .collect()
        })
    }

    /// Replace a column's values in place, or append it when it is new.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Cell>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.columns.is_empty() {
            self.row_count = values.len();
        }
        self.check_length(&name, values.len())?;
        match self.columns.get_mut(&name) {
            Some(existing) => *existing = values,
            None => {
                self.columns.insert(name, values);
            }
        }
        Ok(())
    }

    /// Append a new column; fails if the name is taken.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Cell>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        // With no columns left, the first one defines the row count.
        if self.columns.is_empty() {
            self.row_count = values.len();
        }
        self.check_length(&name, values.len())?;
        self.columns.insert(name, values);
        Ok(())
    }

    /// Apply `f` to every non-null cell of a column.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<(), TableError>
    where
        F: FnMut(&str) -> String,
    {
        let values = self
            .columns
            .get_mut(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        for cell in values.iter_mut() {
            if let Some(value) = cell {
                *value = f(value);
            }
        }
        Ok(())
    }

    /// Rename a column, keeping its position.
    ///
    /// If `to` already names a different column, that column is dropped and
    /// the renamed one takes its name.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), TableError> {
        if from == to {
            return self.require_column(from).map(|_| ());
        }
        let mut index = self
            .columns
            .get_index_of(from)
            .ok_or_else(|| TableError::ColumnNotFound(from.to_string()))?;
        if matches!(self.columns.get_index_of(to), Some(shadowed) if shadowed < index) {
            index -= 1;
        }
        let values = self.columns.shift_remove(from).unwrap_or_default();
        self.columns.shift_remove(to);
        self.columns.shift_insert(index, to.to_string(), values);
        Ok(())
    }

    /// Remove a column and return its values.
    pub fn drop_column(&mut self, name: &str) -> Result<Vec<Cell>, TableError> {
        let values = self
            .columns
            .shift_remove(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        Ok(values)
    }

    /// Build a new table holding only the named columns, in the given order.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let mut selected = Table::new();
        selected.row_count = self.row_count;
        for name in names {
            let name = name.as_ref();
            let values = self.require_column(name)?;
            if selected.columns.contains_key(name) {
                return Err(TableError::DuplicateColumn(name.to_string()));
            }
            selected.columns.insert(name.to_string(), values.to_vec());
        }
        Ok(selected)
    }

    /// Keep only the rows whose index satisfies `keep`.
    ///
    /// Kept rows retain their relative order and are re-indexed from 0.
    pub fn retain_rows<F>(self, mut keep: F) -> Table
    where
        F: FnMut(usize) -> bool,
    {
        let mask: Vec<bool> = (0..self.row_count).map(&mut keep).collect();
        let row_count = mask.iter().filter(|k| **k).count();
        let columns = self
            .columns
            .into_iter()
            .map(|(name, values)| {
                let kept = values
                    .into_iter()
                    .zip(mask.iter())
                    .filter_map(|(cell, keep)| keep.then_some(cell))
                    .collect();
                (name, kept)
            })
            .collect();
        Table { columns, row_count }
    }

    fn check_length(&self, name: &str, actual: usize) -> Result<(), TableError> {
        if !self.columns.is_empty() && actual != self.row_count {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.row_count,
                actual,
            });
        }
        Ok(())
    }
}

/// Collect non-null text cells from string slices.
pub fn text_cells(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Some(v.to_string())).collect()
}
