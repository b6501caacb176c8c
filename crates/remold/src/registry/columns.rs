//! Column-level operations: rename, select, copy.

use super::unexpected_params;
use crate::error::Result;
use crate::plan::OperationParams;
use crate::table::{Table, TableError};

/// Name the `rename` operation gives its column.
pub const RENAMED_COLUMN: &str = "Codigo_Old";

/// Rename `column` to `Codigo_Old`, keeping its position.
pub(super) fn rename(mut table: Table, column: &str, _params: &OperationParams) -> Result<Table> {
    table.require_column(column)?;
    if column != RENAMED_COLUMN && table.has_column(RENAMED_COLUMN) {
        return Err(TableError::DuplicateColumn(RENAMED_COLUMN.to_string()).into());
    }
    table.rename_column(column, RENAMED_COLUMN)?;
    Ok(table)
}

/// Keep only rows whose text value in `column` equals the parameter.
///
/// Null cells never match.
pub(super) fn select(table: Table, column: &str, params: &OperationParams) -> Result<Table> {
    let OperationParams::Select(wanted) = params else {
        return Err(unexpected_params("select", params));
    };

    let keep: Vec<bool> = table
        .require_column(column)?
        .iter()
        .map(|cell| cell.as_deref() == Some(wanted.as_str()))
        .collect();

    Ok(table.retain_rows(|row| keep[row]))
}

/// Overwrite `column` with the values of the named source column.
pub(super) fn copy(mut table: Table, column: &str, params: &OperationParams) -> Result<Table> {
    let OperationParams::Copy(source) = params else {
        return Err(unexpected_params("copy", params));
    };

    let values = table.require_column(source)?.to_vec();
    table.set_column(column, values)?;
    Ok(table)
}
