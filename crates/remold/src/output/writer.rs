//! Write tables as comma-separated files. Null cells become empty fields.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{RemoldError, Result};
use crate::table::Table;

/// Write `table` to `path`, replacing any existing file.
///
/// Returns the number of data rows written.
pub fn write_csv(path: impl AsRef<Path>, table: &Table) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let file = fs::File::create(path).map_err(|e| RemoldError::io(path, e))?;
    write_rows(file, table, true)
}

/// Append `table` to `path`.
///
/// The header is written only when the file is new or empty. Columns are
/// written in the table's order; they are not matched against an existing
/// header.
pub fn append_csv(path: impl AsRef<Path>, table: &Table) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| RemoldError::io(path, e))?;
    write_rows(file, table, is_new)
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| RemoldError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Write `table` with its header to any writer, such as stdout.
pub fn write_to<W: Write>(out: W, table: &Table) -> Result<usize> {
    write_rows(out, table, true)
}

fn write_rows<W: Write>(out: W, table: &Table, with_header: bool) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);

    if with_header {
        writer.write_record(table.column_names())?;
    }
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.unwrap_or("")))?;
    }
    writer.flush().map_err(|e| RemoldError::Csv(e.into()))?;

    Ok(table.row_count())
}
