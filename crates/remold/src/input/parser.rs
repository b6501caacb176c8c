//! Delimited text reader with delimiter detection.

use std::fs;
use std::path::Path;

use crate::error::{RemoldError, Result};
use crate::table::{Cell, Table};

/// Candidate separators, in tie-break order. Spreadsheet exports with a
/// comma decimal separator use `;`, so it comes first.
const DELIMITERS: &[u8] = &[b';', b',', b'\t', b'|'];

/// Lines inspected when sniffing the separator.
const SNIFF_LINES: usize = 10;

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads delimited files with a header row into a [`Table`].
///
/// Empty fields become nulls. A file holding only a header yields a table
/// with columns and no rows.
#[derive(Debug, Clone, Default)]
pub struct CsvReader {
    config: ReaderConfig,
}

impl CsvReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a file, returning the table and the delimiter it was read with.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<(Table, u8)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| RemoldError::io(path, e))?;

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents).ok_or_else(|| RemoldError::Extract {
                table: path.display().to_string(),
                reason: "file has no header row".to_string(),
            })?,
        };

        let table = self.read_with_delimiter(&contents, delimiter)?;
        Ok((table, delimiter))
    }

    /// Read in-memory bytes, detecting the delimiter unless one is configured.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let delimiter = self
            .config
            .delimiter
            .or_else(|| detect_delimiter(bytes))
            .unwrap_or(b',');
        self.read_with_delimiter(bytes, delimiter)
    }

    fn read_with_delimiter(&self, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Ok(Table::new());
        }

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if matches!(self.config.max_rows, Some(max) if row_idx >= max) {
                break;
            }
            let record = result?;
            let row: Vec<Cell> = record
                .iter()
                .map(|s| (!s.is_empty()).then(|| s.to_string()))
                .collect();
            rows.push(row);
        }

        Ok(Table::from_rows(headers, rows)?)
    }
}

/// Pick the separator whose field count is the same on the header and on
/// every sampled record, preferring the one that yields the most columns.
///
/// With no consistent candidate, the header alone decides. Returns `None`
/// when there is nothing to analyze.
fn detect_delimiter(bytes: &[u8]) -> Option<u8> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines().filter(|l| !l.trim().is_empty()).take(SNIFF_LINES);
    let header = lines.next()?;
    let records: Vec<&str> = lines.collect();

    let mut consistent: Option<(u8, usize)> = None;
    let mut header_only: Option<(u8, usize)> = None;

    for &delim in DELIMITERS {
        let fields = split_count(header, delim);
        if fields < 2 {
            continue;
        }
        if header_only.is_none_or(|(_, best)| fields > best) {
            header_only = Some((delim, fields));
        }
        let matches_records = records.iter().all(|r| split_count(r, delim) == fields);
        if matches_records && consistent.is_none_or(|(_, best)| fields > best) {
            consistent = Some((delim, fields));
        }
    }

    Some(consistent.or(header_only).map_or(b',', |(delim, _)| delim))
}

/// Number of fields `line` splits into, ignoring separators inside quotes.
fn split_count(line: &str, delimiter: u8) -> usize {
    let delimiter = char::from(delimiter);
    let mut in_quotes = false;
    1 + line
        .chars()
        .filter(|&c| {
            if c == '"' {
                in_quotes = !in_quotes;
            }
            c == delimiter && !in_quotes
        })
        .count()
}
