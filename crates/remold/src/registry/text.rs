//! Value-level text operations: trim, upper, lower, switch, clear.
//!
//! All of them leave null cells untouched.

use regex::{NoExpand, Regex};
use unicode_normalization::UnicodeNormalization;

use super::unexpected_params;
use crate::error::Result;
use crate::plan::OperationParams;
use crate::table::Table;

/// Accented letters and ordinal indicators that survive the first pass of `clear`.
const KEPT_ACCENTED: &str = "àáâãäèéêëìíîïòóôõöùúûüçñÀÁÂÃÄÈÉÊËÌÍÎÏÒÓÔÕÖÙÚÛÜÇÑºª";

pub(super) fn trim(mut table: Table, column: &str, _params: &OperationParams) -> Result<Table> {
    table.map_column(column, |v| v.trim().to_string())?;
    Ok(table)
}

pub(super) fn upper(mut table: Table, column: &str, _params: &OperationParams) -> Result<Table> {
    table.map_column(column, |v| v.to_uppercase())?;
    Ok(table)
}

pub(super) fn lower(mut table: Table, column: &str, _params: &OperationParams) -> Result<Table> {
    table.map_column(column, |v| v.to_lowercase())?;
    Ok(table)
}

/// Replace whole-word occurrences of each `from[i]` with `to[i]`, in order.
pub(super) fn switch(mut table: Table, column: &str, params: &OperationParams) -> Result<Table> {
    let OperationParams::Switch(switch) = params else {
        return Err(unexpected_params("switch", params));
    };

    table.require_column(column)?;

    let rules: Vec<(Regex, &str)> = switch
        .pairs()
        .map(|(from, to)| {
            let pattern = format!(r"\b{}\b", regex::escape(from));
            Regex::new(&pattern).map(|re| (re, to))
        })
        .collect::<std::result::Result<_, _>>()?;

    table.map_column(column, |value| {
        let mut current = value.to_string();
        for (re, to) in &rules {
            current = re.replace_all(&current, NoExpand(to)).into_owned();
        }
        current
    })?;
    Ok(table)
}

pub(super) fn clear(mut table: Table, column: &str, _params: &OperationParams) -> Result<Table> {
    table.map_column(column, clear_value)?;
    Ok(table)
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '.' | '-' | '/')
        || KEPT_ACCENTED.contains(c)
}

/// Strip special characters and accents from a value.
///
/// Keeps ASCII letters and digits, whitespace, `.`, `-` and `/`. Accented
/// Latin letters are reduced to their base letter.
///
/// ```
/// use remold::registry::clear_value;
///
/// assert_eq!(clear_value("São Paulo!"), "Sao Paulo");
/// assert_eq!(clear_value("@#$%"), "");
/// ```
pub fn clear_value(value: &str) -> String {
    let filtered: String = value.chars().filter(|c| is_kept(*c)).collect();
    filtered.nfkd().filter(char::is_ascii).collect()
}
