//! Pattern-driven operations: format and split.

use once_cell::sync::Lazy;
use regex::Regex;

use super::unexpected_params;
use crate::error::Result;
use crate::plan::{FormatKind, OperationParams};
use crate::table::{Cell, Table};

static CPF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{3})([0-9]{3})([0-9]{3})([0-9]{2})").unwrap());

static CNPJ_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{2})([0-9]{3})([0-9]{3})([0-9]{4})([0-9]{2})").unwrap());

static DATETIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})[-./ ]?([0-9]{2})[-./ ]?([0-9]{2})").unwrap());

static CEP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]{5})([0-9]{3})").unwrap());

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})?([0-9]{8,9})$").unwrap());

fn rule(kind: FormatKind) -> (&'static Regex, &'static str) {
    match kind {
        FormatKind::Cpf => (&*CPF_PATTERN, "${1}.${2}.${3}-${4}"),
        FormatKind::Cnpj => (&*CNPJ_PATTERN, "${1}.${2}.${3}/${4}-${5}"),
        FormatKind::Datetime => (&*DATETIME_PATTERN, "${1}-${2}-${3} 00:00:00.000"),
        FormatKind::Cep => (&*CEP_PATTERN, "${1}-${2}"),
    }
}

/// Reformat the first match of the pattern for `kind`; other text is untouched.
///
/// ```
/// use remold::plan::FormatKind;
/// use remold::registry::format_value;
///
/// assert_eq!(format_value(FormatKind::Cep, "12345678"), "12345-678");
/// assert_eq!(format_value(FormatKind::Cep, "n/a"), "n/a");
/// ```
pub fn format_value(kind: FormatKind, value: &str) -> String {
    let (pattern, template) = rule(kind);
    pattern.replace(value, template).into_owned()
}

/// Split a phone number into `(area prefix, number)`.
///
/// Returns `None` when the value is not 8 to 11 digits shaped as
/// `[DD]NNNNNNNN[N]`. The prefix is `None` when the value has no area code.
pub fn split_value(value: &str) -> Option<(Option<&str>, &str)> {
    let caps = PHONE_PATTERN.captures(value)?;
    let number = caps.get(2)?.as_str();
    Some((caps.get(1).map(|m| m.as_str()), number))
}

pub(super) fn format(mut table: Table, column: &str, params: &OperationParams) -> Result<Table> {
    let OperationParams::Format(kind) = params else {
        return Err(unexpected_params("format", params));
    };
    let kind = *kind;
    table.map_column(column, |value| format_value(kind, value))?;
    Ok(table)
}

pub(super) fn split(mut table: Table, column: &str, params: &OperationParams) -> Result<Table> {
    let OperationParams::Split(kind) = params else {
        return Err(unexpected_params("split", params));
    };

    let (prefixes, numbers): (Vec<Cell>, Vec<Cell>) = table
        .require_column(column)?
        .iter()
        .map(|cell| match cell.as_deref().and_then(split_value) {
            Some((prefix, number)) => (prefix.map(str::to_string), Some(number.to_string())),
            None => (None, None),
        })
        .unzip();

    let (prefix_column, number_column) = kind.columns();
    table.set_column(prefix_column, prefixes)?;
    table.set_column(number_column, numbers)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SplitKind;
    use crate::table::text_cells;

    #[test]
    fn test_format_literals() {
        assert_eq!(format_value(FormatKind::Cpf, "12345678901"), "123.456.789-01");
        assert_eq!(format_value(FormatKind::Cnpj, "12345678901234"), "12.345.678/9012-34");
        assert_eq!(format_value(FormatKind::Cep, "12345678"), "12345-678");
        assert_eq!(
            format_value(FormatKind::Datetime, "2023-12-25"),
            "2023-12-25 00:00:00.000"
        );
        assert_eq!(
            format_value(FormatKind::Datetime, "20231225"),
            "2023-12-25 00:00:00.000"
        );
    }

    #[test]
    fn test_format_non_matching_unchanged() {
        assert_eq!(format_value(FormatKind::Cpf, "123"), "123");
        assert_eq!(format_value(FormatKind::Cnpj, "abc"), "abc");
    }

    #[test]
    fn test_format_only_first_match() {
        assert_eq!(
            format_value(FormatKind::Cep, "12345678 87654321"),
            "12345-678 87654321"
        );
    }

    #[test]
    fn test_split_value() {
        assert_eq!(split_value("11999999999"), Some((Some("11"), "999999999")));
        assert_eq!(split_value("33334444"), Some((None, "33334444")));
        assert_eq!(split_value("(11) 9999-9999"), None);
        assert_eq!(split_value("123"), None);
    }

    #[test]
    fn test_split_landline_columns() {
        let table = Table::from_columns(vec![(
            "Telefone",
            vec![Some("11999999999".into()), Some("abc".into()), None],
        )])
        .unwrap();
        let out = split(table, "Telefone", &OperationParams::Split(SplitKind::Landline)).unwrap();
        let names: Vec<_> = out.column_names().collect();
        assert_eq!(names, vec!["Telefone", "DDD1", "Fone_Numero"]);
        assert_eq!(out.get(0, "DDD1"), Some("11"));
        assert_eq!(out.get(0, "Fone_Numero"), Some("999999999"));
        assert_eq!(out.get(1, "DDD1"), None);
        assert_eq!(out.get(2, "Fone_Numero"), None);
    }

    #[test]
    fn test_split_repurposes_number_column() {
        let table = Table::from_columns(vec![("Fone_Numero", text_cells(&["11999999999"]))]).unwrap();
        let out = split(table, "Fone_Numero", &OperationParams::Split(SplitKind::Landline)).unwrap();
        let names: Vec<_> = out.column_names().collect();
        assert_eq!(names, vec!["Fone_Numero", "DDD1"]);
        assert_eq!(out.get(0, "DDD1"), Some("11"));
        assert_eq!(out.get(0, "Fone_Numero"), Some("999999999"));
    }

    #[test]
    fn test_split_overwrites_existing_columns_in_place() {
        let table = Table::from_columns(vec![
            ("DDD_Celular", text_cells(&["00"])),
            ("Celular", text_cells(&["21988887777"])),
        ])
        .unwrap();
        let out = split(table, "Celular", &OperationParams::Split(SplitKind::Mobile)).unwrap();
        let names: Vec<_> = out.column_names().collect();
        assert_eq!(names, vec!["DDD_Celular", "Celular", "Numero_Celular"]);
        assert_eq!(out.get(0, "DDD_Celular"), Some("21"));
    }

    #[test]
    fn test_format_keeps_nulls() {
        let table = Table::from_columns(vec![("CPF", vec![None, Some("12345678901".into())])])
            .unwrap();
        let out = format(table, "CPF", &OperationParams::Format(FormatKind::Cpf)).unwrap();
        assert_eq!(out.get(0, "CPF"), None);
        assert_eq!(out.get(1, "CPF"), Some("123.456.789-01"));
    }
}
