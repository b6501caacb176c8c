//! Typed operation parameters, validated when a plan is parsed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RemoldError, Result};

/// Fixed reformat patterns understood by the `format` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormatKind {
    /// Brazilian individual taxpayer number: `000.000.000-00`.
    Cpf,
    /// Brazilian company taxpayer number: `00.000.000/0000-00`.
    Cnpj,
    /// Date to `YYYY-MM-DD 00:00:00.000`.
    Datetime,
    /// Postal code: `00000-000`.
    Cep,
}

impl FormatKind {
    /// Parse the configuration token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "CPF" => Some(FormatKind::Cpf),
            "CNPJ" => Some(FormatKind::Cnpj),
            "DATETIME" => Some(FormatKind::Datetime),
            "CEP" => Some(FormatKind::Cep),
            _ => None,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Cpf => write!(f, "CPF"),
            FormatKind::Cnpj => write!(f, "CNPJ"),
            FormatKind::Datetime => write!(f, "DATETIME"),
            FormatKind::Cep => write!(f, "CEP"),
        }
    }
}

/// Which pair of columns the `split` operation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitKind {
    /// `DDD1` + `Fone_Numero`.
    Landline,
    /// `DDD_Celular` + `Numero_Celular`.
    Mobile,
}

impl SplitKind {
    /// `DDD1` selects the landline branch; every other token selects mobile.
    pub fn from_token(token: &str) -> Self {
        if token == "DDD1" {
            SplitKind::Landline
        } else {
            SplitKind::Mobile
        }
    }

    /// Names of the `(prefix, number)` columns for this branch.
    pub fn columns(&self) -> (&'static str, &'static str) {
        match self {
            SplitKind::Landline => ("DDD1", "Fone_Numero"),
            SplitKind::Mobile => ("DDD_Celular", "Numero_Celular"),
        }
    }
}

/// Lookup sources for the `search` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchKind {
    /// City code lookup by `(city, state)`.
    City,
}

/// Parallel replacement lists for `switch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchParams {
    pub from: Vec<String>,
    pub to: Vec<String>,
}

impl SwitchParams {
    /// Pair up `from[i]` with `to[i]`.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.from
            .iter()
            .map(|s| s.as_str())
            .zip(self.to.iter().map(|s| s.as_str()))
    }
}

/// Parameter of one configured operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OperationParams {
    /// Parameterless operation switched on (trim, upper, lower, rename, clear).
    Flag,
    Switch(SwitchParams),
    /// Value rows must equal to survive `select`.
    Select(String),
    /// Column whose values `copy` takes.
    Copy(String),
    Format(FormatKind),
    Split(SplitKind),
    Search(SearchKind),
    /// Raw parameter for operations registered outside the built-in set.
    Custom(Value),
}

impl OperationParams {
    /// Short label for logs and error messages.
    pub fn label(&self) -> String {
        match self {
            OperationParams::Flag => "on".to_string(),
            OperationParams::Switch(p) => format!("{} replacement(s)", p.from.len()),
            OperationParams::Select(v) => format!("= '{}'", v),
            OperationParams::Copy(c) => format!("from '{}'", c),
            OperationParams::Format(k) => k.to_string(),
            OperationParams::Split(k) => format!("{:?}", k),
            OperationParams::Search(k) => format!("{:?}", k),
            OperationParams::Custom(v) => v.to_string(),
        }
    }
}

/// Whether a configuration value enables its operation.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` disable it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text form of a scalar configuration value.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Convert a raw configuration value into typed parameters.
///
/// Returns `Ok(None)` for falsy values, which disable the step.
pub fn parse_params(operation: &str, value: &Value, context: &str) -> Result<Option<OperationParams>> {
    if !is_truthy(value) {
        return Ok(None);
    }

    let malformed = |reason: String| RemoldError::malformed(context, reason);

    let params = match operation {
        "trim" | "upper" | "lower" | "rename" | "clear" => OperationParams::Flag,
        "switch" => OperationParams::Switch(parse_switch(value).map_err(malformed)?),
        "select" => OperationParams::Select(scalar_text(value).ok_or_else(|| {
            malformed(format!("'select' expects a scalar value, got {}", value))
        })?),
        "copy" => match value {
            Value::String(s) => OperationParams::Copy(s.clone()),
            other => {
                return Err(malformed(format!(
                    "'copy' expects a source column name, got {}",
                    other
                )));
            }
        },
        "format" => {
            let token = value.as_str().unwrap_or_default();
            let kind = FormatKind::from_token(token).ok_or_else(|| {
                malformed(format!(
                    "'format' expects one of CPF, CNPJ, DATETIME, CEP, got {}",
                    value
                ))
            })?;
            OperationParams::Format(kind)
        }
        "split" => match value {
            Value::String(s) => OperationParams::Split(SplitKind::from_token(s)),
            other => {
                return Err(malformed(format!("'split' expects a token, got {}", other)));
            }
        },
        "search" => match value.as_str() {
            Some(token) if token.eq_ignore_ascii_case("CITY") => {
                OperationParams::Search(SearchKind::City)
            }
            _ => {
                return Err(malformed(format!(
                    "'search' only supports CITY, got {}",
                    value
                )));
            }
        },
        _ => OperationParams::Custom(value.clone()),
    };

    Ok(Some(params))
}

fn parse_switch(value: &Value) -> std::result::Result<SwitchParams, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("'switch' expects an object with str_from/str_to, got {}", value))?;

    let list = |keys: &[&str]| -> std::result::Result<Vec<String>, String> {
        let raw = keys
            .iter()
            .find_map(|k| obj.get(*k))
            .ok_or_else(|| format!("'switch' is missing '{}'", keys[0]))?;
        let items = raw
            .as_array()
            .ok_or_else(|| format!("'switch' field '{}' must be an array", keys[0]))?;
        items
            .iter()
            .map(|item| {
                scalar_text(item)
                    .ok_or_else(|| format!("'switch' entries must be scalars, got {}", item))
            })
            .collect()
    };

    let from = list(&["str_from", "from"])?;
    let to = list(&["str_to", "to"])?;

    if from.len() != to.len() {
        return Err(format!(
            "'switch' has {} source values but {} replacements",
            from.len(),
            to.len()
        ));
    }

    Ok(SwitchParams { from, to })
}
