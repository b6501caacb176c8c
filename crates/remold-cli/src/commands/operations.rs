//! Operations command - list the built-in operations.

use colored::Colorize;
use remold::OperationRegistry;

/// Parameter each built-in expects, for display.
fn parameter_hint(name: &str) -> &'static str {
    match name {
        "trim" | "upper" | "lower" | "rename" | "clear" => "true",
        "switch" => r#"{"str_from": [..], "str_to": [..]}"#,
        "select" => "value to keep",
        "copy" => "source column",
        "format" => "CPF | CNPJ | DATETIME | CEP",
        "split" => "DDD1 | DDD_Celular",
        "search" => "CITY",
        _ => "-",
    }
}

pub fn run(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = OperationRegistry::default();

    if json_output {
        let ops: Vec<_> = registry
            .names()
            .map(|name| serde_json::json!({"name": name, "parameter": parameter_hint(name)}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&ops)?);
        return Ok(());
    }

    println!("{}", "Operations:".yellow().bold());
    for name in registry.names() {
        println!("  {:<8} {}", name.white().bold(), parameter_hint(name).dimmed());
    }

    Ok(())
}
