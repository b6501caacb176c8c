//! Check command - validate a plan against the registry.

use std::path::PathBuf;

use colored::Colorize;
use remold::{PipelinePlan, TransformEngine};

use super::uses_search;

pub fn run(config: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !config.exists() {
        return Err(format!("Plan not found: {}", config.display()).into());
    }

    let plan = PipelinePlan::load(&config)?;
    let engine = TransformEngine::default();
    engine.check(&plan)?;

    if json_output {
        let tables: Vec<_> = plan
            .tables
            .values()
            .map(|t| {
                serde_json::json!({
                    "dataset": t.dataset,
                    "source_table": t.source_table(),
                    "destination": t.destination,
                    "fields": t.fields.len(),
                    "operations": t.enabled_steps().count(),
                    "remove": t.remove,
                })
            })
            .collect();
        let report = serde_json::json!({
            "valid": true,
            "needs_cities": uses_search(&plan),
            "tables": tables,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} datasets)",
        "Plan OK:".green().bold(),
        config.display(),
        plan.len()
    );
    println!();

    for table in plan.tables.values() {
        println!(
            "{} {} → {}",
            table.dataset.white().bold(),
            format!("[{}]", table.source_table()).dimmed(),
            table.destination.cyan()
        );
        for field in table.fields.values() {
            let steps: Vec<String> = field
                .operations
                .iter()
                .map(|step| match &step.params {
                    Some(params) => format!("{}({})", step.name, params.label()),
                    None => format!("{}", step.name.dimmed()),
                })
                .collect();
            println!(
                "  {} → {}  {}",
                field.source,
                field.destination.cyan(),
                steps.join(", ")
            );
        }
        if !table.remove.is_empty() {
            println!("  {} {}", "remove:".yellow(), table.remove.join(", "));
        }
        println!();
    }

    if uses_search(&plan) {
        println!(
            "{} this plan uses 'search'; pass --cities when running it.",
            "Note:".yellow()
        );
    }

    Ok(())
}
