//! Apply command - transform one CSV file with a dataset's plan.

use std::path::PathBuf;

use colored::Colorize;
use remold::output::{write_csv, write_to};
use remold::{CsvReader, PipelinePlan, TransformEngine};

use super::build_registry;

pub fn run(
    file: PathBuf,
    config: PathBuf,
    dataset: Option<String>,
    output: Option<PathBuf>,
    cities: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let plan = PipelinePlan::load(&config)?;
    let table_plan = match &dataset {
        Some(name) => plan
            .table(name)
            .ok_or_else(|| format!("Dataset '{}' not in plan", name))?,
        None if plan.len() == 1 => plan
            .tables
            .values()
            .next()
            .ok_or("Plan has no datasets")?,
        None => {
            let names: Vec<_> = plan.tables.keys().map(|k| k.as_str()).collect();
            return Err(format!(
                "Plan has {} datasets; choose one with --dataset ({})",
                plan.len(),
                names.join(", ")
            )
            .into());
        }
    };

    let registry = build_registry(&plan, cities.as_deref())?;
    let engine = TransformEngine::new(registry);

    let (raw, delimiter) = CsvReader::new().read_file(&file)?;
    tracing::info!(
        file = %file.display(),
        delimiter = %char::from(delimiter),
        rows = raw.row_count(),
        "read raw table"
    );

    let clean = engine.transform_table(table_plan, raw)?;

    match output {
        Some(path) => {
            let rows = write_csv(&path, &clean)?;
            eprintln!(
                "{} {} rows ({} → {}) to {}",
                "Wrote".green().bold(),
                rows.to_string().white().bold(),
                table_plan.dataset,
                table_plan.destination.cyan(),
                path.display()
            );
        }
        None => {
            write_to(std::io::stdout().lock(), &clean)?;
        }
    }

    Ok(())
}
