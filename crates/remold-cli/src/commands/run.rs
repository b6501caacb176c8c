//! Run command - extract, transform and load every dataset in a plan.

use std::path::PathBuf;

use colored::Colorize;
use remold::{CsvDirectorySink, CsvDirectorySource, Pipeline, PipelinePlan, TransformEngine};

use super::build_registry;

/// Arguments of the `run` subcommand.
pub struct RunArgs {
    pub config: PathBuf,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub cities: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub datasets: Vec<String>,
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.source_dir.is_dir() {
        return Err(format!("Source directory not found: {}", args.source_dir.display()).into());
    }

    let mut plan = PipelinePlan::load(&args.config)?;
    if !args.datasets.is_empty() {
        let unknown: Vec<_> = args
            .datasets
            .iter()
            .filter(|d| plan.table(d).is_none())
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(format!("Datasets not in plan: {}", unknown.join(", ")).into());
        }
        plan.retain_datasets(&args.datasets);
    }

    let registry = build_registry(&plan, args.cities.as_deref())?;
    let mut engine = TransformEngine::new(registry);
    if let Some(dir) = args.export_dir {
        engine = engine.with_export_dir(dir);
    }

    if !args.json {
        println!(
            "{} {} dataset(s) from {}",
            "Running".cyan().bold(),
            plan.len().to_string().white().bold(),
            args.config.display()
        );
    }

    let pipeline = Pipeline::new(engine, plan);
    let mut source = CsvDirectorySource::new(&args.source_dir);
    let mut sink = CsvDirectorySink::new(&args.target_dir)?;
    let summary = pipeline.run(&mut source, &mut sink)?;

    if args.json {
        let report = serde_json::json!({
            "summary": summary,
            "sources": source.extracted(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    for table in &summary.tables {
        println!(
            "  {} {} → {}  {} rows in, {} rows out",
            "✓".green(),
            table.dataset.white().bold(),
            table.destination.cyan(),
            table.rows_extracted,
            table.rows_loaded.to_string().green()
        );
    }
    println!();
    println!(
        "{} {} rows into {}",
        "Loaded".green().bold(),
        summary.total_rows().to_string().white().bold(),
        sink.dir().display()
    );

    Ok(())
}
