//! Remold CLI - configuration-driven table transformation.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use colored::Colorize;
use cli::{Cli, Commands};
use logging::LogConfig;

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose).with_log_file(cli.log_file.clone());
    if let Err(e) = logging::init_logging(&log_config) {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run {
            config,
            source_dir,
            target_dir,
            cities,
            export_dir,
            datasets,
            json,
        } => commands::run::run(commands::run::RunArgs {
            config,
            source_dir,
            target_dir,
            cities,
            export_dir,
            datasets,
            json,
        }),

        Commands::Apply {
            file,
            config,
            dataset,
            output,
            cities,
        } => commands::apply::run(file, config, dataset, output, cities),

        Commands::Check { config, json } => commands::check::run(config, json),

        Commands::Operations { json } => commands::operations::run(json),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
