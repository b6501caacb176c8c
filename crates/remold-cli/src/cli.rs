//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Remold: configuration-driven table transformation
#[derive(Parser)]
#[command(name = "remold")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file (appended, no colors)
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract, transform and load every dataset in a plan
    Run {
        /// Path to the JSON plan
        #[arg(short, long, value_name = "PLAN")]
        config: PathBuf,

        /// Directory holding one <source_table>.csv per dataset
        #[arg(short, long, value_name = "DIR")]
        source_dir: PathBuf,

        /// Directory clean tables are appended to as <destination>.csv
        #[arg(short, long, value_name = "DIR")]
        target_dir: PathBuf,

        /// City lookup JSON used by the search operation
        #[arg(long, value_name = "FILE")]
        cities: Option<PathBuf>,

        /// Also write each clean table to <DIR>/<dataset>.csv
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,

        /// Only run these datasets (repeatable)
        #[arg(short, long = "dataset", value_name = "NAME")]
        datasets: Vec<String>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transform a single CSV file with one dataset's plan
    Apply {
        /// Raw CSV/TSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the JSON plan
        #[arg(short, long, value_name = "PLAN")]
        config: PathBuf,

        /// Dataset whose plan to use (default: the only one in the plan)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Output CSV path (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// City lookup JSON used by the search operation
        #[arg(long, value_name = "FILE")]
        cities: Option<PathBuf>,
    },

    /// Validate a plan without touching any data
    Check {
        /// Path to the JSON plan
        #[arg(value_name = "PLAN")]
        config: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the registered operations
    Operations {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
