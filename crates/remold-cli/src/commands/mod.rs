//! CLI command implementations.

pub mod apply;
pub mod check;
pub mod operations;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use remold::{CityDirectory, OperationRegistry, PipelinePlan};

/// Whether any enabled step in the plan uses `search`.
pub fn uses_search(plan: &PipelinePlan) -> bool {
    plan.tables
        .values()
        .any(|table| table.enabled_steps().any(|(_, step)| step.name == "search"))
}

/// Build the built-in registry, loading city data when a path is given.
///
/// Plans that use `search` must supply the city data.
pub fn build_registry(
    plan: &PipelinePlan,
    cities: Option<&Path>,
) -> Result<OperationRegistry, Box<dyn std::error::Error>> {
    let directory = match cities {
        Some(path) => {
            let directory = CityDirectory::load(path)?;
            tracing::debug!(path = %path.display(), cities = directory.len(), "loaded city lookup data");
            directory
        }
        None if uses_search(plan) => {
            return Err("the plan uses 'search'; pass --cities <FILE> with the city lookup data".into());
        }
        None => CityDirectory::new(),
    };
    Ok(OperationRegistry::with_builtins(Arc::new(directory)))
}
