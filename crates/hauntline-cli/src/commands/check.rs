use std::path::Path;

use anyhow::{Context, Result};

use hauntline_engine::config::parser;
use hauntline_engine::preflight::StagePlan;
use hauntline_engine::{orchestrator, RunOptions};

/// Execute the `check` command: validate configuration and stage preconditions.
pub fn execute(config_path: Option<&Path>, options: &RunOptions) -> Result<()> {
    // 1. Load pipeline YAML (or defaults)
    let config = parser::load_pipeline(config_path).with_context(|| match config_path {
        Some(path) => format!("Failed to load pipeline: {}", path.display()),
        None => "Failed to load default pipeline".to_string(),
    })?;

    // 2. Validate and plan
    let result = orchestrator::check_pipeline(&config, options)?;
    println!("Pipeline structure: OK");

    // 3. Report results
    for plan in &result.plans {
        print_plan(plan);
    }

    if result.is_ok() {
        println!("\nAll checks passed.");
        Ok(())
    } else {
        anyhow::bail!("One or more checks failed")
    }
}

fn print_plan(plan: &StagePlan) {
    let action = if plan.skipped { "skip" } else { "run" };
    let status = if plan.satisfied { "OK" } else { "MISSING" };
    println!("{:18} {:5}{}", format!("{}:", plan.stage), action, status);
    if let (Some(artifact), Some(path)) = (plan.requires, &plan.path) {
        println!("  requires {} at {}", artifact, path.display());
    }
}
