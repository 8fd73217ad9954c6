use std::path::Path;

use anyhow::{Context, Result};

use hauntline_engine::config::parser;
use hauntline_engine::{orchestrator, PipelineResult, RunOptions, StageStatus};

/// Execute the `run` command: load configuration and run the pipeline.
pub async fn execute(config_path: Option<&Path>, options: &RunOptions) -> Result<()> {
    // 1. Load pipeline YAML (or defaults)
    let config = parser::load_pipeline(config_path).with_context(|| match config_path {
        Some(path) => format!("Failed to load pipeline: {}", path.display()),
        None => "Failed to load default pipeline".to_string(),
    })?;

    // 2. Run; validation and preflight happen before any stage starts
    let result = orchestrator::run_pipeline(&config, options).await?;

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &PipelineResult) {
    println!("Pipeline completed successfully.");
    for outcome in &result.outcomes {
        let status = match &outcome.status {
            StageStatus::Skipped => "skipped".to_string(),
            StageStatus::Completed { duration_secs } => format!("done in {duration_secs:.2}s"),
            StageStatus::Launched { pid: Some(pid) } => format!("running in background (pid {pid})"),
            StageStatus::Launched { pid: None } => "running in background".to_string(),
        };
        println!("  {:15} {}", format!("{}:", outcome.stage), status);
    }
    println!("  Duration:       {:.2}s", result.duration_secs);

    let launched = result
        .outcomes
        .iter()
        .any(|o| matches!(o.status, StageStatus::Launched { .. }));
    if launched {
        println!("\nThe visualization server is starting; open http://localhost:8000 to view the results.");
    }
}
