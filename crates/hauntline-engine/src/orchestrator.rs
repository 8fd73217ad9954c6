//! Pipeline orchestrator: resolves the run layout, checks preconditions, and
//! runs the five stages strictly in order.

use std::time::Instant;

use crate::cleanup;
use crate::config::validator::validate_pipeline;
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::execution::RunOptions;
use crate::executor::{PipelineExecutor, StageExecutor, StageRun};
use crate::layout::RunLayout;
use crate::preflight;
use crate::result::{CheckResult, PipelineResult, StageOutcome, StageStatus};
use crate::stage::Stage;

/// Apply CLI overrides, validate, and resolve the layout.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] if validation fails.
pub fn prepare(
    config: &PipelineConfig,
    options: &RunOptions,
) -> Result<(PipelineConfig, RunLayout), PipelineError> {
    let mut config = config.clone();
    options.apply(&mut config);
    validate_pipeline(&config)?;
    let layout = RunLayout::resolve(&config)?;
    Ok((config, layout))
}

/// Run the pipeline with the production executor.
///
/// # Errors
///
/// Returns the first error encountered; see [`run_with_executor`].
pub async fn run_pipeline(
    config: &PipelineConfig,
    options: &RunOptions,
) -> Result<PipelineResult, PipelineError> {
    let (config, layout) = prepare(config, options)?;
    if options.fresh {
        // Removal must not run ahead of a precondition failure
        preflight::check_preconditions(&config, &layout)?;
        let executed = Stage::ALL.into_iter().filter(|s| !config.is_skipped(*s));
        cleanup::remove_outputs(&layout, executed)?;
    }
    let executor = PipelineExecutor::new(&config);
    run_with_executor(&config, &layout, &executor).await
}

/// Run every stage in order through `executor`.
///
/// All skip preconditions and the source table are checked before anything
/// is launched. A failing stage halts the run; later stages are never invoked.
///
/// # Errors
///
/// - [`PipelineError::MissingPrecondition`] from preflight.
/// - [`PipelineError::StageExecution`] from the first failing stage.
/// - [`PipelineError::MissingOutput`] when a stage succeeded without leaving
///   its output artifact.
pub async fn run_with_executor<E: StageExecutor>(
    config: &PipelineConfig,
    layout: &RunLayout,
    executor: &E,
) -> Result<PipelineResult, PipelineError> {
    let start = Instant::now();
    preflight::check_preconditions(config, layout)?;

    tracing::info!(
        workdir = %layout.workdir.display(),
        source = %layout.source.display(),
        skipped = Stage::ALL.iter().filter(|s| config.is_skipped(**s)).count(),
        "Preflight passed"
    );

    let mut outcomes = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        if config.is_skipped(stage) {
            tracing::info!(stage = %stage, "Skipping stage");
            outcomes.push(StageOutcome {
                stage,
                status: StageStatus::Skipped,
            });
            continue;
        }

        let stage_start = Instant::now();
        let run = executor.execute(stage, layout).await.inspect_err(|err| {
            tracing::error!(stage = %stage, "Stage failed: {}", err);
        })?;

        let status = match run {
            StageRun::Completed => {
                if let Some(artifact) = stage.output() {
                    if !layout.is_present(artifact) {
                        return Err(PipelineError::MissingOutput {
                            stage,
                            artifact,
                            path: layout.path(artifact).to_path_buf(),
                        });
                    }
                }
                let duration_secs = stage_start.elapsed().as_secs_f64();
                tracing::info!(stage = %stage, duration_secs, "Stage completed");
                StageStatus::Completed { duration_secs }
            }
            StageRun::Launched { pid } => {
                tracing::info!(stage = %stage, pid, "Stage launched in background");
                StageStatus::Launched { pid }
            }
        };
        outcomes.push(StageOutcome { stage, status });
    }

    let duration_secs = start.elapsed().as_secs_f64();
    tracing::info!(duration_secs, "Pipeline completed");
    Ok(PipelineResult {
        outcomes,
        duration_secs,
    })
}

/// Validate configuration and report, per stage, whether the run could start.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] if validation fails. Unmet
/// preconditions are reported in the result, not as an error.
pub fn check_pipeline(
    config: &PipelineConfig,
    options: &RunOptions,
) -> Result<CheckResult, PipelineError> {
    let (config, layout) = prepare(config, options)?;
    Ok(CheckResult {
        plans: preflight::plan(&config, &layout),
    })
}
