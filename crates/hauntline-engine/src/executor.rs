//! Stage invocation seam between the orchestrator and the work itself.

use std::future::Future;

use crate::builtin;
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::layout::RunLayout;
use crate::process;
use crate::stage::Stage;

/// How an invoked stage finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRun {
    /// Ran to completion successfully.
    Completed,
    /// Started in the background.
    Launched { pid: Option<u32> },
}

/// Invokes one stage. The orchestrator owns ordering, skipping and checks;
/// an executor only does the work.
pub trait StageExecutor {
    fn execute(
        &self,
        stage: Stage,
        layout: &RunLayout,
    ) -> impl Future<Output = Result<StageRun, PipelineError>> + Send;
}

/// Production executor: a configured command when there is one, otherwise
/// the stage's built-in implementation.
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    config: PipelineConfig,
}

impl PipelineExecutor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    async fn run_builtin(&self, stage: Stage, layout: &RunLayout) -> Result<StageRun, PipelineError> {
        tracing::info!(stage = %stage, "Running built-in stage");
        let layout = layout.clone();
        let records_key = self.config.records_key.clone();
        tokio::task::spawn_blocking(move || builtin::run(stage, &layout, &records_key))
            .await
            .map_err(|e| PipelineError::stage_failed(stage, format!("stage task panicked: {e}")))?
            .map_err(|e| PipelineError::stage_failed(stage, format!("{e:#}")))?;
        Ok(StageRun::Completed)
    }
}

impl StageExecutor for PipelineExecutor {
    async fn execute(&self, stage: Stage, layout: &RunLayout) -> Result<StageRun, PipelineError> {
        let stage_config = self.config.stage(stage);

        let Some(command) = &stage_config.command else {
            return self.run_builtin(stage, layout).await;
        };

        let argv = process::expand_args(command, &layout.placeholders());
        if stage_config.detach {
            let pid = process::spawn_detached(stage, &argv, &layout.workdir)?;
            Ok(StageRun::Launched { pid })
        } else {
            process::run_to_completion(stage, &argv, &layout.workdir).await?;
            Ok(StageRun::Completed)
        }
    }
}
