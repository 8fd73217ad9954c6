//! Runtime options for a pipeline run (not part of pipeline YAML config).

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::stage::Stage;

/// Command-line overrides layered on top of the pipeline file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Replaces `paths.source`.
    pub source: Option<PathBuf>,
    /// Replaces `workdir`.
    pub workdir: Option<PathBuf>,
    /// Stages to skip in addition to those the pipeline file skips.
    pub skip: BTreeSet<Stage>,
    /// Remove the outputs of stages that will execute before starting.
    pub fresh: bool,
}

impl RunOptions {
    pub fn skip_stage(mut self, stage: Stage) -> Self {
        self.skip.insert(stage);
        self
    }

    /// Apply the overrides. Skip flags only ever add skips.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(source) = &self.source {
            config.paths.source.clone_from(source);
        }
        if let Some(workdir) = &self.workdir {
            config.workdir.clone_from(workdir);
        }
        for stage in &self.skip {
            config.stage_mut(*stage).skip = true;
        }
    }
}
