//! Pipeline error model.
//!
//! Every variant is fatal to the run. There are no retries: each stage is a
//! one-shot batch transform, so the orchestrator only sequences and reports.

use std::path::PathBuf;

use crate::stage::{Artifact, Stage};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The pipeline file or CLI overrides are invalid.
    #[error(transparent)]
    Config(#[from] anyhow::Error),

    /// A stage input or a skipped stage's output is absent. Raised during
    /// preflight, before any stage executes.
    #[error("{stage}: required {artifact} not found at {}", path.display())]
    MissingPrecondition {
        stage: Stage,
        artifact: Artifact,
        path: PathBuf,
    },

    /// A stage exited unsuccessfully, could not be spawned, or its built-in
    /// implementation failed.
    #[error("{stage} stage failed: {detail}")]
    StageExecution { stage: Stage, detail: String },

    /// A stage reported success but its output artifact is absent.
    #[error("{stage} stage completed but produced no {artifact} at {}", path.display())]
    MissingOutput {
        stage: Stage,
        artifact: Artifact,
        path: PathBuf,
    },

    /// Filesystem failure outside of any stage (cleanup, path resolution).
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn stage_failed(stage: Stage, detail: impl Into<String>) -> Self {
        Self::StageExecution {
            stage,
            detail: detail.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::MissingPrecondition { stage, .. }
            | Self::StageExecution { stage, .. }
            | Self::MissingOutput { stage, .. } => Some(*stage),
            Self::Config(_) | Self::Io { .. } => None,
        }
    }

    /// Returns `true` for errors raised before any stage was launched.
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingPrecondition { .. })
    }
}
