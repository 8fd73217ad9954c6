//! Stage sequencing for the haunted places analysis pipeline.
//!
//! Five stages run in a fixed order (Convert, Break, Similarity, Clustering,
//! Visualization), handing artifacts to each other through the filesystem.
//! Each stage can be skipped, in which case its output must already exist.

pub mod builtin;
pub mod cleanup;
pub mod config;
pub mod errors;
pub mod execution;
pub mod executor;
pub mod layout;
pub mod orchestrator;
pub mod preflight;
pub(crate) mod process;
pub mod result;
pub mod stage;

// Re-export public API for convenience
pub use errors::PipelineError;
pub use execution::RunOptions;
pub use executor::{PipelineExecutor, StageExecutor, StageRun};
pub use layout::RunLayout;
pub use orchestrator::{check_pipeline, run_pipeline, run_with_executor};
pub use result::{CheckResult, PipelineResult, StageOutcome, StageStatus};
pub use stage::{Artifact, Stage};
