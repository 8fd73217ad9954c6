//! Pipeline execution result types.

use crate::preflight::StagePlan;
use crate::stage::Stage;

/// What happened to one stage during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum StageStatus {
    /// Not invoked; its precondition was verified instead.
    Skipped,
    /// Invoked and waited for until it succeeded.
    Completed { duration_secs: f64 },
    /// Started in the background; the run did not wait for it.
    Launched { pid: Option<u32> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    /// One entry per stage, in execution order.
    pub outcomes: Vec<StageOutcome>,
    pub duration_secs: f64,
}

impl PipelineResult {
    /// Stages that were actually invoked, in order.
    pub fn executed(&self) -> Vec<Stage> {
        self.outcomes
            .iter()
            .filter(|o| o.status != StageStatus::Skipped)
            .map(|o| o.stage)
            .collect()
    }

    pub fn skipped(&self) -> Vec<Stage> {
        self.outcomes
            .iter()
            .filter(|o| o.status == StageStatus::Skipped)
            .map(|o| o.stage)
            .collect()
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }
}

/// Result of a pipeline check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub plans: Vec<StagePlan>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.plans.iter().all(|p| p.satisfied)
    }
}
