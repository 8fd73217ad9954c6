//! Precondition checks performed before any stage is launched.

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::layout::RunLayout;
use crate::stage::{Artifact, Stage};

/// What the run will do with one stage, and whether that is possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub stage: Stage,
    pub skipped: bool,
    /// Artifact that must exist before the run starts, if any.
    pub requires: Option<Artifact>,
    pub path: Option<PathBuf>,
    pub satisfied: bool,
}

/// Compute the requirement of every stage.
///
/// A skipped stage asserts that its own output already exists. An executed
/// stage needs nothing up front, except Convert, which reads the operator's
/// source table. Inputs of the other executed stages are produced during the
/// run and verified after each stage instead.
pub fn plan(config: &PipelineConfig, layout: &RunLayout) -> Vec<StagePlan> {
    Stage::ALL
        .iter()
        .map(|&stage| {
            let skipped = config.is_skipped(stage);
            let requires = if skipped {
                stage.output()
            } else if stage.input() == Artifact::SourceTable {
                Some(Artifact::SourceTable)
            } else {
                None
            };
            StagePlan {
                stage,
                skipped,
                requires,
                path: requires.map(|a| layout.path(a).to_path_buf()),
                satisfied: requires.map_or(true, |a| layout.is_present(a)),
            }
        })
        .collect()
}

/// Fail on the first unmet requirement, in stage order.
///
/// # Errors
///
/// Returns [`PipelineError::MissingPrecondition`] naming the stage and the
/// absent artifact.
pub fn check_preconditions(
    config: &PipelineConfig,
    layout: &RunLayout,
) -> Result<Vec<StagePlan>, PipelineError> {
    let plans = plan(config, layout);
    if let Some(unmet) = plans.iter().find(|p| !p.satisfied) {
        if let (Some(artifact), Some(path)) = (unmet.requires, &unmet.path) {
            return Err(PipelineError::MissingPrecondition {
                stage: unmet.stage,
                artifact,
                path: path.clone(),
            });
        }
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn layout_in(dir: &std::path::Path, config: &PipelineConfig) -> RunLayout {
        RunLayout::under(dir.to_path_buf(), config)
    }

    #[test]
    fn test_full_run_needs_only_source_table() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::default();
        let layout = layout_in(dir.path(), &config);

        let err = check_preconditions(&config, &layout).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingPrecondition {
                stage: Stage::Convert,
                artifact: Artifact::SourceTable,
                ..
            }
        ));

        std::fs::create_dir_all(layout.source.parent().unwrap()).unwrap();
        std::fs::write(&layout.source, "State\tLocation\n").unwrap();
        let plans = check_preconditions(&config, &layout).unwrap();
        assert_eq!(plans.len(), 5);
        assert!(plans.iter().all(|p| !p.skipped && p.satisfied));
        assert!(plans[1..].iter().all(|p| p.requires.is_none()));
    }

    #[test]
    fn test_skip_convert_requires_records() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.stage_mut(Stage::Convert).skip = true;
        let layout = layout_in(dir.path(), &config);

        let err = check_preconditions(&config, &layout).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Convert"), "got: {msg}");
        assert!(msg.contains("data/haunted_places.json"), "got: {msg}");
    }

    #[test]
    fn test_skipped_convert_does_not_need_source_table() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.stage_mut(Stage::Convert).skip = true;
        let layout = layout_in(dir.path(), &config);
        std::fs::create_dir_all(layout.records.parent().unwrap()).unwrap();
        std::fs::write(&layout.records, "[]").unwrap();

        let plans = check_preconditions(&config, &layout).unwrap();
        assert_eq!(plans[0].requires, Some(Artifact::Records));
        assert!(plans[0].skipped);
    }

    #[test]
    fn test_first_unmet_requirement_in_stage_order_is_reported() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.stage_mut(Stage::Similarity).skip = true;
        config.stage_mut(Stage::Clustering).skip = true;
        let layout = layout_in(dir.path(), &config);
        std::fs::create_dir_all(layout.source.parent().unwrap()).unwrap();
        std::fs::write(&layout.source, "State\n").unwrap();

        let err = check_preconditions(&config, &layout).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Similarity));

        let plans = plan(&config, &layout);
        let unmet: Vec<_> = plans.iter().filter(|p| !p.satisfied).map(|p| p.stage).collect();
        assert_eq!(unmet, vec![Stage::Similarity, Stage::Clustering]);
    }

    #[test]
    fn test_skipped_visualization_has_no_requirement() {
        let dir = tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.stage_mut(Stage::Visualization).skip = true;
        let layout = layout_in(dir.path(), &config);
        let plans = plan(&config, &layout);
        assert!(plans[4].skipped);
        assert!(plans[4].requires.is_none());
        assert!(plans[4].satisfied);
    }
}
