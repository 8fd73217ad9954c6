//! Removal of stage outputs between runs.

use std::path::PathBuf;

use crate::errors::PipelineError;
use crate::layout::RunLayout;
use crate::stage::{ArtifactKind, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Deleted(PathBuf),
    NotFound(PathBuf),
}

/// Delete the output artifact of each listed stage. The source table is
/// never an output, so it is never touched.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] on the first path that exists but cannot be removed.
pub fn remove_outputs(
    layout: &RunLayout,
    stages: impl IntoIterator<Item = Stage>,
) -> Result<Vec<Removal>, PipelineError> {
    let mut removals = Vec::new();
    for stage in stages {
        let Some(artifact) = stage.output() else {
            continue;
        };
        let path = layout.path(artifact).to_path_buf();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Path not found, skipping");
            removals.push(Removal::NotFound(path));
            continue;
        }
        let result = match artifact.kind() {
            ArtifactKind::Directory if path.is_dir() => std::fs::remove_dir_all(&path),
            _ => std::fs::remove_file(&path),
        };
        result.map_err(|e| PipelineError::io(&path, e))?;
        tracing::info!(stage = %stage, path = %path.display(), "Removed stage output");
        removals.push(Removal::Deleted(path));
    }
    Ok(removals)
}

/// Delete every stage output in the layout.
///
/// # Errors
///
/// See [`remove_outputs`].
pub fn clean_all(layout: &RunLayout) -> Result<Vec<Removal>, PipelineError> {
    remove_outputs(layout, Stage::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn populated_layout(dir: &std::path::Path) -> RunLayout {
        let layout = RunLayout::under(dir.to_path_buf(), &PipelineConfig::default());
        std::fs::create_dir_all(layout.source.parent().unwrap()).unwrap();
        std::fs::write(&layout.source, "State\n").unwrap();
        std::fs::create_dir_all(&layout.fragments).unwrap();
        std::fs::write(&layout.records, "[]").unwrap();
        std::fs::write(layout.fragments.join("item_0.txt"), "x").unwrap();
        std::fs::create_dir_all(&layout.similarity).unwrap();
        std::fs::write(layout.similarity.join("cosine_similarity.csv"), "x").unwrap();
        layout
    }

    #[test]
    fn test_clean_all_keeps_source_table() {
        let dir = tempfile::tempdir().unwrap();
        let layout = populated_layout(dir.path());

        let removals = clean_all(&layout).unwrap();
        assert_eq!(
            removals,
            vec![
                Removal::Deleted(layout.records.clone()),
                Removal::Deleted(layout.fragments.clone()),
                Removal::Deleted(layout.similarity.clone()),
                Removal::NotFound(layout.clusters.clone()),
            ]
        );
        assert!(layout.source.is_file());
        assert!(!layout.fragments.exists());
    }

    #[test]
    fn test_remove_selected_outputs_only() {
        let dir = tempfile::tempdir().unwrap();
        let layout = populated_layout(dir.path());

        remove_outputs(&layout, [Stage::Similarity]).unwrap();
        assert!(!layout.similarity.exists());
        assert!(layout.records.is_file());
        assert!(layout.fragments.is_dir());
    }
}
