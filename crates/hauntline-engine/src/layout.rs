//! Run-scoped artifact paths.
//!
//! A [`RunLayout`] is built once per run from the configuration and handed
//! to every stage, so nothing downstream reads a conventional path on its own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::stage::{Artifact, ArtifactKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub workdir: PathBuf,
    pub source: PathBuf,
    pub records: PathBuf,
    pub fragments: PathBuf,
    pub similarity: PathBuf,
    pub clusters: PathBuf,
}

impl RunLayout {
    /// Resolve every configured path against the working directory.
    ///
    /// A relative `workdir` is resolved against the process's current directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the current directory cannot be read.
    pub fn resolve(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let workdir = if config.workdir.is_absolute() {
            config.workdir.clone()
        } else {
            let cwd = std::env::current_dir().map_err(|e| PipelineError::io(".", e))?;
            normalize(&cwd.join(&config.workdir))
        };
        Ok(Self::under(workdir, config))
    }

    /// Build a layout rooted at an already-absolute working directory.
    pub fn under(workdir: PathBuf, config: &PipelineConfig) -> Self {
        let join = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                normalize(&workdir.join(p))
            }
        };
        Self {
            source: join(&config.paths.source),
            records: join(&config.paths.records),
            fragments: join(&config.paths.fragments),
            similarity: join(&config.paths.similarity),
            clusters: join(&config.paths.clusters),
            workdir,
        }
    }

    pub fn path(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::SourceTable => &self.source,
            Artifact::Records => &self.records,
            Artifact::Fragments => &self.fragments,
            Artifact::SimilarityResults => &self.similarity,
            Artifact::ClusterResults => &self.clusters,
        }
    }

    /// Whether the artifact exists in a usable form: a regular file, or a
    /// directory with at least one entry.
    pub fn is_present(&self, artifact: Artifact) -> bool {
        let path = self.path(artifact);
        match artifact.kind() {
            ArtifactKind::File => path.is_file(),
            ArtifactKind::Directory => std::fs::read_dir(path)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false),
        }
    }

    /// Values substituted into stage command placeholders.
    pub fn placeholders(&self) -> HashMap<&'static str, String> {
        let display = |p: &Path| p.to_string_lossy().into_owned();
        HashMap::from([
            ("source", display(&self.source)),
            ("records", display(&self.records)),
            ("fragments", display(&self.fragments)),
            ("similarity", display(&self.similarity)),
            ("clusters", display(&self.clusters)),
            ("workdir", display(&self.workdir)),
        ])
    }
}

/// Lexically drop `.` components and fold `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_layout_under_workdir() {
        let layout = RunLayout::under(PathBuf::from("/srv/run"), &PipelineConfig::default());
        assert_eq!(
            layout.source,
            PathBuf::from("/srv/run/datasets/merged_dataset.tsv")
        );
        assert_eq!(
            layout.records,
            PathBuf::from("/srv/run/data/haunted_places.json")
        );
        assert_eq!(layout.fragments, PathBuf::from("/srv/run/data/haunted_places"));
        assert_eq!(layout.similarity, PathBuf::from("/srv/run/similarity-results"));
        assert_eq!(layout.clusters, PathBuf::from("/srv/run/cluster-results"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let mut config = PipelineConfig::default();
        config.paths.source = PathBuf::from("/data/places.tsv");
        config.paths.clusters = PathBuf::from("./out/../clusters");
        let layout = RunLayout::under(PathBuf::from("/srv/run"), &config);
        assert_eq!(layout.source, PathBuf::from("/data/places.tsv"));
        assert_eq!(layout.clusters, PathBuf::from("/srv/run/clusters"));
    }

    #[test]
    fn test_resolve_relative_workdir() {
        let layout = RunLayout::resolve(&PipelineConfig::default()).unwrap();
        assert!(layout.workdir.is_absolute());
        assert!(layout.records.starts_with(&layout.workdir));
    }

    #[test]
    fn test_presence_rules() {
        let dir = tempdir().unwrap();
        let layout = RunLayout::under(dir.path().to_path_buf(), &PipelineConfig::default());

        assert!(!layout.is_present(Artifact::Records));
        std::fs::create_dir_all(layout.records.parent().unwrap()).unwrap();
        std::fs::write(&layout.records, "{}").unwrap();
        assert!(layout.is_present(Artifact::Records));

        // An empty directory does not count as a produced result set
        std::fs::create_dir_all(&layout.fragments).unwrap();
        assert!(!layout.is_present(Artifact::Fragments));
        std::fs::write(layout.fragments.join("item_0.txt"), "State: Ohio\n").unwrap();
        assert!(layout.is_present(Artifact::Fragments));

        // A file where a directory is expected is not present either
        std::fs::write(&layout.similarity, "not a dir").unwrap();
        assert!(!layout.is_present(Artifact::SimilarityResults));
    }

    #[test]
    fn test_placeholders_cover_every_artifact() {
        let layout = RunLayout::under(PathBuf::from("/w"), &PipelineConfig::default());
        let values = layout.placeholders();
        for key in crate::config::validator::PLACEHOLDERS {
            assert!(values.contains_key(key), "missing placeholder {key}");
        }
        assert_eq!(values["fragments"], "/w/data/haunted_places");
    }
}
