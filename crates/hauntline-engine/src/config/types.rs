//! Pipeline configuration types deserialized from YAML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_version")]
    pub version: String,
    /// Directory every relative path and every stage command is resolved against.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Key of the record array inside the structured record collection.
    #[serde(default = "default_records_key")]
    pub records_key: String,
    #[serde(default)]
    pub stages: StagesConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_records_key() -> String {
    "haunted_places".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            workdir: default_workdir(),
            paths: PathsConfig::default(),
            records_key: default_records_key(),
            stages: StagesConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn stage(&self, stage: Stage) -> &StageConfig {
        match stage {
            Stage::Convert => &self.stages.convert,
            Stage::Break => &self.stages.break_,
            Stage::Similarity => &self.stages.similarity,
            Stage::Clustering => &self.stages.clustering,
            Stage::Visualization => &self.stages.visualization,
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut StageConfig {
        match stage {
            Stage::Convert => &mut self.stages.convert,
            Stage::Break => &mut self.stages.break_,
            Stage::Similarity => &mut self.stages.similarity,
            Stage::Clustering => &mut self.stages.clustering,
            Stage::Visualization => &mut self.stages.visualization,
        }
    }

    pub fn is_skipped(&self, stage: Stage) -> bool {
        self.stage(stage).skip
    }
}

/// Artifact locations, relative to `workdir` unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,
    #[serde(default = "default_records")]
    pub records: PathBuf,
    #[serde(default = "default_fragments")]
    pub fragments: PathBuf,
    #[serde(default = "default_similarity_dir")]
    pub similarity: PathBuf,
    #[serde(default = "default_clusters_dir")]
    pub clusters: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from("datasets/merged_dataset.tsv")
}
fn default_records() -> PathBuf {
    PathBuf::from("data/haunted_places.json")
}
fn default_fragments() -> PathBuf {
    PathBuf::from("data/haunted_places")
}
fn default_similarity_dir() -> PathBuf {
    PathBuf::from("similarity-results")
}
fn default_clusters_dir() -> PathBuf {
    PathBuf::from("cluster-results")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            records: default_records(),
            fragments: default_fragments(),
            similarity: default_similarity_dir(),
            clusters: default_clusters_dir(),
        }
    }
}

/// Per-stage settings.
///
/// A stage without a `command` runs its built-in implementation; only
/// `convert` and `break` have one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    #[serde(default)]
    pub skip: bool,
    /// Program followed by its arguments. Arguments may reference
    /// `{source}`, `{records}`, `{fragments}`, `{similarity}`, `{clusters}`
    /// and `{workdir}`.
    #[serde(default)]
    pub command: Option<Vec<String>>,
    /// Start the process and move on without waiting for it to exit.
    #[serde(default)]
    pub detach: bool,
}

impl StageConfig {
    fn external(args: &[&str]) -> Self {
        Self {
            skip: false,
            command: Some(args.iter().map(|s| (*s).to_string()).collect()),
            detach: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagesConfig {
    #[serde(default)]
    pub convert: StageConfig,
    #[serde(default, rename = "break")]
    pub break_: StageConfig,
    #[serde(default = "default_similarity_stage")]
    pub similarity: StageConfig,
    #[serde(default = "default_clustering_stage")]
    pub clustering: StageConfig,
    #[serde(default = "default_visualization_stage")]
    pub visualization: StageConfig,
}

fn default_similarity_stage() -> StageConfig {
    StageConfig::external(&[
        "python3",
        "scripts/run-tika-similarity.py",
        "--input-dir",
        "{fragments}",
        "--type",
        "all",
    ])
}

/// `generate-cluster-scores.py` takes no arguments and writes its cluster
/// files next to the similarity scores; they are copied into `{clusters}`.
const CLUSTERING_SCRIPT: &str = "python3 scripts/generate-cluster-scores.py \
    && mkdir -p '{clusters}' \
    && for f in '{similarity}'/*_clusters.json '{similarity}'/*_circle.json '{similarity}'/*_cluster_d3.json; do \
    if [ -f \"$f\" ]; then cp \"$f\" '{clusters}'/; fi; done";

fn default_clustering_stage() -> StageConfig {
    StageConfig::external(&["sh", "-c", CLUSTERING_SCRIPT])
}

fn default_visualization_stage() -> StageConfig {
    StageConfig {
        detach: true,
        ..StageConfig::external(&["python3", "scripts/visualize-results.py"])
    }
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            convert: StageConfig::default(),
            break_: StageConfig::default(),
            similarity: default_similarity_stage(),
            clustering: default_clustering_stage(),
            visualization: default_visualization_stage(),
        }
    }
}
