//! The five pipeline stages and the artifacts they hand to each other.

use std::fmt;

/// One discrete transform in the pipeline. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Source table to structured records.
    Convert,
    /// Structured records to one fragment file per record.
    Break,
    /// Fragments to pairwise similarity scores.
    Similarity,
    /// Similarity scores to clusters.
    Clustering,
    /// Clusters to a running visualization server.
    Visualization,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Convert,
        Stage::Break,
        Stage::Similarity,
        Stage::Clustering,
        Stage::Visualization,
    ];

    /// Operator-facing name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Convert => "Convert",
            Self::Break => "Break",
            Self::Similarity => "Similarity",
            Self::Clustering => "Clustering",
            Self::Visualization => "Visualization",
        }
    }

    /// Key under `stages:` in the pipeline file.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Convert => "convert",
            Self::Break => "break",
            Self::Similarity => "similarity",
            Self::Clustering => "clustering",
            Self::Visualization => "visualization",
        }
    }

    /// Artifact this stage reads.
    pub fn input(self) -> Artifact {
        match self {
            Self::Convert => Artifact::SourceTable,
            Self::Break => Artifact::Records,
            Self::Similarity => Artifact::Fragments,
            Self::Clustering => Artifact::SimilarityResults,
            Self::Visualization => Artifact::ClusterResults,
        }
    }

    /// Artifact this stage leaves for its successor. The visualization
    /// stage produces a running server, not a file.
    pub fn output(self) -> Option<Artifact> {
        match self {
            Self::Convert => Some(Artifact::Records),
            Self::Break => Some(Artifact::Fragments),
            Self::Similarity => Some(Artifact::SimilarityResults),
            Self::Clustering => Some(Artifact::ClusterResults),
            Self::Visualization => None,
        }
    }

    /// Whether a built-in implementation exists for this stage.
    pub fn has_builtin(self) -> bool {
        matches!(self, Self::Convert | Self::Break)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filesystem artifact passed between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    SourceTable,
    Records,
    Fragments,
    SimilarityResults,
    ClusterResults,
}

/// How an artifact's presence is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A regular file.
    File,
    /// A directory holding at least one entry.
    Directory,
}

impl Artifact {
    pub fn kind(self) -> ArtifactKind {
        match self {
            Self::SourceTable | Self::Records => ArtifactKind::File,
            Self::Fragments | Self::SimilarityResults | Self::ClusterResults => {
                ArtifactKind::Directory
            }
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::SourceTable => "source table",
            Self::Records => "structured record collection",
            Self::Fragments => "fragment file set",
            Self::SimilarityResults => "similarity result set",
            Self::ClusterResults => "cluster result set",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
