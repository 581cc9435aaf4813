//! Error types for loading, reconstruction, configuration, and plotting

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::trial::NodeId;

/// Failure to construct a `Trial` from its documents
#[derive(Debug, Error)]
pub enum LoadError {
    /// A required document does not exist
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `map_order` has no entry for the trial index
    #[error("match {match_id} has no map for trial {trial_idx}")]
    MissingMap { match_id: String, trial_idx: usize },

    /// `map_order` names a map with no file in the maps directory
    #[error("map {map_name} not found at {}", path.display())]
    UnknownMap { map_name: String, path: PathBuf },

    #[error("invalid map {map_name}: {reason}")]
    InvalidProblem { map_name: String, reason: String },

    /// An event in the trial log points at a node the map doesn't have
    #[error("{} references unknown node {node}", path.display())]
    UnknownNode { path: PathBuf, node: NodeId },
}

impl LoadError {
    /// Expected skip for the batch loader: the trial simply isn't there
    pub fn is_absent(&self) -> bool {
        matches!(self, LoadError::NotFound { .. } | LoadError::MissingMap { .. })
    }
}

/// Failures while deriving data from an already loaded trial
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrialError {
    #[error("node {0} is not part of the map")]
    UnknownNode(NodeId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum PlotError {
    /// Axis variable without a fixed category order
    #[error("no category order defined for {0}")]
    UnknownCondition(String),

    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to save {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
