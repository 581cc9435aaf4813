//! Loading trials from the experiment's on-disk layout
//!
//! ```text
//! <data_dir>/<match_id>/metadata.json
//! <data_dir>/<match_id>/trial<N>.json
//! <maps_dir>/<map_name>.json
//! ```

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::Trial;
use super::types::{MatchMetadata, PlayerDoc, Problem, ProblemDoc};
use crate::config::AnalysisConfig;
use crate::constants::METADATA_FILE;
use crate::error::{LoadError, TrialError};

/// Resolves and reads the documents that make up a trial
#[derive(Debug, Clone)]
pub struct TrialLoader {
    data_dir: PathBuf,
    maps_dir: PathBuf,
    n_trials: usize,
}

/// Outcome of loading every trial index of a match
#[derive(Debug, Default)]
pub struct BatchLoad {
    /// Successfully loaded trials, in index order
    pub trials: Vec<Trial>,
    /// Trials whose documents exist but could not be loaded; one error log each
    pub failed: Vec<(usize, LoadError)>,
    /// Loaded trials whose event log was empty; one warning each
    pub empty: Vec<usize>,
    /// Indices with no trial file or no map entry
    pub absent: Vec<usize>,
}

impl TrialLoader {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            maps_dir: config.maps_dir.clone(),
            n_trials: config.n_trials,
        }
    }

    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    pub fn metadata_path(&self, match_id: &str) -> PathBuf {
        self.data_dir.join(match_id).join(METADATA_FILE)
    }

    pub fn trial_path(&self, match_id: &str, trial_idx: usize) -> PathBuf {
        self.data_dir
            .join(match_id)
            .join(format!("trial{}.json", trial_idx))
    }

    pub fn map_path(&self, map_name: &str) -> PathBuf {
        self.maps_dir.join(format!("{}.json", map_name))
    }

    pub fn load_metadata(&self, match_id: &str) -> Result<MatchMetadata, LoadError> {
        read_json(&self.metadata_path(match_id))
    }

    pub fn load_problem(&self, map_name: &str) -> Result<Problem, LoadError> {
        let doc: ProblemDoc = read_json(&self.map_path(map_name)).map_err(|e| match e {
            LoadError::NotFound { path } => LoadError::UnknownMap {
                map_name: map_name.to_string(),
                path,
            },
            other => other,
        })?;
        Problem::from_doc(map_name, doc).map_err(|reason| LoadError::InvalidProblem {
            map_name: map_name.to_string(),
            reason,
        })
    }

    /// Load one trial, reading the match metadata first
    pub fn load(&self, match_id: &str, trial_idx: usize) -> Result<Trial, LoadError> {
        let metadata = self.load_metadata(match_id)?;
        self.load_with_metadata(&metadata, match_id, trial_idx)
    }

    /// Load one trial against already-loaded match metadata
    pub fn load_with_metadata(
        &self,
        metadata: &MatchMetadata,
        match_id: &str,
        trial_idx: usize,
    ) -> Result<Trial, LoadError> {
        let map_name = metadata
            .map_name(trial_idx)
            .ok_or_else(|| LoadError::MissingMap {
                match_id: match_id.to_string(),
                trial_idx,
            })?;

        let trial_path = self.trial_path(match_id, trial_idx);
        let player: PlayerDoc = read_json(&trial_path)?;
        let problem = self.load_problem(map_name)?;

        let trial = Trial::from_parts(
            match_id,
            trial_idx,
            problem,
            metadata.trial(trial_idx).cloned(),
            player.trial_data,
        )
        .map_err(|e| match e {
            TrialError::UnknownNode(node) => LoadError::UnknownNode {
                path: trial_path.clone(),
                node,
            },
        })?;

        debug!(
            "Loaded M {} T {} on {} ({} events)",
            match_id,
            trial_idx,
            map_name,
            trial.data.events().len()
        );
        Ok(trial)
    }

    /// Attempt every trial index of a match.
    ///
    /// Absent trials are expected and only logged at debug level; trials that
    /// exist but fail to load are logged as errors and skipped. Only a failure
    /// to read the match metadata fails the batch.
    pub fn load_batch(&self, match_id: &str) -> Result<BatchLoad, LoadError> {
        let metadata = self.load_metadata(match_id)?;
        let mut batch = BatchLoad::default();

        for trial_idx in 0..self.n_trials {
            match self.load_with_metadata(&metadata, match_id, trial_idx) {
                Ok(trial) => {
                    if trial.has_empty_log() {
                        batch.empty.push(trial_idx);
                    }
                    batch.trials.push(trial);
                }
                Err(e) if e.is_absent() => {
                    debug!("M {} T {} absent: {}", match_id, trial_idx, e);
                    batch.absent.push(trial_idx);
                }
                Err(e) => {
                    error!(
                        "Error loading trial data: {}, trial {}: {}",
                        match_id, trial_idx, e
                    );
                    batch.failed.push((trial_idx, e));
                }
            }
        }

        info!(
            "Match {}: {} trials loaded ({} without events), {} failed, {} absent",
            match_id,
            batch.trials.len(),
            batch.empty.len(),
            batch.failed.len(),
            batch.absent.len()
        );
        Ok(batch)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
