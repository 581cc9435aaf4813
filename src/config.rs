//! Analysis configuration
//!
//! Paths to the experiment data, map files, and figure output, plus the trial
//! count used by batch loading. Defaults match the directory layout the
//! experiment server writes; a TOML file can override any field.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_FIGURES_DIR, DEFAULT_MAPS_DIR, FONT_CANDIDATES, N_TRIALS,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Root of per-match directories
    pub data_dir: PathBuf,
    /// Directory of `<map_name>.json` files
    pub maps_dir: PathBuf,
    /// Where `save`d figures are written
    pub figures_dir: PathBuf,
    /// Trial indices attempted by the batch loader
    pub n_trials: usize,
    /// TrueType font for figure text (probed from system paths when unset)
    pub font_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            maps_dir: PathBuf::from(DEFAULT_MAPS_DIR),
            figures_dir: PathBuf::from(DEFAULT_FIGURES_DIR),
            n_trials: N_TRIALS,
            font_path: None,
        }
    }
}

impl AnalysisConfig {
    /// Load from a TOML file, or return defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Configured font, or the first system candidate that exists
    pub fn resolve_font_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.font_path {
            return Some(path.clone());
        }
        let found = FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists());
        if let Some(path) = &found {
            debug!("Using system font {}", path.display());
        }
        found
    }
}
