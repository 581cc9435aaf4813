//! Trials: one player's recorded attempt at one map within a match.
//!
//! A `Trial` is assembled from three documents (match metadata, map, player
//! record) by the [`TrialLoader`], reconstructs its state timeline once at
//! construction, and is immutable afterwards.

pub mod analysis;
mod loader;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{Direction, duration, move_dir, oracle_request_index};
pub use loader::{BatchLoad, TrialLoader};
pub use state::{State, reconstruct};
pub use types::{
    Conditions, Event, EventType, Link, MatchMetadata, Node, NodeId, PlayerDoc, Problem,
    ProblemDoc, TrialData, TrialMeta,
};

use chrono::{DateTime, Utc};
use log::{error, warn};
use std::fmt;

use crate::error::TrialError;

#[derive(Debug, Clone)]
pub struct Trial {
    pub match_id: String,
    pub trial_idx: usize,
    pub problem: Problem,
    /// Entry for this trial in the match metadata, if the host wrote one
    pub metadata: Option<TrialMeta>,
    pub data: TrialData,
    states: Vec<State>,
}

impl Trial {
    /// Assemble a trial from already-parsed parts
    pub fn from_parts(
        match_id: &str,
        trial_idx: usize,
        problem: Problem,
        metadata: Option<TrialMeta>,
        data: TrialData,
    ) -> Result<Self, TrialError> {
        let states = reconstruct(&problem, data.events())?;
        if data.events().is_empty() {
            warn!("M {} T {} has no events", match_id, trial_idx);
        }
        Ok(Self {
            match_id: match_id.to_string(),
            trial_idx,
            problem,
            metadata,
            data,
            states,
        })
    }

    /// Every trial of a match that loads; failures are logged and skipped
    pub fn all(loader: &TrialLoader, match_id: &str) -> Vec<Trial> {
        match loader.load_batch(match_id) {
            Ok(batch) => batch.trials,
            Err(e) => {
                error!("Error loading match {}: {}", match_id, e);
                Vec::new()
            }
        }
    }

    pub fn map_name(&self) -> &str {
        &self.problem.map_name
    }

    pub fn node_loc(&self, node_id: &NodeId) -> Option<(f64, f64)> {
        self.problem.node_loc(node_id)
    }

    pub fn start_node(&self) -> &NodeId {
        self.problem.start_node()
    }

    /// Raw event log, optionally restricted to moves
    pub fn events(&self, moves_only: bool) -> Vec<&Event> {
        self.data
            .events()
            .iter()
            .filter(|e| !moves_only || e.event_type == EventType::Move)
            .collect()
    }

    /// True when the player record had no events (logged as a warning on load)
    pub fn has_empty_log(&self) -> bool {
        self.data.events().is_empty()
    }

    pub fn n_moves(&self) -> usize {
        self.events(true).len()
    }

    /// Reconstructed state timeline, starting with the synthetic start state
    pub fn state_timeseries(&self) -> &[State] {
        &self.states
    }

    /// Time of the last event (see [`analysis::duration`])
    pub fn duration(&self) -> f64 {
        duration(&self.states)
    }

    pub fn oracle_request_index(&self) -> i32 {
        oracle_request_index(&self.states)
    }

    /// # Panics
    ///
    /// If the nodes are not grid-adjacent.
    pub fn move_dir(&self, from: &NodeId, to: &NodeId) -> Direction {
        move_dir(&self.problem, from, to)
    }

    pub fn oracle_requested(&self) -> bool {
        self.data.oracle_requested
    }

    pub fn n_gems(&self) -> usize {
        self.data.n_gems()
    }

    pub fn score(&self) -> f64 {
        self.data.score
    }

    /// Score as a fraction of all reward on the map (0 on reward-free maps)
    pub fn performance(&self) -> f64 {
        let max = self.problem.max_reward();
        if max > 0.0 { self.data.score / max } else { 0.0 }
    }

    /// Host-side duration in seconds from the metadata timestamps.
    ///
    /// Subject to client/host clock skew; [`Trial::duration`] is the value to
    /// analyze.
    pub fn host_duration(&self) -> Option<f64> {
        let meta = self.metadata.as_ref()?;
        Some((meta.ts_finished? - meta.ts_started?) / 1000.0)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        let ms = self.metadata.as_ref()?.ts_started?;
        DateTime::from_timestamp_millis(ms as i64)
    }

    pub fn summary(&self) -> TrialSummary {
        TrialSummary {
            match_id: self.match_id.clone(),
            trial_idx: self.trial_idx,
            map_name: self.map_name().to_string(),
            oracle_acc: self.problem.oracle_acc().map(str::to_string),
            oracle_requested: self.oracle_requested(),
            oracle_request_index: self.oracle_request_index(),
            n_gems: self.n_gems(),
            score: self.score(),
            performance: self.performance(),
            n_moves: self.n_moves(),
            duration: self.duration(),
            path_length: analysis::path_length(&self.states),
        }
    }
}

/// Flat per-trial facts used for reporting and aggregate plots
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub match_id: String,
    pub trial_idx: usize,
    pub map_name: String,
    pub oracle_acc: Option<String>,
    pub oracle_requested: bool,
    pub oracle_request_index: i32,
    pub n_gems: usize,
    pub score: f64,
    pub performance: f64,
    pub n_moves: usize,
    pub duration: f64,
    pub path_length: f64,
}

impl fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} T {:>2}  {:<16} acc={:<2} oracle={:<3} idx={:>2}  gems={:>2} score={:>5.1} perf={:.2}  moves={:>3} dur={:>6.1}s",
            self.match_id,
            self.trial_idx,
            self.map_name,
            self.oracle_acc.as_deref().unwrap_or("-"),
            if self.oracle_requested { "yes" } else { "no" },
            self.oracle_request_index,
            self.n_gems,
            self.score,
            self.performance,
            self.n_moves,
            self.duration,
        )
    }
}
