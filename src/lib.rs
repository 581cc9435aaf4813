//! Gridtrials - offline analysis of recorded grid-navigation trials
//!
//! Loads per-trial event logs and their maps, reconstructs the player's state
//! timeline, derives behavioral metrics, and renders figures as PNG images.

// Data
pub mod config;
pub mod constants;
pub mod error;
pub mod helpers;
pub mod trial;

// Analysis and figures
pub mod analytics;
pub mod plots;

// Re-export commonly used types for convenience
pub use analytics::{Cell, LinearFit, TrialRow, linregress, paired_columns, rows_from_trials};
pub use config::AnalysisConfig;
pub use constants::*;
pub use error::{ConfigError, LoadError, PlotError, TrialError};
pub use helpers::*;
pub use plots::{
    BarChart, Fonts, LinregOptions, Scatter, bars, plot_linreg, render_problem,
    render_timing_hist, render_trial, scatter_with_linreg,
};
pub use trial::{
    BatchLoad, Direction, Event, EventType, NodeId, Problem, State, Trial, TrialData, TrialLoader,
    TrialSummary,
};
