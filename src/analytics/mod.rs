//! Analytics over many trials
//!
//! Flattens trials into condition/metric rows and provides the statistics the
//! aggregate plots annotate with.

pub mod rows;
pub mod stats;

pub use rows::{Cell, TrialRow, paired_columns, rows_from_trials};
pub use stats::{LinearFit, linregress, mean, mean_ci95};
