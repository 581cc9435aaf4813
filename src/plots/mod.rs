//! PNG figures for single trials and aggregate analyses

pub mod bars;
pub mod canvas;
pub mod regression;
pub mod trial_view;

pub use bars::{BarChart, BarPanel, BarStat, bars, group_bars, render_bars};
pub use canvas::{Area, Axes, Figure, Fonts, save_image};
pub use regression::{LinregOptions, Scatter, plot_linreg, scatter_with_linreg};
pub use trial_view::{render_problem, render_timing_hist, render_trial, trial_title};
