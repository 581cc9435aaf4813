//! Flat per-trial rows for aggregate analysis
//!
//! Each row maps column names to cells: condition variables (categorical) and
//! metrics (numeric). Columns follow the naming used on plot axes, e.g.
//! `cond_oracle_acc`, `map_kind`, `oracle_requested`, `n_moves`.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::helpers::format_number;
use crate::trial::Trial;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Category key used to match fixed condition orders (`true` -> `"1"`)
    pub fn category(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Text(s) => s.parse().ok(),
            Cell::Number(n) => Some(*n),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(Cell::Number),
            Value::Bool(b) => Some(Cell::Bool(*b)),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialRow {
    cells: BTreeMap<String, Cell>,
}

impl TrialRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row of conditions and metrics for one trial
    pub fn from_trial(trial: &Trial) -> Self {
        let summary = trial.summary();
        let mut row = Self::new();

        row.set("match_id", summary.match_id.as_str());
        row.set("trial_idx", summary.trial_idx);
        row.set("map_name", summary.map_name.as_str());

        if let Some(acc) = &summary.oracle_acc {
            row.set("cond_oracle_acc", acc.as_str());
        }
        for (key, value) in &trial.problem.conditions.other {
            if let Some(cell) = Cell::from_json(value) {
                row.set(&condition_column(key), cell);
            }
        }

        row.set("oracle_requested", summary.oracle_requested);
        row.set("oracle_request_index", summary.oracle_request_index as f64);
        row.set("n_gems", summary.n_gems);
        row.set("score", summary.score);
        row.set("performance", summary.performance);
        row.set("n_moves", summary.n_moves);
        row.set("duration", summary.duration);
        row.set("path_length", summary.path_length);
        row
    }

    pub fn set(&mut self, column: &str, cell: impl Into<Cell>) {
        self.cells.insert(column.to_string(), cell.into());
    }

    /// Builder form of [`TrialRow::set`]
    pub fn with(mut self, column: &str, cell: impl Into<Cell>) -> Self {
        self.set(column, cell);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn category(&self, column: &str) -> Option<String> {
        self.get(column).map(Cell::category)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_f64)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// Column name for a map condition key
fn condition_column(key: &str) -> String {
    match key {
        "map_kind" | "kind" => "map_kind".to_string(),
        k if k.starts_with("cond_") => k.to_string(),
        k => format!("cond_{}", k),
    }
}

pub fn rows_from_trials(trials: &[Trial]) -> Vec<TrialRow> {
    trials.iter().map(TrialRow::from_trial).collect()
}

/// Paired numeric columns, skipping rows where either is missing
pub fn paired_columns(rows: &[TrialRow], x: &str, y: &str) -> (Vec<f64>, Vec<f64>) {
    rows.iter()
        .filter_map(|row| Some((row.number(x)?, row.number(y)?)))
        .unzip()
}
