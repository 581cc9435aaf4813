//! Trial Report - summarize a match and render its figures
//!
//! Loads the recorded trials of one match, logs a summary line per trial, and
//! writes PNG figures to the configured figures directory.
//!
//! Usage:
//!   cargo run --bin trial_report -- <MATCH_ID>
//!   cargo run --bin trial_report -- <MATCH_ID> --trial 3
//!   cargo run --bin trial_report -- <MATCH_ID> --config analysis.toml --save pilot

use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info, warn};

use gridtrials::analytics::{paired_columns, rows_from_trials};
use gridtrials::plots::{
    BarChart, Fonts, LinregOptions, Scatter, bars, render_timing_hist, render_trial, save_image,
    scatter_with_linreg,
};
use gridtrials::{AnalysisConfig, Trial, TrialLoader};

const DEFAULT_CONFIG: &str = "gridtrials.toml";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ReportArgs::from_args();
    if args.show_help {
        print_help();
        return ExitCode::SUCCESS;
    }
    let Some(match_id) = args.match_id.clone() else {
        print_help();
        return ExitCode::FAILURE;
    };

    let config = match AnalysisConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let loader = TrialLoader::new(&config);
    let fonts = Fonts::load(&config);

    let result = match args.trial {
        Some(trial_idx) => report_trial(&loader, &config, &fonts, &match_id, trial_idx, &args),
        None => report_match(&loader, &config, &fonts, &match_id, &args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// One trial: summary, path figure, timing histogram
fn report_trial(
    loader: &TrialLoader,
    config: &AnalysisConfig,
    fonts: &Fonts,
    match_id: &str,
    trial_idx: usize,
    args: &ReportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let trial = loader.load(match_id, trial_idx)?;
    info!("{}", trial.summary());
    if let Some(started) = trial.started_at() {
        info!("Started at {}", started.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(host) = trial.host_duration() {
        info!(
            "Host-side duration {:.1}s (event log {:.1}s)",
            host,
            trial.duration()
        );
    }

    let prefix = args
        .save
        .clone()
        .unwrap_or_else(|| format!("{}_trial{}", match_id, trial_idx));
    save_image(
        &render_trial(&trial, fonts),
        &config.figures_dir,
        &format!("{}_path", prefix),
    )?;
    save_image(
        &render_timing_hist(&trial, fonts),
        &config.figures_dir,
        &format!("{}_timing", prefix),
    )?;
    Ok(())
}

/// Whole match: per-trial summaries and aggregate figures
fn report_match(
    loader: &TrialLoader,
    config: &AnalysisConfig,
    fonts: &Fonts,
    match_id: &str,
    args: &ReportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let trials = Trial::all(loader, match_id);
    if trials.is_empty() {
        warn!("No trials loaded for match {}", match_id);
        return Ok(());
    }
    for trial in &trials {
        info!("{}", trial.summary());
    }

    let prefix = args.save.clone().unwrap_or_else(|| match_id.to_string());
    let rows = rows_from_trials(&trials);

    let chart = BarChart {
        ylabel: Some("Oracle requested".to_string()),
        xlabel: Some("Oracle accuracy".to_string()),
        suptitle: Some(format!("Match {}", match_id)),
        save: Some(format!("{}_oracle_requested", prefix)),
        ..BarChart::default()
    };
    if let Err(e) = bars(&rows, &chart, fonts, &config.figures_dir) {
        error!("Bar chart failed: {}", e);
    }

    let (gems, durations) = paired_columns(&rows, "n_gems", "duration");
    let scatter = Scatter {
        xlabel: Some("Gems collected".to_string()),
        ylabel: Some("Duration (s)".to_string()),
        title: Some(format!("Match {}", match_id)),
        linreg: LinregOptions::default(),
        save: Some(format!("{}_duration_vs_gems", prefix)),
    };
    let (_, fit) = scatter_with_linreg(&gems, &durations, &scatter, fonts, &config.figures_dir)?;
    match fit {
        Some(fit) => info!(
            "Duration vs gems: slope {:.2} s/gem, {} (n={})",
            fit.slope,
            fit.label(),
            fit.n
        ),
        None => info!("Duration vs gems: not enough variation to fit"),
    }
    Ok(())
}

struct ReportArgs {
    match_id: Option<String>,
    trial: Option<usize>,
    config_path: PathBuf,
    save: Option<String>,
    show_help: bool,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            match_id: None,
            trial: None,
            config_path: PathBuf::from(DEFAULT_CONFIG),
            save: None,
            show_help: false,
        }
    }
}

impl ReportArgs {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut parsed = Self::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--trial" | "-t" => {
                    if i + 1 < args.len() {
                        parsed.trial = args[i + 1].parse().ok();
                        if parsed.trial.is_none() {
                            warn!("Ignoring invalid trial index {:?}", args[i + 1]);
                        }
                        i += 1;
                    }
                }
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        parsed.config_path = PathBuf::from(&args[i + 1]);
                        i += 1;
                    }
                }
                "--save" | "-s" => {
                    if i + 1 < args.len() {
                        parsed.save = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    parsed.show_help = true;
                }
                arg if !arg.starts_with('-') => {
                    // Positional argument: match id
                    parsed.match_id = Some(arg.to_string());
                }
                _ => {}
            }
            i += 1;
        }

        parsed
    }
}

fn print_help() {
    println!(
        r#"Trial Report - summarize a match and render its figures

USAGE:
    cargo run --bin trial_report -- <MATCH_ID> [OPTIONS]

ARGUMENTS:
    MATCH_ID              Directory name under the data dir

OPTIONS:
    --trial, -t <N>       Report a single trial (path figure + timing histogram)
    --config, -c <FILE>   Analysis config (default: gridtrials.toml)
    --save, -s <NAME>     Figure name prefix (default: match id)
    --help, -h            Show this help

CONFIG FILE FORMAT (TOML):
    data_dir = "../data"
    maps_dir = "../map_creation/maps_v1"
    figures_dir = "./figures"
    n_trials = 80
    font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
"#
    );
}
