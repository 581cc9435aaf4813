//! Rendering loaded trials and saving figures

use std::fs;
use std::path::Path;

use gridtrials::analytics::paired_columns;
use gridtrials::plots::canvas::save_image;
use gridtrials::plots::trial_view::{HIST_HEIGHT, HIST_WIDTH, MAP_FIGURE_SIZE};
use gridtrials::{
    AnalysisConfig, BarChart, Fonts, PlotError, Scatter, TrialLoader, bars, render_problem,
    render_timing_hist, render_trial, rows_from_trials, scatter_with_linreg,
};
use serde_json::{Value, json};

fn write(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
}

fn square_map(kind: &str, oracle: &str) -> Value {
    json!({
        "nodes": {
            "0": {"X": 0, "Y": 0},
            "1": {"X": 1, "Y": 0, "reward_value": 10},
            "2": {"X": 0, "Y": 1},
            "3": {"X": 1, "Y": 1, "reward_value": 10}
        },
        "links": {"0_1": 1, "0_2": 1, "1_3": 1, "2_3": 1},
        "middle_node": "0",
        "conditions": {"oracle": oracle, "map_kind": kind}
    })
}

fn setup(root: &Path) -> (AnalysisConfig, TrialLoader) {
    let config = AnalysisConfig {
        data_dir: root.join("data"),
        maps_dir: root.join("maps"),
        figures_dir: root.join("figures"),
        n_trials: 4,
        font_path: None,
    };
    let loader = TrialLoader::new(&config);
    write(&loader.map_path("rand_a"), &square_map("random", "A"));
    write(&loader.map_path("rand_i"), &square_map("random", "I"));
    write(&loader.map_path("spat_a"), &square_map("spatial", "A"));
    write(&loader.map_path("spat_i"), &square_map("spatial", "I"));
    write(
        &loader.metadata_path("m2"),
        &json!({"matchData": {"map_order": ["rand_a", "rand_i", "spat_a", "spat_i"]}}),
    );

    for idx in 0..4 {
        let requested = idx % 2 == 1;
        let mut events = vec![json!({"eventType": "move", "time": 1.0 + idx as f64, "nodeId": "1"})];
        if requested {
            events.push(json!({"eventType": "oracle_request", "time": 2.0 + idx as f64, "nodeId": null}));
        }
        events.push(json!({"eventType": "collect", "time": 3.0 + idx as f64, "nodeId": null}));
        events.push(json!({"eventType": "move", "time": 5.0 + 2.0 * idx as f64, "nodeId": "3"}));
        write(
            &loader.trial_path("m2", idx),
            &json!({"trial_data": {
                "TrialEventData": events,
                "oracleRequested": requested,
                "gems_collected": vec![json!("1"); idx + 1],
                "score": 10
            }}),
        );
    }
    (config, loader)
}

#[test]
fn single_trial_figures_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let (config, loader) = setup(dir.path());
    let fonts = Fonts::load(&config);
    let trial = loader.load("m2", 1).unwrap();

    let path_fig = render_trial(&trial, &fonts);
    assert_eq!(path_fig.dimensions(), (MAP_FIGURE_SIZE, MAP_FIGURE_SIZE));
    let hist = render_timing_hist(&trial, &fonts);
    assert_eq!(hist.dimensions(), (HIST_WIDTH, HIST_HEIGHT));
    let map = render_problem(&trial.problem, &fonts, None, true);
    assert_eq!(map.dimensions(), (MAP_FIGURE_SIZE, MAP_FIGURE_SIZE));

    let saved = save_image(&path_fig, &config.figures_dir, "m2_trial1_path").unwrap();
    assert_eq!(saved, config.figures_dir.join("m2_trial1_path.png"));
    let reopened = image::open(&saved).unwrap();
    assert_eq!(reopened.width(), MAP_FIGURE_SIZE);
}

#[test]
fn aggregate_figures_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let (config, loader) = setup(dir.path());
    let fonts = Fonts::none();
    let batch = loader.load_batch("m2").unwrap();
    assert_eq!(batch.trials.len(), 4);
    let rows = rows_from_trials(&batch.trials);

    let chart = BarChart {
        save: Some("requests".to_string()),
        ..BarChart::default()
    };
    bars(&rows, &chart, &fonts, &config.figures_dir).unwrap();
    assert!(config.figures_dir.join("requests.png").exists());

    let (gems, durations) = paired_columns(&rows, "n_gems", "duration");
    assert_eq!(gems, vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(durations, vec![5.0, 7.0, 9.0, 11.0]);

    let scatter = Scatter {
        save: Some("duration_vs_gems".to_string()),
        ..Scatter::default()
    };
    let (_, fit) =
        scatter_with_linreg(&gems, &durations, &scatter, &fonts, &config.figures_dir).unwrap();
    let fit = fit.unwrap();
    assert!((fit.slope - 2.0).abs() < 1e-9);
    assert!((fit.intercept - 3.0).abs() < 1e-9);
    assert!(config.figures_dir.join("duration_vs_gems.png").exists());
}

#[test]
fn bar_chart_on_unordered_variable_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (config, loader) = setup(dir.path());
    let rows = rows_from_trials(&loader.load_batch("m2").unwrap().trials);
    let chart = BarChart {
        x: "map_name".to_string(),
        ..BarChart::default()
    };
    let err = bars(&rows, &chart, &Fonts::none(), &config.figures_dir).unwrap_err();
    assert!(matches!(err, PlotError::UnknownCondition(_)));
}
