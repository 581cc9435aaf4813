//! Single-trial figures: the map, the walked path, and inter-event delays

use image::{Rgb, RgbImage};
use log::{debug, warn};

use super::canvas::{Area, Axes, Figure, Fonts, LABEL_SIZE, TITLE_SIZE, nice_ticks};
use crate::constants::{
    COLLECT_MARKER, GRAY, HIST_BAR, ORACLE_MARKER, PATH_COLOR, TEXT_COLOR, oracle_acc_color,
};
use crate::helpers::format_number;
use crate::trial::analysis::{collect_indices, time_deltas};
use crate::trial::{EventType, Problem, Trial};

pub const MAP_FIGURE_SIZE: u32 = 720;
pub const HIST_WIDTH: u32 = 1152;
pub const HIST_HEIGHT: u32 = 720;

const TITLE_BAND: f64 = 48.0;
const MAP_PADDING: f64 = 0.5;
const NODE_RADIUS: i32 = 7;
const LINK_WIDTH: f32 = 3.4;
const PATH_WIDTH: f32 = 10.0;
/// Event marker diameter in map units
const MARKER_SIZE: f64 = 0.15;

// =============================================================================
// MAP
// =============================================================================

/// Equal-aspect axes framing every node of the map
pub fn map_axes(problem: &Problem, width: u32, height: u32) -> Axes {
    let (x0, y0, x1, y1) = problem.bounds().unwrap_or((0.0, 0.0, 0.0, 0.0));
    let area = Area::new(
        8.0,
        TITLE_BAND,
        width as f64 - 16.0,
        height as f64 - TITLE_BAND - 8.0,
    );
    Axes::equal_aspect(
        area,
        (x0 - MAP_PADDING, x1 + MAP_PADDING),
        (y0 - MAP_PADDING, y1 + MAP_PADDING),
    )
}

/// Draw links and nodes onto an existing figure
pub fn draw_problem(fig: &mut Figure, axes: &Axes, problem: &Problem, no_rewards: bool) {
    for link in &problem.links {
        if let (Some(a), Some(b)) = (problem.node_loc(&link.src), problem.node_loc(&link.tgt)) {
            fig.line(axes, a, b, GRAY, LINK_WIDTH);
        }
    }

    let reward_color = oracle_acc_color(problem.oracle_acc());
    for node in problem.nodes.values() {
        let color = if !no_rewards && node.has_reward() {
            reward_color
        } else {
            GRAY
        };
        fig.dot(axes, node.loc(), NODE_RADIUS, color);
    }
}

fn draw_title(fig: &mut Figure, title: &str) {
    let cx = fig.width() as f32 / 2.0;
    fig.text_centered(cx, 12.0, TITLE_SIZE, TEXT_COLOR, title);
}

/// Map figure: links in grey, nodes colored by reward
pub fn render_problem(
    problem: &Problem,
    fonts: &Fonts,
    title: Option<&str>,
    no_rewards: bool,
) -> RgbImage {
    let mut fig = Figure::new(MAP_FIGURE_SIZE, MAP_FIGURE_SIZE, fonts);
    let axes = map_axes(problem, MAP_FIGURE_SIZE, MAP_FIGURE_SIZE);
    draw_problem(&mut fig, &axes, problem, no_rewards);
    if let Some(title) = title {
        draw_title(&mut fig, title);
    }
    fig.into_image()
}

// =============================================================================
// TRIAL PATH
// =============================================================================

/// e.g. `map_12 Oracle: Yes, Gems: 3 (45 points)`
pub fn trial_title(trial: &Trial) -> String {
    format!(
        "{} Oracle: {}, Gems: {} ({} points)",
        trial.map_name(),
        if trial.oracle_requested() { "Yes" } else { "No" },
        trial.n_gems(),
        format_number(trial.score()),
    )
}

/// Map with the player's path and event markers overlaid
pub fn render_trial(trial: &Trial, fonts: &Fonts) -> RgbImage {
    let mut fig = Figure::new(MAP_FIGURE_SIZE, MAP_FIGURE_SIZE, fonts);
    let axes = map_axes(&trial.problem, MAP_FIGURE_SIZE, MAP_FIGURE_SIZE);
    draw_problem(&mut fig, &axes, &trial.problem, false);

    let states = trial.state_timeseries();
    let path: Vec<(f64, f64)> = states.iter().map(|s| s.loc).collect();
    fig.polyline(&axes, &path, PATH_COLOR, PATH_WIDTH);

    let marker_radius = ((MARKER_SIZE / 2.0) * axes.x_scale()).round().max(2.0) as i32;
    for state in states {
        let color = match state.event_type {
            EventType::OracleRequest => ORACLE_MARKER,
            EventType::Collect => COLLECT_MARKER,
            _ => continue,
        };
        fig.dot(&axes, state.loc, marker_radius, color);
    }

    draw_title(&mut fig, &trial_title(trial));
    debug!(
        "Rendered trial {} of {} ({} states)",
        trial.trial_idx,
        trial.match_id,
        states.len()
    );
    fig.into_image()
}

// =============================================================================
// TIMING
// =============================================================================

/// One bar per state: seconds since the previous state, collects in green
pub fn render_timing_hist(trial: &Trial, fonts: &Fonts) -> RgbImage {
    let states = trial.state_timeseries();
    let deltas = time_deltas(states);
    let collects = collect_indices(states);
    if deltas.iter().all(|d| *d == 0.0) {
        warn!(
            "Trial {} of {} has no elapsed time between events",
            trial.trial_idx, trial.match_id
        );
    }

    let mut fig = Figure::new(HIST_WIDTH, HIST_HEIGHT, fonts);
    let ymax = deltas.iter().cloned().fold(0.0_f64, f64::max);
    let ymax = if ymax > 0.0 { ymax * 1.05 } else { 1.0 };
    let area = Area::new(
        90.0,
        TITLE_BAND,
        HIST_WIDTH as f64 - 120.0,
        HIST_HEIGHT as f64 - TITLE_BAND - 70.0,
    );
    let axes = Axes::new(area, (-0.5, deltas.len() as f64 - 0.5), (0.0, ymax));

    for (i, delta) in deltas.iter().enumerate() {
        let color: Rgb<u8> = if collects.contains(&i) {
            COLLECT_MARKER
        } else {
            HIST_BAR
        };
        let x = i as f64;
        fig.fill_rect(&axes, (x - 0.4, 0.0), (x + 0.4, *delta), color);
    }

    fig.frame(&axes);
    fig.y_ticks(&axes, &nice_ticks(0.0, ymax, 5));
    let step = (deltas.len() / 10).max(1);
    let xticks: Vec<(f64, String)> = (0..deltas.len())
        .step_by(step)
        .map(|i| (i as f64, i.to_string()))
        .collect();
    fig.x_ticks(&axes, &xticks);
    fig.text(8.0, (TITLE_BAND - 30.0) as f32, LABEL_SIZE, TEXT_COLOR, "Delay (s)");
    draw_title(&mut fig, &format!("{} event timing", trial.map_name()));
    fig.into_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BACKGROUND;
    use crate::trial::test_support::grid_problem;
    use crate::trial::{Event, NodeId, TrialData};

    fn sample_trial() -> Trial {
        let data = TrialData {
            events: Some(vec![
                Event::new(EventType::Move, 1.0, Some(NodeId::from(5u32))),
                Event::new(EventType::Collect, 1.5, None),
                Event::new(EventType::OracleRequest, 3.0, None),
                Event::new(EventType::Move, 4.0, Some(NodeId::from(8u32))),
            ]),
            oracle_requested: true,
            gems_collected: vec![serde_json::json!("5")],
            score: 10.0,
        };
        Trial::from_parts("m1", 2, grid_problem(3), None, data).unwrap()
    }

    #[test]
    fn title_reports_oracle_and_gems() {
        assert_eq!(
            trial_title(&sample_trial()),
            "grid3 Oracle: Yes, Gems: 1 (10 points)"
        );
    }

    #[test]
    fn problem_figure_has_fixed_size_and_colors_nodes() {
        let trial = sample_trial();
        let fonts = Fonts::none();
        let image = render_problem(&trial.problem, &fonts, Some("map"), false);
        assert_eq!(image.dimensions(), (MAP_FIGURE_SIZE, MAP_FIGURE_SIZE));

        let axes = map_axes(&trial.problem, MAP_FIGURE_SIZE, MAP_FIGURE_SIZE);
        let (x, y) = axes.to_px(trial.problem.node_loc(&NodeId::from(0u32)).unwrap());
        assert_ne!(image.get_pixel(x as u32, y as u32), &BACKGROUND);
    }

    #[test]
    fn trial_figure_draws_path_and_markers() {
        let trial = sample_trial();
        let fonts = Fonts::none();
        let image = render_trial(&trial, &fonts);
        assert_eq!(image.dimensions(), (MAP_FIGURE_SIZE, MAP_FIGURE_SIZE));

        let axes = map_axes(&trial.problem, MAP_FIGURE_SIZE, MAP_FIGURE_SIZE);
        // the oracle marker is drawn last at node 5
        let (x, y) = axes.to_px(trial.problem.node_loc(&NodeId::from(5u32)).unwrap());
        assert_eq!(image.get_pixel(x as u32, y as u32), &ORACLE_MARKER);
    }

    #[test]
    fn timing_hist_has_fixed_size() {
        let fonts = Fonts::none();
        let image = render_timing_hist(&sample_trial(), &fonts);
        assert_eq!(image.dimensions(), (HIST_WIDTH, HIST_HEIGHT));
    }
}
