//! Grouped bar charts of a metric across experimental conditions
//!
//! One panel per value of a figure attribute (by default the map kind), bars
//! in the fixed category order of the x condition and optionally split by a
//! hue condition. Each bar is a group mean with a 95% confidence whisker.

use image::{Rgb, RgbImage};
use log::{debug, info};
use std::path::Path;

use super::canvas::{Area, Axes, Figure, Fonts, LABEL_SIZE, TICK_SIZE, TITLE_SIZE, nice_ticks};
use crate::analytics::TrialRow;
use crate::analytics::stats::mean_ci95;
use crate::constants::{BAR_PALETTE, ERROR_BAR, TEXT_COLOR, cond_order, metric_ymax};
use crate::error::PlotError;
use crate::helpers::cap;

const DEFAULT_PANEL_SIZE: (u32, u32) = (480, 520);
const SUPTITLE_BAND: u32 = 44;
const GROUP_WIDTH: f64 = 0.8;

/// Layout and labeling of a grouped bar chart
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub x: String,
    pub y: String,
    pub hue: Option<String>,
    pub figure_attr: String,
    pub figure_vals: Vec<String>,
    /// Panel titles; defaults to `"<figure_attr>: <value>"`
    pub figure_labels: Option<Vec<String>>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub xticklabels: Option<Vec<String>>,
    pub palette: Option<Vec<Rgb<u8>>>,
    pub suptitle: Option<String>,
    /// Overall figure size in pixels
    pub size: Option<(u32, u32)>,
    /// Figure name (without extension) to save under
    pub save: Option<String>,
}

impl Default for BarChart {
    fn default() -> Self {
        Self {
            x: "cond_oracle_acc".to_string(),
            y: "oracle_requested".to_string(),
            hue: None,
            figure_attr: "map_kind".to_string(),
            figure_vals: vec!["random".to_string(), "spatial".to_string()],
            figure_labels: None,
            xlabel: None,
            ylabel: None,
            xticklabels: None,
            palette: None,
            suptitle: None,
            size: None,
            save: None,
        }
    }
}

impl BarChart {
    fn panel_label(&self, idx: usize, value: &str) -> String {
        self.figure_labels
            .as_ref()
            .and_then(|labels| labels.get(idx))
            .cloned()
            .unwrap_or_else(|| format!("{}: {}", self.figure_attr, value))
    }

    fn color(&self, idx: usize) -> Rgb<u8> {
        let palette = self.palette.as_deref().unwrap_or(BAR_PALETTE);
        if palette.is_empty() {
            return BAR_PALETTE[idx % BAR_PALETTE.len()];
        }
        palette[idx % palette.len()]
    }
}

/// One bar: the `y` values of rows in an x (and hue) category
#[derive(Debug, Clone, PartialEq)]
pub struct BarStat {
    pub x: String,
    pub hue: Option<String>,
    pub n: usize,
    pub mean: f64,
    /// Half-width of the 95% confidence interval
    pub ci: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPanel {
    pub value: String,
    pub label: String,
    /// x-major, hue-minor, in fixed category order
    pub bars: Vec<BarStat>,
}

/// Group rows into panels and bars without drawing anything
pub fn group_bars(rows: &[TrialRow], chart: &BarChart) -> Result<Vec<BarPanel>, PlotError> {
    let x_order =
        cond_order(&chart.x).ok_or_else(|| PlotError::UnknownCondition(chart.x.clone()))?;
    let hue_order: Vec<Option<&str>> = match &chart.hue {
        Some(hue) => cond_order(hue)
            .ok_or_else(|| PlotError::UnknownCondition(hue.clone()))?
            .iter()
            .map(|h| Some(*h))
            .collect(),
        None => vec![None],
    };

    let panels = chart
        .figure_vals
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let panel_rows: Vec<&TrialRow> = rows
                .iter()
                .filter(|row| row.category(&chart.figure_attr).as_deref() == Some(value.as_str()))
                .collect();

            let mut bars = Vec::with_capacity(x_order.len() * hue_order.len());
            for x in x_order {
                for hue in &hue_order {
                    let values: Vec<f64> = panel_rows
                        .iter()
                        .filter(|row| row.category(&chart.x).as_deref() == Some(*x))
                        .filter(|row| match (hue, &chart.hue) {
                            (Some(h), Some(col)) => row.category(col).as_deref() == Some(*h),
                            _ => true,
                        })
                        .filter_map(|row| row.number(&chart.y))
                        .collect();
                    let (mean, ci) = mean_ci95(&values).unwrap_or((0.0, 0.0));
                    bars.push(BarStat {
                        x: x.to_string(),
                        hue: hue.map(str::to_string),
                        n: values.len(),
                        mean,
                        ci,
                    });
                }
            }
            debug!(
                "Panel {}={}: {} rows, {} bars",
                chart.figure_attr,
                value,
                panel_rows.len(),
                bars.len()
            );
            BarPanel {
                value: value.clone(),
                label: chart.panel_label(idx, value),
                bars,
            }
        })
        .collect();
    Ok(panels)
}

/// Draw grouped panels side by side
pub fn render_bars(panels: &[BarPanel], chart: &BarChart, fonts: &Fonts) -> RgbImage {
    let n_panels = panels.len().max(1) as u32;
    let (width, height) = chart.size.unwrap_or((
        DEFAULT_PANEL_SIZE.0 * n_panels,
        DEFAULT_PANEL_SIZE.1 + SUPTITLE_BAND,
    ));
    let mut fig = Figure::new(width, height, fonts);

    let top = if chart.suptitle.is_some() {
        SUPTITLE_BAND as f64
    } else {
        0.0
    };
    if let Some(suptitle) = &chart.suptitle {
        fig.text_centered(width as f32 / 2.0, 10.0, TITLE_SIZE, TEXT_COLOR, suptitle);
    }

    let ymax = metric_ymax(&chart.y);
    let ylabel = chart
        .ylabel
        .clone()
        .unwrap_or_else(|| cap(&chart.y.replace('_', " ")));
    let xlabel = chart.xlabel.as_deref().unwrap_or(&chart.x);
    let panel_width = width as f64 / n_panels as f64;
    let hue_values: Vec<Option<String>> = panels
        .first()
        .map(|p| {
            let mut seen: Vec<Option<String>> = Vec::new();
            for bar in &p.bars {
                if !seen.contains(&bar.hue) {
                    seen.push(bar.hue.clone());
                }
            }
            seen
        })
        .unwrap_or_default();
    let n_hue = hue_values.len().max(1);

    for (pi, panel) in panels.iter().enumerate() {
        let left = pi as f64 * panel_width;
        let area = Area::new(
            left + 70.0,
            top + 40.0,
            panel_width - 90.0,
            height as f64 - top - 110.0,
        );
        let x_cats: Vec<&str> = {
            let mut cats: Vec<&str> = Vec::new();
            for bar in &panel.bars {
                if !cats.contains(&bar.x.as_str()) {
                    cats.push(&bar.x);
                }
            }
            cats
        };
        let axes = Axes::new(area, (-0.5, x_cats.len() as f64 - 0.5), (0.0, ymax));
        let bar_width = GROUP_WIDTH / n_hue as f64;

        for bar in &panel.bars {
            if bar.n == 0 {
                continue;
            }
            let xi = x_cats.iter().position(|c| *c == bar.x).unwrap_or(0);
            let hi = hue_values.iter().position(|h| *h == bar.hue).unwrap_or(0);
            let x0 = xi as f64 - GROUP_WIDTH / 2.0 + hi as f64 * bar_width;
            let color = if chart.hue.is_some() {
                chart.color(hi)
            } else {
                chart.color(xi)
            };
            let top_y = bar.mean.clamp(0.0, ymax);
            fig.fill_rect(&axes, (x0, 0.0), (x0 + bar_width, top_y), color);

            if bar.ci > 0.0 {
                let cx = x0 + bar_width / 2.0;
                let lo = (bar.mean - bar.ci).max(0.0);
                let hi_y = (bar.mean + bar.ci).min(ymax);
                fig.line(&axes, (cx, lo), (cx, hi_y), ERROR_BAR, 2.5);
            }
        }

        fig.frame(&axes);
        fig.y_ticks(&axes, &nice_ticks(0.0, ymax, 5));
        let xticks: Vec<(f64, String)> = x_cats
            .iter()
            .enumerate()
            .map(|(i, cat)| {
                let label = chart
                    .xticklabels
                    .as_ref()
                    .and_then(|labels| labels.get(i))
                    .cloned()
                    .unwrap_or_else(|| cat.to_string());
                (i as f64, label)
            })
            .collect();
        fig.x_ticks(&axes, &xticks);

        let cx = area.center_x() as f32;
        fig.text_centered(cx, (top + 8.0) as f32, LABEL_SIZE, TEXT_COLOR, &panel.label);
        fig.text_centered(cx, (area.bottom() + 36.0) as f32, LABEL_SIZE, TEXT_COLOR, xlabel);
        fig.text((left + 8.0) as f32, (top + 8.0) as f32, TICK_SIZE, TEXT_COLOR, &ylabel);
    }

    if let Some(hue) = &chart.hue {
        let x = width as f32 - 150.0;
        let mut y = top as f32 + 44.0;
        fig.text(x, y, TICK_SIZE, TEXT_COLOR, hue);
        for (i, value) in hue_values.iter().enumerate() {
            y += 22.0;
            let swatch = Area::new(x as f64, y as f64, 14.0, 14.0);
            let axes = Axes::new(swatch, (0.0, 1.0), (0.0, 1.0));
            fig.fill_rect(&axes, (0.0, 0.0), (1.0, 1.0), chart.color(i));
            fig.text(x + 20.0, y, TICK_SIZE, TEXT_COLOR, value.as_deref().unwrap_or(""));
        }
    }

    fig.into_image()
}

/// Group, draw, and optionally save a bar chart
pub fn bars(
    rows: &[TrialRow],
    chart: &BarChart,
    fonts: &Fonts,
    figures_dir: &Path,
) -> Result<RgbImage, PlotError> {
    let panels = group_bars(rows, chart)?;
    let image = render_bars(&panels, chart, fonts);
    if let Some(name) = &chart.save {
        super::canvas::save_image(&image, figures_dir, name)?;
    } else {
        info!("Bar chart of {} by {} not saved", chart.y, chart.x);
    }
    Ok(image)
}
