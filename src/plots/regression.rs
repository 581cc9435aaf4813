//! Scatter plots with a least squares overlay

use image::RgbImage;
use log::{info, warn};
use std::path::Path;

use super::canvas::{Area, Axes, Figure, Fonts, LABEL_SIZE, TICK_SIZE, TITLE_SIZE, blend, nice_ticks};
use crate::analytics::stats::{LinearFit, linregress};
use crate::constants::{BACKGROUND, REGRESSION_LINE, SCATTER_POINT, TEXT_COLOR};
use crate::error::PlotError;
use crate::helpers::format_number;

const SCATTER_SIZE: (u32, u32) = (720, 600);
const POINT_RADIUS: i32 = 4;
const INSIGNIFICANT_ALPHA: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinregOptions {
    /// Label offset below the fitted line, in y units
    pub text_yoffset: f64,
    /// Label position as a fraction of the x range
    pub text_xpct: f64,
    pub show_text: bool,
}

impl Default for LinregOptions {
    fn default() -> Self {
        Self {
            text_yoffset: 5.0,
            text_xpct: 0.5,
            show_text: true,
        }
    }
}

/// Fit `ys` against `xs` and draw the line over `[min(x), max(x)]`.
///
/// Insignificant fits are drawn faded. Returns `None` (drawing nothing) when
/// the data cannot be fit.
pub fn plot_linreg(
    fig: &mut Figure,
    axes: &Axes,
    xs: &[f64],
    ys: &[f64],
    opts: &LinregOptions,
) -> Option<LinearFit> {
    let Some(fit) = linregress(xs, ys) else {
        warn!("Cannot fit a line to {} points", xs.len());
        return None;
    };

    let x_min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let alpha = if fit.is_significant() {
        1.0
    } else {
        INSIGNIFICANT_ALPHA
    };
    let color = blend(REGRESSION_LINE, BACKGROUND, alpha);
    fig.line(
        axes,
        (x_min, fit.predict(x_min)),
        (x_max, fit.predict(x_max)),
        color,
        2.5,
    );

    let label = fit.label();
    if opts.show_text {
        let text_x = x_min + (x_max - x_min) * opts.text_xpct;
        let text_y = fit.predict(text_x) - opts.text_yoffset;
        let (px, py) = axes.to_px((text_x, text_y));
        fig.text(px, py, TICK_SIZE, color, &label);
    } else {
        info!("{}", label);
    }
    Some(fit)
}

/// Labels and output of a standalone scatter figure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scatter {
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub title: Option<String>,
    pub linreg: LinregOptions,
    pub save: Option<String>,
}

/// Scatter of paired samples with the regression overlay on a fresh figure
pub fn scatter_with_linreg(
    xs: &[f64],
    ys: &[f64],
    scatter: &Scatter,
    fonts: &Fonts,
    figures_dir: &Path,
) -> Result<(RgbImage, Option<LinearFit>), PlotError> {
    let (width, height) = SCATTER_SIZE;
    let mut fig = Figure::new(width, height, fonts);
    let area = Area::new(80.0, 50.0, width as f64 - 110.0, height as f64 - 120.0);
    let axes = Axes::new(area, padded_range(xs), padded_range(ys));

    for (x, y) in xs.iter().zip(ys) {
        fig.dot(&axes, (*x, *y), POINT_RADIUS, SCATTER_POINT);
    }
    let fit = plot_linreg(&mut fig, &axes, xs, ys, &scatter.linreg);

    fig.frame(&axes);
    fig.y_ticks(&axes, &nice_ticks(axes.ylim.0, axes.ylim.1, 5));
    let xticks: Vec<(f64, String)> = nice_ticks(axes.xlim.0, axes.xlim.1, 6)
        .into_iter()
        .map(|t| (t, format_number(t)))
        .collect();
    fig.x_ticks(&axes, &xticks);

    if let Some(xlabel) = &scatter.xlabel {
        let cx = area.center_x() as f32;
        fig.text_centered(cx, (area.bottom() + 34.0) as f32, LABEL_SIZE, TEXT_COLOR, xlabel);
    }
    if let Some(ylabel) = &scatter.ylabel {
        fig.text(8.0, 22.0, LABEL_SIZE, TEXT_COLOR, ylabel);
    }
    if let Some(title) = &scatter.title {
        fig.text_centered(width as f32 / 2.0, 8.0, TITLE_SIZE, TEXT_COLOR, title);
    }

    if let Some(name) = &scatter.save {
        fig.save(figures_dir, name)?;
    }
    Ok((fig.into_image(), fit))
}

/// Data range with 5% margin on each side
fn padded_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad, hi + pad)
}
