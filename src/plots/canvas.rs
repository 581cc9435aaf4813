//! Raster drawing surface shared by all figures
//!
//! A `Figure` wraps an `RgbImage`; an `Axes` maps data coordinates into a
//! pixel rectangle of it (y up). Text needs a TrueType font; without one the
//! figure is still drawn, just unlabeled.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::constants::{AXIS_COLOR, BACKGROUND, TEXT_COLOR};
use crate::error::PlotError;
use crate::helpers::format_number;

pub const TITLE_SIZE: f32 = 22.0;
pub const LABEL_SIZE: f32 = 18.0;
pub const TICK_SIZE: f32 = 15.0;

// =============================================================================
// FONTS
// =============================================================================

/// Optional font used for every label on a figure
#[derive(Default)]
pub struct Fonts {
    font: Option<FontVec>,
}

impl Fonts {
    /// No font: figures are drawn without text
    pub fn none() -> Self {
        Self { font: None }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        FontVec::try_from_vec(bytes)
            .ok()
            .map(|font| Self { font: Some(font) })
    }

    /// Load the configured (or first available system) font
    pub fn load(config: &AnalysisConfig) -> Self {
        let Some(path) = config.resolve_font_path() else {
            warn!("No font found; figures will have no text");
            return Self::none();
        };
        match fs::read(&path) {
            Ok(bytes) => Self::from_bytes(bytes).unwrap_or_else(|| {
                warn!("{} is not a usable font; figures will have no text", path.display());
                Self::none()
            }),
            Err(e) => {
                warn!("Failed to read font {}: {}", path.display(), e);
                Self::none()
            }
        }
    }

    pub fn font(&self) -> Option<&FontVec> {
        self.font.as_ref()
    }
}

// =============================================================================
// AXES
// =============================================================================

/// Pixel rectangle: left, top, width, height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Data-to-pixel transform for one plot panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub area: Area,
    pub xlim: (f64, f64),
    pub ylim: (f64, f64),
}

impl Axes {
    pub fn new(area: Area, xlim: (f64, f64), ylim: (f64, f64)) -> Self {
        Self {
            area,
            xlim: widen(xlim),
            ylim: widen(ylim),
        }
    }

    /// Axes with equal unit length on x and y, centered in `area`
    pub fn equal_aspect(area: Area, xlim: (f64, f64), ylim: (f64, f64)) -> Self {
        let (xlim, ylim) = (widen(xlim), widen(ylim));
        let scale = (area.width / (xlim.1 - xlim.0)).min(area.height / (ylim.1 - ylim.0));
        let width = scale * (xlim.1 - xlim.0);
        let height = scale * (ylim.1 - ylim.0);
        let inner = Area::new(
            area.left + (area.width - width) / 2.0,
            area.top + (area.height - height) / 2.0,
            width,
            height,
        );
        Self {
            area: inner,
            xlim,
            ylim,
        }
    }

    /// Pixels per data unit along x
    pub fn x_scale(&self) -> f64 {
        self.area.width / (self.xlim.1 - self.xlim.0)
    }

    pub fn px_x(&self, x: f64) -> f64 {
        self.area.left + (x - self.xlim.0) * self.x_scale()
    }

    pub fn px_y(&self, y: f64) -> f64 {
        let scale = self.area.height / (self.ylim.1 - self.ylim.0);
        self.area.bottom() - (y - self.ylim.0) * scale
    }

    pub fn to_px(&self, p: (f64, f64)) -> (f32, f32) {
        (self.px_x(p.0) as f32, self.px_y(p.1) as f32)
    }
}

/// Avoid zero-width ranges
fn widen(lim: (f64, f64)) -> (f64, f64) {
    if lim.1 > lim.0 {
        lim
    } else {
        (lim.0 - 0.5, lim.0 + 0.5)
    }
}

/// Roughly `target` evenly spaced round tick values covering `[lo, hi]`
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !(hi > lo) || target == 0 {
        return vec![lo];
    }
    let raw = (hi - lo) / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let mut ticks = Vec::new();
    let mut t = (lo / step).ceil() * step;
    while t <= hi + step * 1e-9 {
        // snap away float noise like 0.30000000000000004
        ticks.push((t / step).round() * step);
        t += step;
    }
    ticks
}

/// Mix `color` over `background` with opacity `alpha`
pub fn blend(color: Rgb<u8>, background: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |c: u8, b: u8| (c as f32 * a + b as f32 * (1.0 - a)).round() as u8;
    Rgb([
        mix(color[0], background[0]),
        mix(color[1], background[1]),
        mix(color[2], background[2]),
    ])
}

// =============================================================================
// FIGURE
// =============================================================================

pub struct Figure<'a> {
    image: RgbImage,
    fonts: &'a Fonts,
}

impl<'a> Figure<'a> {
    pub fn new(width: u32, height: u32, fonts: &'a Fonts) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, BACKGROUND),
            fonts,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Segment between two data points, `width` in pixels
    pub fn line(&mut self, axes: &Axes, a: (f64, f64), b: (f64, f64), color: Rgb<u8>, width: f32) {
        self.line_px(axes.to_px(a), axes.to_px(b), color, width);
    }

    pub fn line_px(&mut self, a: (f32, f32), b: (f32, f32), color: Rgb<u8>, width: f32) {
        if width <= 1.5 {
            draw_line_segment_mut(&mut self.image, a, b, color);
            return;
        }

        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len = (dx * dx + dy * dy).sqrt();
        let half = width / 2.0;
        if len >= 1.0 {
            let (nx, ny) = (-dy / len * half, dx / len * half);
            let quad = [
                Point::new((a.0 + nx).round() as i32, (a.1 + ny).round() as i32),
                Point::new((b.0 + nx).round() as i32, (b.1 + ny).round() as i32),
                Point::new((b.0 - nx).round() as i32, (b.1 - ny).round() as i32),
                Point::new((a.0 - nx).round() as i32, (a.1 - ny).round() as i32),
            ];
            if quad[0] != quad[3] {
                draw_polygon_mut(&mut self.image, &quad, color);
            }
        }
        // round caps also cover the joints of polylines
        let r = half.round() as i32;
        draw_filled_circle_mut(&mut self.image, (a.0.round() as i32, a.1.round() as i32), r, color);
        draw_filled_circle_mut(&mut self.image, (b.0.round() as i32, b.1.round() as i32), r, color);
    }

    pub fn polyline(&mut self, axes: &Axes, points: &[(f64, f64)], color: Rgb<u8>, width: f32) {
        for pair in points.windows(2) {
            self.line(axes, pair[0], pair[1], color, width);
        }
    }

    /// Filled circle at a data point, radius in pixels
    pub fn dot(&mut self, axes: &Axes, p: (f64, f64), radius: i32, color: Rgb<u8>) {
        let (x, y) = axes.to_px(p);
        draw_filled_circle_mut(&mut self.image, (x.round() as i32, y.round() as i32), radius, color);
    }

    /// Filled rectangle spanning data corners `(x0, y0)` and `(x1, y1)`
    pub fn fill_rect(&mut self, axes: &Axes, p0: (f64, f64), p1: (f64, f64), color: Rgb<u8>) {
        let (ax, ay) = axes.to_px(p0);
        let (bx, by) = axes.to_px(p1);
        let left = ax.min(bx).round() as i32;
        let top = ay.min(by).round() as i32;
        let width = (ax - bx).abs().round() as u32;
        let height = (ay - by).abs().round() as u32;
        if width == 0 || height == 0 {
            return;
        }
        draw_filled_rect_mut(&mut self.image, Rect::at(left, top).of_size(width, height), color);
    }

    /// Left and bottom spines of a panel
    pub fn frame(&mut self, axes: &Axes) {
        let a = axes.area;
        let (l, t, r, b) = (a.left as f32, a.top as f32, a.right() as f32, a.bottom() as f32);
        draw_line_segment_mut(&mut self.image, (l, t), (l, b), AXIS_COLOR);
        draw_line_segment_mut(&mut self.image, (l, b), (r, b), AXIS_COLOR);
    }

    /// Tick marks and labels on the y axis
    pub fn y_ticks(&mut self, axes: &Axes, ticks: &[f64]) {
        let left = axes.area.left as f32;
        for &tick in ticks {
            let y = axes.px_y(tick) as f32;
            draw_line_segment_mut(&mut self.image, (left - 5.0, y), (left, y), AXIS_COLOR);
            let label = format_number(tick);
            let (w, h) = self.text_size(TICK_SIZE, &label);
            self.text(
                left - 8.0 - w as f32,
                y - h as f32 / 2.0,
                TICK_SIZE,
                TEXT_COLOR,
                &label,
            );
        }
    }

    /// Tick marks and labels on the x axis
    pub fn x_ticks(&mut self, axes: &Axes, ticks: &[(f64, String)]) {
        let bottom = axes.area.bottom() as f32;
        for (tick, label) in ticks {
            let x = axes.px_x(*tick) as f32;
            draw_line_segment_mut(&mut self.image, (x, bottom), (x, bottom + 5.0), AXIS_COLOR);
            self.text_centered(x, bottom + 8.0, TICK_SIZE, TEXT_COLOR, label);
        }
    }

    pub fn text_size(&self, size: f32, text: &str) -> (u32, u32) {
        match self.fonts.font() {
            Some(font) => text_size(PxScale::from(size), font, text),
            None => (0, 0),
        }
    }

    /// Text with its top-left corner at pixel `(x, y)`
    pub fn text(&mut self, x: f32, y: f32, size: f32, color: Rgb<u8>, text: &str) {
        if let Some(font) = self.fonts.font() {
            draw_text_mut(
                &mut self.image,
                color,
                x.round() as i32,
                y.round() as i32,
                PxScale::from(size),
                font,
                text,
            );
        }
    }

    /// Text horizontally centered on `cx`
    pub fn text_centered(&mut self, cx: f32, y: f32, size: f32, color: Rgb<u8>, text: &str) {
        let (w, _) = self.text_size(size, text);
        self.text(cx - w as f32 / 2.0, y, size, color, text);
    }

    /// Write the figure to `<dir>/<name>.png`
    pub fn save(&self, dir: &Path, name: &str) -> Result<PathBuf, PlotError> {
        save_image(&self.image, dir, name)
    }
}

pub fn save_image(image: &RgbImage, dir: &Path, name: &str) -> Result<PathBuf, PlotError> {
    fs::create_dir_all(dir).map_err(|source| PlotError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}.png", name));
    image.save(&path).map_err(|source| PlotError::Image {
        path: path.clone(),
        source,
    })?;
    info!("Saved figure {}", path.display());
    Ok(path)
}
