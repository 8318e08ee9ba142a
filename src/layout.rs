//! Figure geometry: everything that turns inches, points and axes fractions
//! into canvas pixels.

use crate::style::{LegendConfig, LegendLocation};
use serde::{Deserialize, Serialize};

/// Export resolution.
pub const DPI: f64 = 1200.0;
pub const POINTS_PER_INCH: f64 = 72.0;

/// Default figure size in inches.
pub const DEFAULT_SIZE: (f64, f64) = (6.4, 4.8);

/// Vertical distance between consecutive info text blocks, in figure heights.
pub const INFO_TEXT_STEP: f64 = 0.6;
/// Gap between the bottom of the figure and the first info text block.
pub const INFO_TEXT_GAP: f64 = 0.02;

/// Axes box position as fractions of the figure, (0, 0) lower-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
        }
    }
}

/// Partial margin update; unset sides keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginAdjust {
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub right: Option<f64>,
    #[serde(default)]
    pub bottom: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
}

impl Margins {
    pub fn adjust(&mut self, update: &MarginAdjust) {
        if let Some(left) = update.left {
            self.left = left;
        }
        if let Some(right) = update.right {
            self.right = right;
        }
        if let Some(bottom) = update.bottom {
            self.bottom = bottom;
        }
        if let Some(top) = update.top {
            self.top = top;
        }
    }
}

/// Persistent figure settings of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSettings {
    pub size_in: (f64, f64),
    pub margins: Margins,
}

impl Default for FigureSettings {
    fn default() -> Self {
        Self {
            size_in: DEFAULT_SIZE,
            margins: Margins::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Pixel geometry of one export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureGeometry {
    pub width_px: u32,
    pub height_px: u32,
    /// Pixels per point.
    pub scale: f64,
    /// Axes box inside the figure.
    pub axes: PixelRect,
}

impl FigureGeometry {
    pub fn new(settings: &FigureSettings, dpi: f64) -> Self {
        let width_px = (settings.size_in.0 * dpi).round().max(1.0) as u32;
        let height_px = (settings.size_in.1 * dpi).round().max(1.0) as u32;
        let (w, h) = (width_px as f64, height_px as f64);
        let m = settings.margins;
        let axes = PixelRect {
            left: (m.left * w).round() as i32,
            right: (m.right * w).round() as i32,
            top: ((1.0 - m.top) * h).round() as i32,
            bottom: ((1.0 - m.bottom) * h).round() as i32,
        };
        Self {
            width_px,
            height_px,
            scale: dpi / POINTS_PER_INCH,
            axes,
        }
    }

    /// Converts a length in points to pixels.
    pub fn pt(&self, points: f64) -> f64 {
        points * self.scale
    }

    /// Converts a length in points to whole pixels, never less than one.
    pub fn pt_px(&self, points: f64) -> u32 {
        self.pt(points).round().max(1.0) as u32
    }

    /// Top edge of each info text block, in canvas pixels, one per curve.
    pub fn info_text_tops(&self, blocks: usize) -> Vec<i32> {
        info_text_tops(self.height_px, blocks)
    }

    /// Canvas height once `blocks` info text blocks are stacked below the figure.
    pub fn canvas_height(&self, blocks: usize) -> u32 {
        if blocks == 0 {
            return self.height_px;
        }
        let extra = self.height_px as f64 * (INFO_TEXT_GAP + INFO_TEXT_STEP * blocks as f64);
        self.height_px + extra.round() as u32
    }
}

/// Top edge of each info text block for a figure `height_px` tall.
///
/// Block `i` sits `INFO_TEXT_STEP` figure heights further down than block `i - 1`.
pub fn info_text_tops(height_px: u32, blocks: usize) -> Vec<i32> {
    let h = height_px as f64;
    (0..blocks)
        .map(|i| (h + h * (INFO_TEXT_GAP + INFO_TEXT_STEP * i as f64)).round() as i32)
        .collect()
}

/// Data range with a 5% margin on both ends; degenerate ranges are widened.
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        let pad = if min == 0.0 { 0.5 } else { min.abs() * 0.05 };
        return (min - pad, max + pad);
    }
    (min - span * 0.05, max + span * 0.05)
}

/// A 1-2-5 step giving roughly `target` intervals over `span`.
pub fn nice_step(span: f64, target: usize) -> f64 {
    if !span.is_finite() || span <= 0.0 || target == 0 {
        return 1.0;
    }
    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Minor tick positions inside `(min, max)`: five subdivisions per major
/// step, skipping positions that coincide with major ticks.
pub fn minor_ticks(min: f64, max: f64, major_step: f64) -> Vec<f64> {
    if !(max > min) || major_step <= 0.0 {
        return Vec::new();
    }
    let minor = major_step / 5.0;
    let first = (min / minor).ceil() as i64;
    let last = (max / minor).floor() as i64;
    (first..=last)
        .filter(|i| i.rem_euclid(5) != 0)
        .map(|i| i as f64 * minor)
        .collect()
}

/// Candidate order for the `best` legend location.
const BEST_CANDIDATES: [LegendLocation; 10] = [
    LegendLocation::UpperRight,
    LegendLocation::UpperLeft,
    LegendLocation::LowerLeft,
    LegendLocation::LowerRight,
    LegendLocation::Right,
    LegendLocation::CenterLeft,
    LegendLocation::CenterRight,
    LegendLocation::LowerCenter,
    LegendLocation::UpperCenter,
    LegendLocation::Center,
];

/// Picks the location whose legend box covers the fewest data points.
///
/// Points are given in axes fractions, `box_size` is the legend size in the
/// same units. Ties go to the earlier candidate, so an empty plot gets
/// `UpperRight`.
pub fn best_location<I>(points: I, box_size: (f64, f64)) -> LegendLocation
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let points: Vec<(f64, f64)> = points.into_iter().collect();
    let (bw, bh) = box_size;
    let mut best = (LegendLocation::UpperRight, usize::MAX);
    for candidate in BEST_CANDIDATES {
        let (fx, fy) = candidate.box_alignment();
        let x0 = fx * (1.0 - bw);
        let y0 = fy * (1.0 - bh);
        let covered = points
            .iter()
            .filter(|(x, y)| *x >= x0 && *x <= x0 + bw && *y >= y0 && *y <= y0 + bh)
            .count();
        if covered < best.1 {
            best = (candidate, covered);
        }
    }
    best.0
}

/// Pixel placement of a legend box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendBox {
    pub rect: PixelRect,
    pub padding: i32,
    pub row_height: i32,
    pub handle_length: i32,
}

impl LegendBox {
    /// Estimates the legend size for `labels` drawn at `font_px`.
    pub fn measure(labels: &[&str], font_px: f64) -> (i32, i32, i32, i32, i32) {
        let padding = (font_px * 0.5).round() as i32;
        let row_height = (font_px * 1.4).round() as i32;
        let handle_length = (font_px * 2.0).round() as i32;
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let text_width = (longest as f64 * font_px * 0.6).round() as i32;
        let width = 2 * padding + handle_length + padding + text_width;
        let height = 2 * padding + row_height * labels.len() as i32;
        (width, height, padding, row_height, handle_length)
    }

    /// Places a legend of `labels` at a resolved (non-`Best`) location.
    pub fn place(labels: &[&str], font_px: f64, axes: &PixelRect, config: &LegendConfig) -> Self {
        let (width, height, padding, row_height, handle_length) = Self::measure(labels, font_px);
        let (fx, fy) = config.location.box_alignment();
        let (ax, ay) = match config.anchor {
            Some((x, y)) => (
                axes.left as f64 + x * axes.width() as f64,
                axes.bottom as f64 - y * axes.height() as f64,
            ),
            None => (
                axes.left as f64 + fx * axes.width() as f64 + padding as f64 * (1.0 - 2.0 * fx),
                axes.bottom as f64 - fy * axes.height() as f64 - padding as f64 * (1.0 - 2.0 * fy),
            ),
        };
        let left = (ax - fx * width as f64).round() as i32;
        let top = (ay - (1.0 - fy) * height as f64).round() as i32;
        Self {
            rect: PixelRect {
                left,
                top,
                right: left + width,
                bottom: top + height,
            },
            padding,
            row_height,
            handle_length,
        }
    }

    /// Whether the legend lies entirely inside the axes box.
    pub fn inside(&self, axes: &PixelRect) -> bool {
        axes.contains(self.rect.left, self.rect.top) && axes.contains(self.rect.right, self.rect.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_scales_inches_and_points() {
        let geometry = FigureGeometry::new(&FigureSettings::default(), DPI);
        assert_eq!(geometry.width_px, 7680);
        assert_eq!(geometry.height_px, 5760);
        assert!((geometry.pt(72.0) - 1200.0).abs() < 1e-9);
        assert_eq!(geometry.axes.left, 960);
        assert_eq!(geometry.axes.right, 6912);
    }

    #[test]
    fn margin_adjust_only_touches_given_sides() {
        let mut margins = Margins::default();
        margins.adjust(&MarginAdjust {
            bottom: Some(0.3),
            ..Default::default()
        });
        assert_eq!(margins.bottom, 0.3);
        assert_eq!(margins.left, Margins::default().left);
    }

    #[test]
    fn info_text_blocks_move_strictly_down() {
        let tops = info_text_tops(480, 4);
        assert_eq!(tops.len(), 4);
        assert!(tops[0] > 480);
        for pair in tops.windows(2) {
            assert!(pair[1] > pair[0]);
            assert_eq!(pair[1] - pair[0], 288);
        }
    }

    #[test]
    fn canvas_grows_with_info_blocks() {
        let settings = FigureSettings {
            size_in: (1.0, 1.0),
            ..Default::default()
        };
        let geometry = FigureGeometry::new(&settings, 100.0);
        assert_eq!(geometry.canvas_height(0), 100);
        assert_eq!(geometry.canvas_height(2), 100 + 122);
    }

    #[test]
    fn nice_steps_follow_one_two_five() {
        assert_eq!(nice_step(100.0, 10), 10.0);
        assert_eq!(nice_step(99.0, 10), 10.0);
        assert!((nice_step(1.7, 10) - 0.2).abs() < 1e-12);
        assert_eq!(nice_step(35.0, 10), 5.0);
    }

    #[test]
    fn minor_ticks_skip_major_positions() {
        let ticks = minor_ticks(0.0, 10.0, 5.0);
        assert_eq!(ticks, vec![1.0, 2.0, 3.0, 4.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn padded_range_handles_flat_data() {
        assert_eq!(padded_range(0.0, 0.0), (-0.5, 0.5));
        let (lo, hi) = padded_range(0.0, 100.0);
        assert_eq!((lo, hi), (-5.0, 105.0));
    }

    #[test]
    fn best_location_avoids_crowded_corner() {
        // Decaying curve: crowded upper-left, empty upper-right
        let points = (0..50).map(|i| {
            let x = i as f64 / 49.0;
            (x, (-(5.0 * x)).exp())
        });
        assert_eq!(best_location(points, (0.3, 0.3)), LegendLocation::UpperRight);

        // Rising curve reaches the upper-right corner
        let points = (0..50).map(|i| {
            let x = i as f64 / 49.0;
            (x, x * x)
        });
        assert_eq!(best_location(points, (0.3, 0.3)), LegendLocation::UpperLeft);
    }

    #[test]
    fn anchored_upper_center_sits_below_axes() {
        let axes = PixelRect {
            left: 100,
            top: 50,
            right: 900,
            bottom: 450,
        };
        let config = LegendConfig {
            location: LegendLocation::UpperCenter,
            anchor: Some((0.5, -0.13)),
        };
        let legend = LegendBox::place(&["a_loss", "b_loss"], 20.0, &axes, &config);
        assert_eq!(legend.rect.top, 450 + 52);
        let centre = (legend.rect.left + legend.rect.right) as f64 / 2.0;
        assert!((centre - 500.0).abs() <= 1.0);
        assert!(!legend.inside(&axes));
    }

    #[test]
    fn corner_legend_stays_inside_axes() {
        let axes = PixelRect {
            left: 0,
            top: 0,
            right: 1000,
            bottom: 800,
        };
        for location in [
            LegendLocation::UpperRight,
            LegendLocation::LowerLeft,
            LegendLocation::UpperLeft,
        ] {
            let config = LegendConfig {
                location,
                anchor: None,
            };
            let legend = LegendBox::place(&["train"], 20.0, &axes, &config);
            assert!(legend.inside(&axes), "{location:?} escapes the axes");
        }
    }
}
