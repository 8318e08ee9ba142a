//! Drawing a `PlotSession` with plotters.

use crate::error::PlotError;
use crate::layout::{
    best_location, minor_ticks, nice_step, padded_range, FigureGeometry, LegendBox,
};
use crate::plotter::{Curve, PlotSession, LINE_WIDTH_PT};
use crate::style::{AxesStyle, LegendConfig, LegendLocation};
use log::warn;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const FONT: &str = "sans-serif";
const TICK_FONT_PT: f64 = 10.0;
const LABEL_FONT_PT: f64 = 10.0;
const TITLE_FONT_PT: f64 = 12.0;
const LEGEND_FONT_PT: f64 = 10.0;
const INFO_FONT_PT: f64 = 10.0;
const MARKER_SIZE_PT: f64 = 6.0;
const MARKER_EDGE_PT: f64 = 1.0;
const AXIS_LINE_PT: f64 = 0.8;
const MINOR_TICK_PT: f64 = 2.0;
const TARGET_TICKS: usize = 8;
const GRID_COLOR: RGBColor = RGBColor(176, 176, 176);
const LEGEND_EDGE: RGBColor = RGBColor(204, 204, 204);

/// Bitmap canvases above this size get a warning before rendering.
const BITMAP_WARN_BYTES: u64 = 256 * 1024 * 1024;

/// Output file formats. Svg is the vector default.
///
/// The bitmap formats hold the whole canvas in memory as RGB. At 1200 dpi
/// the default figure is 7680 px wide and every info text block adds 0.6
/// figure heights, so six annotated curves already need about 600 MB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    /// Extension appended to the output base name, dot included.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => ".svg",
            ExportFormat::Png => ".png",
            ExportFormat::Jpeg => ".jpg",
            ExportFormat::Bmp => ".bmp",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "bmp" => Ok(ExportFormat::Bmp),
            _ => Err(PlotError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.extension()[1..])
    }
}

/// Size of the RGB buffer a bitmap backend allocates for `size`.
pub(crate) fn bitmap_bytes(size: (u32, u32)) -> u64 {
    size.0 as u64 * size.1 as u64 * 3
}

fn render_error<E: fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

fn font(geometry: &FigureGeometry, points: f64) -> TextStyle<'static> {
    TextStyle::from((FONT, geometry.pt(points)).into_font())
}

/// Renders `session` to `path`, choosing the backend from `format`.
pub(crate) fn render(
    session: &PlotSession,
    path: &Path,
    include_info_text: bool,
    format: ExportFormat,
    dpi: f64,
) -> Result<(), PlotError> {
    let geometry = FigureGeometry::new(session.figure(), dpi);
    let blocks = if include_info_text {
        session.curves().len()
    } else {
        0
    };
    let size = (geometry.width_px, geometry.canvas_height(blocks));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PlotError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match format {
        ExportFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw(&root, session, &geometry, include_info_text)
        }
        // The bitmap encoder is picked from the file extension
        ExportFormat::Png | ExportFormat::Jpeg | ExportFormat::Bmp => {
            let bytes = bitmap_bytes(size);
            if bytes > BITMAP_WARN_BYTES {
                warn!(
                    "{}x{} {} canvas needs {} MB; consider svg",
                    size.0,
                    size.1,
                    format,
                    bytes / (1024 * 1024)
                );
            }
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw(&root, session, &geometry, include_info_text)
        }
    }
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    session: &PlotSession,
    geometry: &FigureGeometry,
    include_info_text: bool,
) -> Result<(), PlotError> {
    root.fill(&WHITE).map_err(render_error)?;
    let (figure, annotations) = root.split_vertically(geometry.height_px as i32);

    let bounds = data_bounds(session.curves());
    draw_axes(&figure, session, geometry, bounds)?;

    if let Some(config) = session.legend_config() {
        draw_legend(&figure, session.curves(), geometry, bounds, config)?;
    }

    if include_info_text {
        draw_info_text(&annotations, session.curves(), geometry)?;
    }

    root.present().map_err(render_error)?;
    Ok(())
}

type Bounds = ((f64, f64), (f64, f64));

/// Padded (x, y) ranges covering every curve.
fn data_bounds(curves: &[Curve]) -> Bounds {
    if curves.is_empty() {
        return ((0.0, 1.0), (0.0, 1.0));
    }
    let (x_min, x_max) = min_max(curves.iter().flat_map(|c| c.time_axis.iter().copied()));
    let (y_min, y_max) = min_max(curves.iter().flat_map(|c| c.values.iter().copied()));
    (padded_range(x_min, x_max), padded_range(y_min, y_max))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn draw_axes<DB: DrawingBackend>(
    figure: &DrawingArea<DB, Shift>,
    session: &PlotSession,
    geometry: &FigureGeometry,
    bounds: Bounds,
) -> Result<(), PlotError> {
    let axes = geometry.axes;
    let style: &AxesStyle = session.axes_style();
    let ((x0, x1), (y0, y1)) = bounds;

    let mut chart = ChartBuilder::on(figure)
        .margin_top(axes.top.max(0))
        .margin_right((geometry.width_px as i32 - axes.right).max(0))
        .x_label_area_size((geometry.height_px as i32 - axes.bottom).max(0))
        .y_label_area_size(axes.left.max(0))
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_error)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(TARGET_TICKS)
        .y_labels(TARGET_TICKS)
        .label_style(font(geometry, TICK_FONT_PT))
        .axis_style(BLACK.stroke_width(geometry.pt_px(AXIS_LINE_PT)))
        .axis_desc_style(font(geometry, LABEL_FONT_PT));
    if !style.xlabel.is_empty() {
        mesh.x_desc(style.xlabel.as_str());
    }
    if !style.ylabel.is_empty() {
        mesh.y_desc(style.ylabel.as_str());
    }
    match style.grid {
        Some(grid) => {
            mesh.bold_line_style(GRID_COLOR.stroke_width(geometry.pt_px(grid.line_width_pt)))
                .light_line_style(&WHITE.mix(0.0));
        }
        None => {
            mesh.disable_mesh();
        }
    }
    mesh.draw().map_err(render_error)?;

    if style.minor_ticks {
        let tick = geometry.pt(MINOR_TICK_PT).round() as i32;
        let tick_style = BLACK.stroke_width(geometry.pt_px(AXIS_LINE_PT * 0.75));
        let x_minor = minor_ticks(x0, x1, nice_step(x1 - x0, TARGET_TICKS));
        let y_minor = minor_ticks(y0, y1, nice_step(y1 - y0, TARGET_TICKS));
        chart
            .draw_series(x_minor.into_iter().map(|x| {
                EmptyElement::at((x, y0)) + PathElement::new(vec![(0, 0), (0, -tick)], tick_style)
            }))
            .map_err(render_error)?;
        chart
            .draw_series(y_minor.into_iter().map(|y| {
                EmptyElement::at((x0, y)) + PathElement::new(vec![(0, 0), (tick, 0)], tick_style)
            }))
            .map_err(render_error)?;
    }

    let marker_radius = (geometry.pt(MARKER_SIZE_PT) / 2.0).round() as i32;
    for curve in session.curves() {
        let line_style = curve.color.stroke_width(geometry.pt_px(LINE_WIDTH_PT));
        let marker_style = curve.color.stroke_width(geometry.pt_px(MARKER_EDGE_PT));
        let points: Vec<(f64, f64)> = curve
            .time_axis
            .iter()
            .zip(curve.values.iter())
            .map(|(t, v)| (*t, *v))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), line_style))
            .map_err(render_error)?;

        let outline = curve.marker.outline(marker_radius);
        chart
            .draw_series(points.iter().step_by(curve.stride.max(1)).map(|p| {
                EmptyElement::at(*p) + PathElement::new(outline.clone(), marker_style)
            }))
            .map_err(render_error)?;
    }

    if !style.title.is_empty() {
        let centre = (axes.left + axes.right) / 2;
        let baseline = axes.top - geometry.pt(6.0).round() as i32;
        figure
            .draw(&Text::new(
                style.title.clone(),
                (centre, baseline),
                font(geometry, TITLE_FONT_PT).pos(Pos::new(HPos::Center, VPos::Bottom)),
            ))
            .map_err(render_error)?;
    }

    Ok(())
}

/// Resolves `Best` into a concrete location for the current data.
fn resolve_location(
    config: &LegendConfig,
    curves: &[Curve],
    geometry: &FigureGeometry,
    bounds: Bounds,
) -> LegendConfig {
    if config.location != LegendLocation::Best {
        return *config;
    }
    let ((x0, x1), (y0, y1)) = bounds;
    let labels: Vec<&str> = curves.iter().map(|c| c.label.as_str()).collect();
    let (width, height, ..) = LegendBox::measure(&labels, geometry.pt(LEGEND_FONT_PT));
    let box_size = (
        width as f64 / geometry.axes.width().max(1) as f64,
        height as f64 / geometry.axes.height().max(1) as f64,
    );
    let points = curves.iter().flat_map(|c| {
        c.time_axis
            .iter()
            .zip(c.values.iter())
            .map(move |(t, v)| ((t - x0) / (x1 - x0), (v - y0) / (y1 - y0)))
    });
    LegendConfig {
        location: best_location(points, box_size),
        anchor: config.anchor,
    }
}

fn draw_legend<DB: DrawingBackend>(
    figure: &DrawingArea<DB, Shift>,
    curves: &[Curve],
    geometry: &FigureGeometry,
    bounds: Bounds,
    config: &LegendConfig,
) -> Result<(), PlotError> {
    let config = resolve_location(config, curves, geometry, bounds);
    let labels: Vec<&str> = curves.iter().map(|c| c.label.as_str()).collect();
    let legend = LegendBox::place(&labels, geometry.pt(LEGEND_FONT_PT), &geometry.axes, &config);
    let rect = legend.rect;

    figure
        .draw(&Rectangle::new(
            [(rect.left, rect.top), (rect.right, rect.bottom)],
            WHITE.mix(0.8).filled(),
        ))
        .map_err(render_error)?;
    figure
        .draw(&Rectangle::new(
            [(rect.left, rect.top), (rect.right, rect.bottom)],
            LEGEND_EDGE.stroke_width(geometry.pt_px(AXIS_LINE_PT)),
        ))
        .map_err(render_error)?;

    let marker_radius = (geometry.pt(MARKER_SIZE_PT) / 2.0).round() as i32;
    let text_style = font(geometry, LEGEND_FONT_PT).pos(Pos::new(HPos::Left, VPos::Center));
    for (row, curve) in curves.iter().enumerate() {
        let x = rect.left + legend.padding;
        let y = rect.top + legend.padding + legend.row_height * row as i32 + legend.row_height / 2;
        let line_style = curve.color.stroke_width(geometry.pt_px(LINE_WIDTH_PT));
        let marker_style = curve.color.stroke_width(geometry.pt_px(MARKER_EDGE_PT));

        figure
            .draw(&PathElement::new(
                vec![(x, y), (x + legend.handle_length, y)],
                line_style,
            ))
            .map_err(render_error)?;
        figure
            .draw(
                &(EmptyElement::at((x + legend.handle_length / 2, y))
                    + PathElement::new(curve.marker.outline(marker_radius), marker_style)),
            )
            .map_err(render_error)?;
        figure
            .draw(&Text::new(
                curve.label.clone(),
                (x + legend.handle_length + legend.padding, y),
                text_style.clone(),
            ))
            .map_err(render_error)?;
    }
    Ok(())
}

/// Stacks each curve's info text below the figure, one block per curve.
fn draw_info_text<DB: DrawingBackend>(
    annotations: &DrawingArea<DB, Shift>,
    curves: &[Curve],
    geometry: &FigureGeometry,
) -> Result<(), PlotError> {
    let line_height = geometry.pt(INFO_FONT_PT * 1.2).round() as i32;
    let left = geometry.pt(4.0).round() as i32;
    let text_style = font(geometry, INFO_FONT_PT).pos(Pos::new(HPos::Left, VPos::Top));
    let tops = geometry.info_text_tops(curves.len());

    for (curve, top) in curves.iter().zip(tops) {
        // The annotation area starts at the figure's bottom edge
        let block_top = top - geometry.height_px as i32;
        for (i, line) in curve.info_text.lines().enumerate() {
            annotations
                .draw(&Text::new(
                    line.to_string(),
                    (left, block_top + line_height * i as i32),
                    text_style.clone(),
                ))
                .map_err(render_error)?;
        }
    }
    Ok(())
}
