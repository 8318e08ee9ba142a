use crate::error::PlotError;
use crate::layout::{FigureGeometry, FigureSettings, MarginAdjust, DPI};
use crate::markers::{palette_color, MarkerCycle, MarkerShape};
use crate::render::{self, ExportFormat};
use crate::style::{AxesStyle, LegendConfig, LegendLocation, StyleMode};
use log::{debug, info, warn};
use ndarray::Array1;
use plotters::style::RGBColor;
use std::path::{Path, PathBuf};

/// Target number of markers across the widest curve seen so far.
pub const MARKER_COUNT: usize = 20;

/// Curve line width in points.
pub const LINE_WIDTH_PT: f64 = 0.5;

/// One curve added to the shared figure.
#[derive(Debug, Clone)]
pub struct Curve {
    pub label: String,
    pub values: Array1<f64>,
    pub time_axis: Array1<f64>,
    pub info_text: String,
    pub marker: MarkerShape,
    pub color: RGBColor,
    /// Number of samples between two drawn markers, fixed when the curve is added.
    pub stride: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added { marker: MarkerShape, stride: usize },
    DuplicateLabel,
}

/// Marker spacing for a curve sampled every `step`, given the widest time
/// extent seen so far.
pub fn marker_stride(max_time: f64, step: f64) -> usize {
    let marker_dist = (max_time / MARKER_COUNT as f64).floor();
    let every = (marker_dist / step).floor();
    if every.is_finite() && every > 1.0 {
        every as usize
    } else {
        1
    }
}

/// The shared figure: curves, marker cycle, axes style, legend and size.
#[derive(Debug, Clone)]
pub struct PlotSession {
    curves: Vec<Curve>,
    markers: MarkerCycle,
    max_time: f64,
    axes: AxesStyle,
    legend: Option<LegendConfig>,
    figure: FigureSettings,
}

impl Default for PlotSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotSession {
    pub fn new() -> Self {
        Self {
            curves: Vec::new(),
            markers: MarkerCycle::new(),
            max_time: 0.0,
            axes: AxesStyle::simple(),
            legend: None,
            figure: FigureSettings::default(),
        }
    }

    /// Drops every curve and returns to the initial simple, legend-less state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Adds a curve under `label`. A label that is already present is
    /// logged and ignored.
    pub fn add(
        &mut self,
        values: impl Into<Array1<f64>>,
        time_axis: impl Into<Array1<f64>>,
        label: &str,
        info_text: &str,
    ) -> Result<AddOutcome, PlotError> {
        if self.curve(label).is_some() {
            warn!("Label already added: {}", label);
            return Ok(AddOutcome::DuplicateLabel);
        }

        let values = values.into();
        let time_axis = time_axis.into();
        if values.len() != time_axis.len() {
            return Err(PlotError::InvalidSeries {
                label: label.to_string(),
                reason: format!(
                    "{} values against {} time points",
                    values.len(),
                    time_axis.len()
                ),
            });
        }
        if time_axis.len() < 2 {
            return Err(PlotError::InvalidSeries {
                label: label.to_string(),
                reason: "at least two samples are required".to_string(),
            });
        }

        let stride = self.next_stride(&time_axis);
        let marker = self.markers.next_marker();
        let color = palette_color(self.curves.len());
        debug!(
            "Adding '{}' with marker {} every {} samples (max time {})",
            label, marker, stride, self.max_time
        );

        self.curves.push(Curve {
            label: label.to_string(),
            values,
            time_axis,
            info_text: info_text.to_string(),
            marker,
            color,
            stride,
        });

        Ok(AddOutcome::Added { marker, stride })
    }

    fn next_stride(&mut self, time_axis: &Array1<f64>) -> usize {
        let last = time_axis[time_axis.len() - 1];
        if last > self.max_time {
            self.max_time = last;
        }
        // The second sample stands in for the sampling step
        marker_stride(self.max_time, time_axis[1])
    }

    /// Switches between the `simple` and `fancy` styles.
    pub fn style(
        &mut self,
        mode: &str,
        title: Option<&str>,
        xlabel: Option<&str>,
        ylabel: Option<&str>,
    ) -> Result<(), PlotError> {
        self.axes = match mode.parse::<StyleMode>()? {
            StyleMode::Simple => AxesStyle::simple(),
            StyleMode::Fancy => AxesStyle::fancy(
                title.unwrap_or_default(),
                xlabel.unwrap_or_default(),
                ylabel.unwrap_or_default(),
            ),
        };
        Ok(())
    }

    /// Shows or removes the legend. Does nothing while the plot is empty.
    pub fn legend(&mut self, on: bool, location: Option<LegendLocation>, anchor: Option<(f64, f64)>) {
        if self.curves.is_empty() {
            return;
        }
        self.legend = on.then(|| LegendConfig {
            location: location.unwrap_or_default(),
            anchor,
        });
    }

    /// Writes the figure to `path` with the format extension appended and
    /// returns the written path.
    pub fn save_plot(
        &mut self,
        path: &Path,
        include_info_text: bool,
        format: ExportFormat,
        size: Option<(f64, f64)>,
        margins: Option<&MarginAdjust>,
    ) -> Result<PathBuf, PlotError> {
        self.save_plot_at(path, include_info_text, format, size, margins, DPI)
    }

    /// `save_plot` with an explicit resolution.
    pub(crate) fn save_plot_at(
        &mut self,
        path: &Path,
        include_info_text: bool,
        format: ExportFormat,
        size: Option<(f64, f64)>,
        margins: Option<&MarginAdjust>,
        dpi: f64,
    ) -> Result<PathBuf, PlotError> {
        if let Some(size) = size {
            self.figure.size_in = size;
        }
        if let Some(margins) = margins {
            self.figure.margins.adjust(margins);
        }

        let mut target = path.as_os_str().to_owned();
        target.push(format.extension());
        let target = PathBuf::from(target);

        render::render(self, &target, include_info_text, format, dpi)?;
        info!("Saved {} curve(s) to {}", self.curves.len(), target.display());
        Ok(target)
    }

    /// Label and top pixel row of each info text block at export resolution,
    /// in addition order.
    pub fn info_text_layout(&self) -> Vec<(&str, i32)> {
        let geometry = FigureGeometry::new(&self.figure, DPI);
        self.curves
            .iter()
            .map(|c| c.label.as_str())
            .zip(geometry.info_text_tops(self.curves.len()))
            .collect()
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn curve(&self, label: &str) -> Option<&Curve> {
        self.curves.iter().find(|c| c.label == label)
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    pub fn current_style(&self) -> StyleMode {
        self.axes.mode
    }

    pub fn axes_style(&self) -> &AxesStyle {
        &self.axes
    }

    pub fn legend_config(&self) -> Option<&LegendConfig> {
        self.legend.as_ref()
    }

    pub fn figure(&self) -> &FigureSettings {
        &self.figure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Margins;
    use crate::markers::MARKERS;
    use std::fs;
    use tempfile::TempDir;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    fn decay(n: usize) -> Vec<f64> {
        (0..n).map(|i| (-(i as f64) / 10.0).exp()).collect()
    }

    fn stride_of(outcome: AddOutcome) -> usize {
        match outcome {
            AddOutcome::Added { stride, .. } => stride,
            AddOutcome::DuplicateLabel => panic!("curve was rejected"),
        }
    }

    #[test]
    fn stride_formula_matches_examples() {
        assert_eq!(marker_stride(99.0, 1.0), 4);
        assert_eq!(marker_stride(49.0, 1.0), 2);
        assert_eq!(marker_stride(1000.0, 10.0), 5);
        assert_eq!(marker_stride(10.0, 1.0), 1);
        assert_eq!(marker_stride(100.0, 0.0), 1);
        assert_eq!(marker_stride(100.0, -1.0), 1);
    }

    #[test]
    fn duplicate_label_leaves_session_unchanged() {
        let mut session = PlotSession::new();
        session.add(decay(50), ramp(50), "run_a", "info").unwrap();
        let before: Vec<String> = session.curves().iter().map(|c| c.label.clone()).collect();

        let outcome = session.add(decay(100), ramp(100), "run_a", "other").unwrap();
        assert_eq!(outcome, AddOutcome::DuplicateLabel);
        let after: Vec<String> = session.curves().iter().map(|c| c.label.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(session.curves()[0].info_text, "info");
        assert_eq!(session.max_time(), 49.0);
    }

    #[test]
    fn markers_cycle_in_addition_order() {
        let mut session = PlotSession::new();
        for i in 0..10 {
            session.add(decay(5), ramp(5), &format!("c{i}"), "").unwrap();
        }
        let markers: Vec<MarkerShape> = session.curves().iter().map(|c| c.marker).collect();
        assert_eq!(&markers[..9], &MARKERS[..]);
        assert_eq!(markers[9], MARKERS[0]);
    }

    #[test]
    fn wider_curve_changes_only_later_strides() {
        let mut session = PlotSession::new();
        let short = stride_of(session.add(decay(50), ramp(50), "short", "").unwrap());
        assert_eq!(short, 2);
        let long = stride_of(session.add(decay(100), ramp(100), "long", "").unwrap());
        assert_eq!(long, 4);
        // Already-added curve keeps its spacing
        assert_eq!(session.curve("short").unwrap().stride, 2);

        // A later short curve uses the widest extent seen so far
        let late = stride_of(session.add(decay(50), ramp(50), "late", "").unwrap());
        assert_eq!(late, 4);
        assert_eq!(session.max_time(), 99.0);
    }

    #[test]
    fn wide_curve_first_sets_stride_for_both() {
        let mut session = PlotSession::new();
        let first = stride_of(session.add(decay(100), ramp(100), "long", "").unwrap());
        let second = stride_of(session.add(decay(50), ramp(50), "short", "").unwrap());
        assert_eq!(first, marker_stride(99.0, 1.0));
        assert_eq!(second, marker_stride(99.0, 1.0));
    }

    #[test]
    fn stride_never_decreases_as_max_time_grows() {
        let mut session = PlotSession::new();
        let mut previous = 0;
        for (i, n) in [30, 25, 80, 60, 200, 150, 400].into_iter().enumerate() {
            let stride = stride_of(session.add(decay(n), ramp(n), &format!("c{i}"), "").unwrap());
            assert!(stride >= previous);
            previous = stride;
        }
    }

    #[test]
    fn reset_behaves_like_a_fresh_session() {
        let mut fresh = PlotSession::new();
        let expected = fresh.add(decay(50), ramp(50), "a", "").unwrap();

        let mut used = PlotSession::new();
        used.add(decay(400), ramp(400), "x", "").unwrap();
        used.add(decay(10), ramp(10), "y", "").unwrap();
        used.style("fancy", Some("T"), None, None).unwrap();
        used.legend(true, None, None);
        used.reset();

        assert_eq!(used.add(decay(50), ramp(50), "a", "").unwrap(), expected);
        assert_eq!(used.max_time(), fresh.max_time());
        assert_eq!(used.current_style(), StyleMode::Simple);
        assert!(used.legend_config().is_none());
    }

    #[test]
    fn unknown_style_fails() {
        let mut session = PlotSession::new();
        let err = session.style("bogus", None, None, None).unwrap_err();
        assert!(matches!(err, PlotError::UnknownStyle(_)));
        assert_eq!(session.current_style(), StyleMode::Simple);
    }

    #[test]
    fn simple_then_fancy_restores_labels_and_grid() {
        let mut session = PlotSession::new();
        session.style("fancy", Some("Loss"), Some("epoch"), Some("value")).unwrap();
        let fancy = session.axes_style().clone();

        session.style("simple", None, None, None).unwrap();
        assert!(session.axes_style().title.is_empty());
        assert!(session.axes_style().grid.is_none());
        assert!(!session.axes_style().minor_ticks);

        session.style("fancy", Some("Loss"), Some("epoch"), Some("value")).unwrap();
        assert_eq!(session.axes_style(), &fancy);
        assert_eq!(session.current_style(), StyleMode::Fancy);
    }

    #[test]
    fn legend_ignored_without_curves() {
        let mut session = PlotSession::new();
        session.legend(true, Some(LegendLocation::LowerLeft), None);
        assert!(session.legend_config().is_none());

        session.add(decay(5), ramp(5), "a", "").unwrap();
        session.legend(true, Some(LegendLocation::LowerLeft), None);
        assert_eq!(
            session.legend_config().map(|l| l.location),
            Some(LegendLocation::LowerLeft)
        );
        session.legend(false, None, None);
        assert!(session.legend_config().is_none());
    }

    #[test]
    fn rejects_mismatched_or_short_series() {
        let mut session = PlotSession::new();
        let err = session.add(vec![1.0, 2.0], vec![0.0], "bad", "").unwrap_err();
        assert!(matches!(err, PlotError::InvalidSeries { .. }));
        let err = session.add(vec![1.0], vec![0.0], "single", "").unwrap_err();
        assert!(matches!(err, PlotError::InvalidSeries { .. }));
        assert!(session.curves().is_empty());
        assert_eq!(session.max_time(), 0.0);
    }

    #[test]
    fn info_blocks_follow_insertion_order_downwards() {
        let mut session = PlotSession::new();
        for label in ["first", "second", "third"] {
            session.add(decay(20), ramp(20), label, label).unwrap();
        }
        let layout = session.info_text_layout();
        let labels: Vec<&str> = layout.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, ["first", "second", "third"]);
        assert!(layout.windows(2).all(|w| w[1].1 > w[0].1));
    }

    /// Vertical position of the `<text>` element holding `needle`.
    fn text_y(svg: &str, needle: &str) -> f64 {
        let at = svg
            .find(needle)
            .unwrap_or_else(|| panic!("{} not in svg", needle));
        let start = svg[..at].rfind("<text").expect("enclosing text element");
        let attr = svg[start..at].split(" y=\"").nth(1).expect("y attribute");
        attr[..attr.find('"').unwrap()].parse().unwrap()
    }

    #[test]
    fn saved_svg_stacks_info_text_below_the_figure() {
        let dir = TempDir::new().unwrap();
        let mut session = PlotSession::new();
        session
            .add(decay(100), ramp(100), "first", "name: AAA\ntype: x")
            .unwrap();
        session
            .add(decay(50), ramp(50), "second", "name: BBB\ntype: y")
            .unwrap();

        let path = session
            .save_plot(&dir.path().join("plots/loss"), true, ExportFormat::Svg, None, None)
            .unwrap();
        assert_eq!(path, dir.path().join("plots/loss.svg"));

        let svg = fs::read_to_string(&path).unwrap();
        let geometry = FigureGeometry::new(session.figure(), DPI);
        assert_eq!(geometry.width_px, 7680);
        assert!(svg.contains(&format!(
            "<svg width=\"7680\" height=\"{}\"",
            geometry.canvas_height(2)
        )));

        let ys: Vec<f64> = ["name: AAA", "type: x", "name: BBB", "type: y"]
            .iter()
            .map(|needle| text_y(&svg, needle))
            .collect();
        assert!(ys[0] > geometry.height_px as f64);
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn size_and_margins_persist_between_saves() {
        let dir = TempDir::new().unwrap();
        let mut session = PlotSession::new();
        session.add(decay(20), ramp(20), "a", "name: A").unwrap();
        let margins = MarginAdjust {
            bottom: Some(0.2),
            ..Default::default()
        };

        session
            .save_plot(
                &dir.path().join("small"),
                false,
                ExportFormat::Svg,
                Some((3.2, 2.4)),
                Some(&margins),
            )
            .unwrap();
        let again = session
            .save_plot(&dir.path().join("again"), false, ExportFormat::Svg, None, None)
            .unwrap();

        assert_eq!(session.figure().size_in, (3.2, 2.4));
        assert_eq!(session.figure().margins.bottom, 0.2);
        assert_eq!(session.figure().margins.top, Margins::default().top);
        let svg = fs::read_to_string(again).unwrap();
        assert!(svg.contains("<svg width=\"3840\" height=\"2880\""));
        assert!(!svg.contains("name: A"));
    }
}
