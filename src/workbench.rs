//! Selection state and the actions a user can trigger on the shared plot.

use crate::config::{EvalConfig, NO_LEGEND};
use crate::error::{EvalError, PlotError, ResultError};
use crate::plotter::{AddOutcome, PlotSession};
use crate::results::{list_result_files, resolve_label, ResultRecord, Series};
use crate::style::LegendLocation;
use log::{info, warn};
use std::path::PathBuf;

/// Legend placements offered to the user, in menu order.
pub const LEGEND_CHOICES: [&str; 5] = ["best", "upper right", "lower left", "bottom", NO_LEGEND];

/// Anchor of the `bottom` legend, in axes fractions.
pub const BOTTOM_LEGEND_ANCHOR: (f64, f64) = (0.5, -0.13);

/// The currently selected result file.
#[derive(Debug, Clone)]
pub struct Selection {
    pub file: String,
    pub record: ResultRecord,
}

/// Drives a `PlotSession` from result files in an input directory.
#[derive(Debug)]
pub struct Workbench {
    input: PathBuf,
    output: PathBuf,
    files: Vec<String>,
    selected: Option<Selection>,
    series: Option<String>,
    settings: EvalConfig,
    plot: PlotSession,
}

impl Workbench {
    /// Lists the input directory and styles the plot from `settings`.
    pub fn open(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        settings: EvalConfig,
    ) -> Result<Self, EvalError> {
        let input = input.into();
        let files = list_result_files(&input)?;
        let mut workbench = Self {
            input,
            output: output.into(),
            files,
            selected: None,
            series: None,
            settings,
            plot: PlotSession::new(),
        };
        workbench.apply_style()?;
        info!(
            "Opened {} with {} result files",
            workbench.input.display(),
            workbench.files.len()
        );
        Ok(workbench)
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn plot(&self) -> &PlotSession {
        &self.plot
    }

    pub fn settings(&self) -> &EvalConfig {
        &self.settings
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub fn selected_series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    /// Re-reads the input directory listing.
    pub fn refresh_files(&mut self) -> Result<&[String], EvalError> {
        self.files = list_result_files(&self.input)?;
        Ok(&self.files)
    }

    /// Loads `file` from the input directory. On failure the selection is
    /// cleared and the error handed back for display.
    pub fn select_file(&mut self, file: &str) -> Result<&Selection, EvalError> {
        self.series = None;
        match ResultRecord::load(self.input.join(file)) {
            Ok(record) => {
                let selection = self.selected.insert(Selection {
                    file: file.to_string(),
                    record,
                });
                Ok(selection)
            }
            Err(err) => {
                warn!("Cannot select {}: {}", file, err);
                self.selected = None;
                Err(err.into())
            }
        }
    }

    pub fn series_names(&self) -> Vec<&str> {
        self.selected
            .as_ref()
            .map(|s| s.record.series_names())
            .unwrap_or_default()
    }

    pub fn select_series(&mut self, name: &str) -> Result<&Series, EvalError> {
        let selection = self.selected.as_ref().ok_or(ResultError::NothingSelected)?;
        let series = selection.record.get(name)?;
        self.series = Some(name.to_string());
        Ok(series)
    }

    /// Metadata block of the selected file.
    pub fn info_text(&self) -> Option<String> {
        self.selected.as_ref().map(|s| s.record.info_text())
    }

    /// Adds the selected series to the plot under the current label.
    pub fn add_selected(&mut self) -> Result<(String, AddOutcome), EvalError> {
        let selection = self.selected.as_ref().ok_or(ResultError::NothingSelected)?;
        let name = self.series.as_deref().ok_or(ResultError::NoSeriesSelected)?;
        let series = selection.record.get(name)?;
        let label = resolve_label(&self.settings.label, &selection.file, name);
        let text = selection.record.info_text();

        let outcome = self.plot.add(
            series.values.clone(),
            series.time_axis.clone(),
            &label,
            &text,
        )?;
        if let AddOutcome::Added { .. } = outcome {
            // Pick up a legend chosen while the plot was still empty
            let choice = self.settings.legend.clone();
            self.set_legend_choice(&choice)?;
        }
        Ok((label, outcome))
    }

    /// Empties the plot; the style falls back to simple.
    pub fn clear(&mut self) {
        self.plot.reset();
        self.settings.simple = true;
    }

    pub fn set_simple(&mut self, simple: bool) -> Result<(), PlotError> {
        self.settings.simple = simple;
        self.apply_style()
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), PlotError> {
        self.settings.title = title.to_string();
        self.apply_style()
    }

    pub fn set_xlabel(&mut self, xlabel: &str) -> Result<(), PlotError> {
        self.settings.xlabel = xlabel.to_string();
        self.apply_style()
    }

    pub fn set_ylabel(&mut self, ylabel: &str) -> Result<(), PlotError> {
        self.settings.ylabel = ylabel.to_string();
        self.apply_style()
    }

    pub fn set_label(&mut self, label: &str) {
        self.settings.label = label.to_string();
    }

    pub fn set_outfile(&mut self, outfile: &str) {
        self.settings.outfile = outfile.to_string();
    }

    pub fn set_info_text(&mut self, on: bool) {
        self.settings.info_text = on;
    }

    pub fn set_format(&mut self, format: &str) -> Result<(), PlotError> {
        let parsed = format.parse::<crate::render::ExportFormat>()?;
        self.settings.format = parsed.to_string();
        Ok(())
    }

    fn apply_style(&mut self) -> Result<(), PlotError> {
        if self.settings.simple {
            self.plot.style("simple", None, None, None)
        } else {
            self.plot.style(
                "fancy",
                Some(&self.settings.title),
                Some(&self.settings.xlabel),
                Some(&self.settings.ylabel),
            )
        }
    }

    /// Applies one of `LEGEND_CHOICES`.
    pub fn set_legend_choice(&mut self, choice: &str) -> Result<(), PlotError> {
        match choice {
            NO_LEGEND => self.plot.legend(false, None, None),
            "bottom" => self.plot.legend(
                true,
                Some(LegendLocation::UpperCenter),
                Some(BOTTOM_LEGEND_ANCHOR),
            ),
            "best" | "upper right" | "lower left" => {
                self.plot.legend(true, Some(choice.parse()?), None)
            }
            other => return Err(PlotError::UnknownLegendLocation(other.to_string())),
        }
        self.settings.legend = choice.to_string();
        Ok(())
    }

    /// Saves the plot into the output directory under the current file name.
    pub fn save(&mut self) -> Result<PathBuf, EvalError> {
        let format = self.settings.export_format()?;
        let base = self.output.join(&self.settings.outfile);
        let path = self.plot.save_plot(
            &base,
            self.settings.info_text,
            format,
            self.settings.size,
            self.settings.margins.as_ref(),
        )?;
        Ok(path)
    }
}
