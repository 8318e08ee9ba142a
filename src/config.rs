use crate::error::PlotError;
use crate::layout::MarginAdjust;
use crate::render::ExportFormat;
use crate::results::LABEL_PLACEHOLDER;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Legend choice meaning "no legend".
pub const NO_LEGEND: &str = "no legend";

/// Tool settings. Every field has a default, so a config file only needs
/// the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub label: String,
    pub outfile: String,
    pub format: String,
    pub info_text: bool,
    pub simple: bool,
    pub legend: String,
    pub size: Option<(f64, f64)>,
    pub margins: Option<MarginAdjust>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            xlabel: "xlabel".to_string(),
            ylabel: "ylabel".to_string(),
            label: LABEL_PLACEHOLDER.to_string(),
            outfile: "out".to_string(),
            format: "svg".to_string(),
            info_text: true,
            simple: false,
            legend: NO_LEGEND.to_string(),
            size: None,
            margins: None,
        }
    }
}

impl EvalConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading config {}", path_ref.display()))?;
        let config: EvalConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn export_format(&self) -> Result<ExportFormat, PlotError> {
        self.format.parse()
    }
}

/// One curve of a plot script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    pub file: String,
    pub series: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// A whole plot described in YAML, rendered without interaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotScript {
    #[serde(default)]
    pub settings: EvalConfig,
    #[serde(default)]
    pub curves: Vec<CurveSpec>,
}

impl PlotScript {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading plot script {}", path_ref.display()))?;
        let script: PlotScript = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing plot script {}", path_ref.display()))?;
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_widget_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.title, "Title");
        assert_eq!(config.outfile, "out");
        assert!(config.info_text);
        assert!(!config.simple);
        assert_eq!(config.legend, NO_LEGEND);
        assert_eq!(config.export_format().unwrap(), ExportFormat::Svg);
    }

    #[test]
    fn config_load_fills_missing_fields() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"title: Loss\nformat: png\nsize: [3.2, 2.4]\nmargins:\n  bottom: 0.3\n")
            .unwrap();
        let path = temp.into_temp_path();
        let config = EvalConfig::load(&path).unwrap();
        assert_eq!(config.title, "Loss");
        assert_eq!(config.xlabel, "xlabel");
        assert_eq!(config.size, Some((3.2, 2.4)));
        assert_eq!(config.margins.unwrap().bottom, Some(0.3));
        assert_eq!(config.export_format().unwrap(), ExportFormat::Png);
    }

    #[test]
    fn plot_script_parses_curves() {
        let script: PlotScript = serde_yaml::from_str(
            "settings:\n  simple: true\n  legend: bottom\ncurves:\n  - file: a_1_1.yml\n    series: train\n  - file: b_1_1.yml\n    series: valid\n    label: mine\n",
        )
        .unwrap();
        assert!(script.settings.simple);
        assert_eq!(script.settings.legend, "bottom");
        assert_eq!(script.curves.len(), 2);
        assert_eq!(script.curves[1].label.as_deref(), Some("mine"));
        assert_eq!(script.curves[0].label, None);
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = EvalConfig::load("/nonexistent/losseval.yml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/losseval.yml"));
    }
}
