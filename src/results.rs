//! Reading experiment result files.
//!
//! A result file is a YAML mapping with a `loss` mapping of series name to
//! `[values, time_axis]`, plus a handful of descriptive fields.

use crate::error::ResultError;
use log::{debug, info};
use ndarray::Array1;
use serde_yaml::{Mapping, Value};
use std::cmp::Reverse;
use std::fs;
use std::path::Path;

/// Metadata fields shown next to a selection and appended to saved plots.
pub const INFO_TEXT_KEYS: [&str; 6] = [
    "name",
    "type",
    "description",
    "train_dataset",
    "parameters",
    "info",
];

/// Label text field placeholder; a label equal to it counts as unset.
pub const LABEL_PLACEHOLDER: &str = "Label name";

/// File extensions recognised as result files.
pub const RESULT_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// One named (values, time axis) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Array1<f64>,
    pub time_axis: Array1<f64>,
}

/// A parsed result file.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    series: Vec<Series>,
    metadata: Mapping,
}

impl ResultRecord {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ResultError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ResultError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_yaml::from_str(&contents).map_err(|source| ResultError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        let record = Self::from_value(value)?;
        info!(
            "Loaded {} ({} series)",
            path.display(),
            record.series.len()
        );
        Ok(record)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ResultError> {
        let value: Value = serde_yaml::from_str(contents).map_err(|source| ResultError::Yaml {
            path: Default::default(),
            source,
        })?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, ResultError> {
        let mut document = match value {
            Value::Mapping(mapping) => mapping,
            _ => return Err(ResultError::NoSeries),
        };

        let loss = match document.remove("loss") {
            Some(Value::Mapping(loss)) => loss,
            _ => return Err(ResultError::NoSeries),
        };

        let mut series = Vec::with_capacity(loss.len());
        for (key, pair) in loss {
            let name = match key {
                Value::String(s) => s,
                other => serde_yaml::to_string(&other)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            };
            series.push(parse_series(name, pair)?);
        }
        if series.is_empty() {
            return Err(ResultError::NoSeries);
        }

        // Older files spell the dataset key out in full
        if !document.contains_key("train_dataset") {
            if let Some(dataset) = document.remove("training_dataset") {
                document.insert(Value::from("train_dataset"), dataset);
            }
        }

        Ok(Self {
            series,
            metadata: document,
        })
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Result<&Series, ResultError> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ResultError::UnknownSeries(name.to_string()))
    }

    /// A metadata field, `None` when the file does not carry it.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// YAML dump of the info text fields, keys sorted, missing ones as null.
    pub fn info_text(&self) -> String {
        let mut keys = INFO_TEXT_KEYS;
        keys.sort_unstable();
        let mut selected = Mapping::new();
        for key in keys {
            let value = self.field(key).cloned().unwrap_or(Value::Null);
            selected.insert(Value::from(key), value);
        }
        serde_yaml::to_string(&selected).unwrap_or_default()
    }
}

fn parse_series(name: String, pair: Value) -> Result<Series, ResultError> {
    let malformed = |reason: String| ResultError::MalformedSeries {
        name: name.clone(),
        reason,
    };
    let (values, time_axis): (Vec<f64>, Vec<f64>) =
        serde_yaml::from_value(pair).map_err(|e| malformed(e.to_string()))?;
    if values.len() != time_axis.len() {
        return Err(malformed(format!(
            "{} values against {} time points",
            values.len(),
            time_axis.len()
        )));
    }
    if time_axis.len() < 2 {
        return Err(malformed("fewer than two samples".to_string()));
    }
    Ok(Series {
        name,
        values: Array1::from(values),
        time_axis: Array1::from(time_axis),
    })
}

/// Sort key splitting `prefix_middle_last.yml` from the right into three
/// parts and dropping the four-character extension of the last one.
pub fn sort_key(file_name: &str) -> (String, String, String) {
    let mut parts: Vec<&str> = file_name.rsplitn(3, '_').collect();
    parts.reverse();
    while parts.len() < 3 {
        parts.insert(0, "");
    }
    let last = parts[2];
    let cut = last
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    (parts[0].to_string(), parts[1].to_string(), last[..cut].to_string())
}

/// Orders result file names newest-looking first.
pub fn sort_files(files: &mut [String]) {
    files.sort_by_key(|name| Reverse(sort_key(name)));
}

/// Result file names in `dir`, sorted with `sort_files`.
pub fn list_result_files<P: AsRef<Path>>(dir: P) -> Result<Vec<String>, ResultError> {
    let dir = dir.as_ref();
    let io_error = |source| ResultError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_result = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| RESULT_EXTENSIONS.contains(&e))
            .unwrap_or(false);
        if !is_result || !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(name.to_string());
        }
    }
    sort_files(&mut files);
    debug!("Found {} result files in {}", files.len(), dir.display());
    Ok(files)
}

/// Default curve label: file name without extension, then the series name.
pub fn default_label(file_name: &str, series: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    format!("{}_{}", stem, series)
}

/// The label a curve gets: the custom one when set, else the default.
pub fn resolve_label(custom: &str, file_name: &str, series: &str) -> String {
    if !custom.is_empty() && custom != LABEL_PLACEHOLDER {
        custom.to_string()
    } else {
        default_label(file_name, series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
name: resnet
type: classifier
description: baseline run
train_dataset: cifar10
parameters:
  lr: 0.01
  batch: 64
info: first try
loss:
  train: [[1.0, 0.5, 0.25], [0, 1, 2]]
  valid: [[1.2, 0.7, 0.4], [0, 1, 2]]
";

    #[test]
    fn parses_series_in_file_order() {
        let record = ResultRecord::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(record.series_names(), ["train", "valid"]);
        let train = record.get("train").unwrap();
        assert_eq!(train.values.to_vec(), vec![1.0, 0.5, 0.25]);
        assert_eq!(train.time_axis.to_vec(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn info_text_lists_keys_sorted() {
        let record = ResultRecord::from_yaml_str(SAMPLE).unwrap();
        let text = record.info_text();
        let keys: Vec<&str> = text
            .lines()
            .filter(|l| !l.starts_with(' '))
            .filter_map(|l| l.split(':').next())
            .collect();
        assert_eq!(
            keys,
            ["description", "info", "name", "parameters", "train_dataset", "type"]
        );
        assert!(text.contains("lr: 0.01"));
    }

    #[test]
    fn missing_metadata_becomes_null() {
        let record = ResultRecord::from_yaml_str("loss:\n  a: [[1, 2], [0, 1]]\n").unwrap();
        assert!(record.info_text().contains("name: null"));
    }

    #[test]
    fn long_dataset_key_is_accepted() {
        let record = ResultRecord::from_yaml_str(
            "training_dataset: mnist\nloss:\n  a: [[1, 2], [0, 1]]\n",
        )
        .unwrap();
        assert_eq!(record.field("train_dataset"), Some(&Value::from("mnist")));
    }

    #[test]
    fn empty_loss_is_rejected() {
        let err = ResultRecord::from_yaml_str("name: x\nloss: {}\n").unwrap_err();
        assert!(matches!(err, ResultError::NoSeries));
        let err = ResultRecord::from_yaml_str("name: x\n").unwrap_err();
        assert!(matches!(err, ResultError::NoSeries));
    }

    #[test]
    fn malformed_series_is_rejected() {
        let err = ResultRecord::from_yaml_str("loss:\n  a: [[1, 2, 3], [0, 1]]\n").unwrap_err();
        assert!(matches!(err, ResultError::MalformedSeries { .. }));
        let err = ResultRecord::from_yaml_str("loss:\n  a: hello\n").unwrap_err();
        assert!(matches!(err, ResultError::MalformedSeries { .. }));
    }

    #[test]
    fn unknown_series_lookup_fails() {
        let record = ResultRecord::from_yaml_str(SAMPLE).unwrap();
        assert!(matches!(record.get("test"), Err(ResultError::UnknownSeries(_))));
    }

    #[test]
    fn sort_key_splits_from_the_right() {
        assert_eq!(
            sort_key("mnist_conv_net_2021-03-04_1200.yml"),
            (
                "mnist_conv_net".to_string(),
                "2021-03-04".to_string(),
                "1200".to_string()
            )
        );
        assert_eq!(
            sort_key("short.yml"),
            (String::new(), String::new(), "short".to_string())
        );
    }

    #[test]
    fn files_sort_newest_first() {
        let mut files = vec![
            "net_2021-01-01_0900.yml".to_string(),
            "net_2021-03-01_0800.yml".to_string(),
            "net_2021-03-01_1000.yml".to_string(),
            "alpha_2022-01-01_0000.yml".to_string(),
        ];
        sort_files(&mut files);
        assert_eq!(
            files,
            [
                "net_2021-03-01_1000.yml",
                "net_2021-03-01_0800.yml",
                "net_2021-01-01_0900.yml",
                "alpha_2022-01-01_0000.yml",
            ]
        );
    }

    #[test]
    fn labels_fall_back_to_file_and_series() {
        assert_eq!(resolve_label("", "run_a.yml", "train"), "run_a_train");
        assert_eq!(resolve_label(LABEL_PLACEHOLDER, "run_a.yml", "train"), "run_a_train");
        assert_eq!(resolve_label("mine", "run_a.yml", "train"), "mine");
    }

    #[test]
    fn lists_only_result_files() {
        let dir = TempDir::new().unwrap();
        for name in ["a_1_1.yml", "b_1_2.yaml", "notes.txt"] {
            let mut f = fs::File::create(dir.path().join(name)).unwrap();
            writeln!(f, "loss: {{}}").unwrap();
        }
        let files = list_result_files(dir.path()).unwrap();
        assert_eq!(files, ["b_1_2.yaml", "a_1_1.yml"]);
    }
}
