use crate::error::ResultError;
use crate::results::{list_result_files, ResultRecord};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_yaml::Value;
use std::path::Path;

/// Summary of one result file in a directory listing.
#[derive(Debug)]
pub struct CatalogEntry {
    pub file: String,
    pub summary: Result<FileSummary, ResultError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub name: Option<String>,
    pub series: Vec<String>,
    pub samples: usize,
}

impl FileSummary {
    fn from_record(record: &ResultRecord) -> Self {
        let name = record.field("name").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => serde_yaml::to_string(other).ok().map(|s| s.trim().to_string()),
        });
        Self {
            name,
            series: record.series_names().iter().map(|s| s.to_string()).collect(),
            samples: record.series().iter().map(|s| s.values.len()).max().unwrap_or(0),
        }
    }
}

/// Parses every result file in `dir` in parallel; entries keep the
/// newest-first file order.
pub fn scan<P: AsRef<Path>>(dir: P, show_progress: bool) -> Result<Vec<CatalogEntry>, ResultError> {
    let dir = dir.as_ref();
    let files = list_result_files(dir)?;

    let progress_bar = if show_progress {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("Progress bar template error")
                .progress_chars("##-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let entries: Vec<CatalogEntry> = files
        .into_par_iter()
        .map(|file| {
            let summary = ResultRecord::load(dir.join(&file)).map(|r| FileSummary::from_record(&r));
            progress_bar.inc(1);
            CatalogEntry { file, summary }
        })
        .collect();

    progress_bar.finish_with_message("scanned");
    Ok(entries)
}
