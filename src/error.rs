use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the plot session and the renderer.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    #[error("Unknown legend location: {0}")]
    UnknownLegendLocation(String),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Invalid series '{label}': {reason}")]
    InvalidSeries { label: String, reason: String },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading result files.
#[derive(Debug, Error)]
pub enum ResultError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No loss data in file.")]
    NoSeries,

    #[error("Malformed series '{name}': {reason}")]
    MalformedSeries { name: String, reason: String },

    #[error("Unknown series: {0}")]
    UnknownSeries(String),

    #[error("No result file selected.")]
    NothingSelected,

    #[error("No series selected.")]
    NoSeriesSelected,
}

/// Shell input that does not form a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error("No entry {index}, there are {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Anything a workbench action can fail with.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Plot(#[from] PlotError),

    #[error(transparent)]
    Result(#[from] ResultError),

    #[error(transparent)]
    Command(#[from] CommandError),
}
