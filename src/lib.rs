//! Loss curve evaluation: compare training curves from several result
//! files on one publication-quality figure.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod layout;
pub mod markers;
pub mod plotter;
pub mod render;
pub mod results;
pub mod style;
pub mod synthetic;
pub mod workbench;

pub use error::{CommandError, EvalError, PlotError, ResultError};
pub use plotter::{AddOutcome, Curve, PlotSession};
pub use render::ExportFormat;
pub use workbench::Workbench;
