//! Line commands for the interactive shell.

use crate::error::{CommandError, EvalError};
use crate::plotter::AddOutcome;
use crate::style::StyleMode;
use crate::workbench::{Workbench, LEGEND_CHOICES};

pub const HELP: &str = "\
Commands:
  files                    list result files, newest first
  open <name|number>       select a result file
  series                   list the series of the selected file
  select <name|number>     select a series
  info                     show the metadata of the selected file
  label [text]             custom curve label (empty for the default)
  add                      add the selected series to the plot
  curves                   list the plotted curves
  clear                    remove every curve
  style simple|fancy       switch the axes style
  title|xlabel|ylabel <t>  set the fancy style texts
  legend <choice>          best, upper right, lower left, bottom, no legend
  infotext on|off          append metadata below saved plots
  format <ext>             svg, png, jpg or bmp
  outfile <name>           output file name without extension
  save [name]              write the plot to the output directory
  quit                     leave the shell";

/// A file or series picked by name or by its 1-based position in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Name(String),
}

impl Target {
    fn parse(arg: &str) -> Self {
        match arg.parse::<usize>() {
            Ok(index) => Target::Index(index),
            Err(_) => Target::Name(arg.to_string()),
        }
    }

    fn resolve<'a>(&'a self, names: &[&'a str]) -> Result<&'a str, CommandError> {
        match self {
            Target::Name(name) => Ok(name),
            Target::Index(index) => names
                .get(index.wrapping_sub(1))
                .copied()
                .ok_or(CommandError::IndexOutOfRange {
                    index: *index,
                    len: names.len(),
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Files,
    Open(Target),
    Series,
    Select(Target),
    Info,
    Label(String),
    Add,
    Curves,
    Clear,
    Style(StyleMode),
    Title(String),
    XLabel(String),
    YLabel(String),
    Legend(String),
    InfoText(bool),
    Format(String),
    Outfile(String),
    Save(Option<String>),
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines give `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let required = |command: &'static str, argument: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingArgument { command, argument })
            } else {
                Ok(rest)
            }
        };

        let command = match word {
            "help" | "?" => Command::Help,
            "files" | "ls" => Command::Files,
            "open" => Command::Open(Target::parse(required("open", "a file")?)),
            "series" => Command::Series,
            "select" => Command::Select(Target::parse(required("select", "a series")?)),
            "info" => Command::Info,
            "label" => Command::Label(rest.to_string()),
            "add" => Command::Add,
            "curves" => Command::Curves,
            "clear" => Command::Clear,
            "style" => {
                let mode = required("style", "simple or fancy")?;
                Command::Style(mode.parse().map_err(|_| CommandError::InvalidArgument {
                    command: "style",
                    value: mode.to_string(),
                })?)
            }
            "title" => Command::Title(rest.to_string()),
            "xlabel" => Command::XLabel(rest.to_string()),
            "ylabel" => Command::YLabel(rest.to_string()),
            "legend" => {
                let choice = required("legend", "a placement")?;
                if !LEGEND_CHOICES.contains(&choice) {
                    return Err(CommandError::InvalidArgument {
                        command: "legend",
                        value: choice.to_string(),
                    });
                }
                Command::Legend(choice.to_string())
            }
            "infotext" => match required("infotext", "on or off")? {
                "on" => Command::InfoText(true),
                "off" => Command::InfoText(false),
                other => {
                    return Err(CommandError::InvalidArgument {
                        command: "infotext",
                        value: other.to_string(),
                    })
                }
            },
            "format" => Command::Format(required("format", "an extension")?.to_string()),
            "outfile" => Command::Outfile(required("outfile", "a file name")?.to_string()),
            "save" => Command::Save((!rest.is_empty()).then(|| rest.to_string())),
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn numbered<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{:>3}  {}", i + 1, item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Workbench {
    /// Runs one command and returns the text to show the user.
    pub fn execute(&mut self, command: Command) -> Result<String, EvalError> {
        let response = match command {
            Command::Help => HELP.to_string(),
            Command::Files => {
                let files = self.refresh_files()?;
                if files.is_empty() {
                    "No result files.".to_string()
                } else {
                    numbered(files)
                }
            }
            Command::Open(target) => {
                let files: Vec<&str> = self.files().iter().map(String::as_str).collect();
                let file = target.resolve(&files)?.to_string();
                let selection = self.select_file(&file)?;
                format!(
                    "Opened {}: {}",
                    selection.file,
                    selection.record.series_names().join(", ")
                )
            }
            Command::Series => {
                let names = self.series_names();
                if names.is_empty() {
                    "No file selected.".to_string()
                } else {
                    numbered(&names)
                }
            }
            Command::Select(target) => {
                let name = {
                    let names = self.series_names();
                    target.resolve(&names)?.to_string()
                };
                let series = self.select_series(&name)?;
                format!("Selected {} ({} samples)", series.name, series.values.len())
            }
            Command::Info => self
                .info_text()
                .unwrap_or_else(|| "No file selected.".to_string()),
            Command::Label(label) => {
                self.set_label(&label);
                if label.is_empty() {
                    "Label reset to file and series name.".to_string()
                } else {
                    format!("Label set to {}", label)
                }
            }
            Command::Add => match self.add_selected()? {
                (label, AddOutcome::Added { marker, stride }) => {
                    format!("Added {} (marker {}, every {} samples)", label, marker, stride)
                }
                (label, AddOutcome::DuplicateLabel) => format!("Label already added: {}", label),
            },
            Command::Curves => {
                let curves: Vec<String> = self
                    .plot()
                    .curves()
                    .iter()
                    .map(|c| format!("{} {}", c.marker, c.label))
                    .collect();
                if curves.is_empty() {
                    "The plot is empty.".to_string()
                } else {
                    numbered(&curves)
                }
            }
            Command::Clear => {
                self.clear();
                "Plot cleared.".to_string()
            }
            Command::Style(mode) => {
                self.set_simple(mode == StyleMode::Simple)?;
                format!("Style {}", mode)
            }
            Command::Title(text) => {
                self.set_title(&text)?;
                format!("Title: {}", text)
            }
            Command::XLabel(text) => {
                self.set_xlabel(&text)?;
                format!("x label: {}", text)
            }
            Command::YLabel(text) => {
                self.set_ylabel(&text)?;
                format!("y label: {}", text)
            }
            Command::Legend(choice) => {
                self.set_legend_choice(&choice)?;
                format!("Legend: {}", choice)
            }
            Command::InfoText(on) => {
                self.set_info_text(on);
                format!("Info text {}", if on { "on" } else { "off" })
            }
            Command::Format(format) => {
                self.set_format(&format)?;
                format!("Format: {}", self.settings().format)
            }
            Command::Outfile(name) => {
                self.set_outfile(&name);
                format!("Output file: {}", name)
            }
            Command::Save(name) => {
                if let Some(name) = name {
                    self.set_outfile(&name);
                }
                let path = self.save()?;
                format!("Saved to {}", path.display())
            }
            Command::Quit => "Bye.".to_string(),
        };
        Ok(response)
    }
}
