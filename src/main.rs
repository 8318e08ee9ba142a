use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use losseval::catalog;
use losseval::commands::Command;
use losseval::config::EvalConfig;
use losseval::synthetic;
use losseval::Workbench;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Compare loss curves from experiment result files")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Interactive plotting shell over a directory of result files
    Shell(ShellArgs),
    /// Summarise every result file in a directory
    List {
        #[arg(long, default_value = "results")]
        input: PathBuf,
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    /// Write synthetic result files to try the tool with
    Demo {
        #[arg(long, default_value = "results")]
        output: PathBuf,
        #[arg(long, default_value_t = 6)]
        count: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Args)]
struct ShellArgs {
    #[arg(long, default_value = "results")]
    input: PathBuf,
    #[arg(long, default_value = "plots")]
    output: PathBuf,
    /// Load tool settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start in the simple style
    #[arg(long, default_value_t = false)]
    simple: bool,
    /// Output format (svg, png, jpg, bmp)
    #[arg(long)]
    format: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Mode::Shell(args) => run_shell(args),
        Mode::List { input, quiet } => list(input, quiet),
        Mode::Demo {
            output,
            count,
            seed,
        } => {
            let written = synthetic::write_samples(&output, count, seed)
                .with_context(|| format!("writing samples to {}", output.display()))?;
            for path in &written {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}

fn list(input: PathBuf, quiet: bool) -> anyhow::Result<()> {
    let entries = catalog::scan(&input, !quiet)
        .with_context(|| format!("scanning {}", input.display()))?;

    println!("\nResult files in {}:", input.display());
    println!("{:-<72}", "");
    for entry in &entries {
        match &entry.summary {
            Ok(summary) => println!(
                "{:<40} {:<14} {} ({} samples)",
                entry.file,
                summary.name.as_deref().unwrap_or("-"),
                summary.series.join(", "),
                summary.samples
            ),
            Err(err) => println!("{:<40} unreadable: {}", entry.file, err),
        }
    }
    Ok(())
}

fn run_shell(args: ShellArgs) -> anyhow::Result<()> {
    let mut settings = match &args.config {
        Some(path) => EvalConfig::load(path)?,
        None => EvalConfig::default(),
    };
    if args.simple {
        settings.simple = true;
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    settings
        .export_format()
        .context("checking the output format")?;

    let mut workbench = Workbench::open(&args.input, &args.output, settings)
        .with_context(|| format!("opening {}", args.input.display()))?;

    println!(
        "{} result files in {}, plots go to {}. Type 'help' for commands.",
        workbench.files().len(),
        args.input.display(),
        args.output.display()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        stdout.flush().context("flushing prompt")?;
        let line = match lines.next() {
            Some(line) => line.context("reading command")?,
            None => break,
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };
        let quit = command == Command::Quit;
        match workbench.execute(command) {
            Ok(response) => println!("{}", response),
            Err(err) => println!("Error: {}", err),
        }
        if quit {
            break;
        }
    }
    Ok(())
}
