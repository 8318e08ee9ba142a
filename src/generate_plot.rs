use anyhow::Context;
use clap::Parser;
use losseval::config::PlotScript;
use losseval::results::LABEL_PLACEHOLDER;
use losseval::{AddOutcome, Workbench};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Render a loss plot described in a YAML script")]
struct Args {
    /// Plot script with `settings` and `curves`
    script: PathBuf,
    #[arg(long, default_value = "results")]
    input: PathBuf,
    #[arg(long, default_value = "plots")]
    output: PathBuf,
    /// Overrides the output file name of the script
    #[arg(long)]
    outfile: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let script = PlotScript::load(&args.script)?;
    let legend = script.settings.legend.clone();
    let mut workbench = Workbench::open(&args.input, &args.output, script.settings)
        .with_context(|| format!("opening {}", args.input.display()))?;
    if let Some(outfile) = &args.outfile {
        workbench.set_outfile(outfile);
    }

    println!("Rendering {} curve(s) from {}...", script.curves.len(), args.script.display());
    for curve in &script.curves {
        workbench
            .select_file(&curve.file)
            .with_context(|| format!("selecting {}", curve.file))?;
        workbench
            .select_series(&curve.series)
            .with_context(|| format!("selecting series {} of {}", curve.series, curve.file))?;
        workbench.set_label(curve.label.as_deref().unwrap_or(LABEL_PLACEHOLDER));

        match workbench.add_selected()? {
            (label, AddOutcome::Added { marker, stride }) => {
                println!("  {} (marker {}, every {} samples)", label, marker, stride)
            }
            (label, AddOutcome::DuplicateLabel) => println!("  {} skipped, label already added", label),
        }
    }
    workbench
        .set_legend_choice(&legend)
        .with_context(|| format!("applying legend {}", legend))?;

    let path = workbench.save().context("saving plot")?;
    println!("Plot written to {}", path.display());
    Ok(())
}
