use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::sketch::sketch_batch;

#[derive(Args)]
pub struct SketchArgs {
    /// Input FASTA files (mixed-alphabet files are split in place)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Write the sketch JSON to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: SketchArgs) -> anyhow::Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Sketching {} file(s)...", args.files.len()));

    let sketch = sketch_batch(&args.files);

    pb.finish_with_message(format!(
        "Sketched {} file(s): {} NT records, {} AA records, {} error(s)",
        args.files.len(),
        sketch.partitions.nt.total_records,
        sketch.partitions.aa.total_records,
        sketch.run_summary.errors.len(),
    ));

    let json = serde_json::to_string_pretty(&sketch)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{}", json),
    }

    Ok(())
}
