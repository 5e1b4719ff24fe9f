pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fabula",
    version,
    about = "Batch FASTA sketching and LLM-driven sequence narrative analysis",
    long_about = "Fabula sketches batches of sequence files into per-alphabet statistics, \
                  then drives a resumable analysis pipeline whose configuration, \
                  similarity-search, and reporting stages are performed by an external \
                  LLM service."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the default configuration file
    Init(commands::init::InitArgs),

    /// Sketch a batch of FASTA files and print the JSON summary
    Sketch(commands::sketch::SketchArgs),

    /// Run the full analysis pipeline, optionally resuming from a checkpoint
    Run(commands::run::RunArgs),

    /// Run a single pipeline stage against checkpointed state
    Stage(commands::stage::StageArgs),
}
