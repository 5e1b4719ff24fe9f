use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::cli::commands::{build_executors, resolve_pipeline_options, LlmArgs};
use crate::core::config::load_or_default;
use crate::core::paths::{config_path, default_state_dir};
use crate::pipeline::runner::Pipeline;
use crate::pipeline::state::CheckpointStore;
use crate::pipeline::Stage;

#[derive(Args)]
pub struct StageArgs {
    /// Stage to run: sketch, configure, search, or report
    #[arg(value_name = "STAGE")]
    pub stage: String,

    /// Query FASTA file
    #[arg(short, long, value_name = "FILE")]
    pub query: PathBuf,

    /// Question guiding the analysis
    #[arg(long, default_value = "")]
    pub question: String,

    /// Similarity-search database (overrides config file)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Directory holding pipeline checkpoints
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

pub fn run(args: StageArgs) -> anyhow::Result<()> {
    let stage: Stage = args.stage.parse()?;

    let config = load_or_default(config_path());
    let options = resolve_pipeline_options(
        &config,
        &args.llm,
        args.query.clone(),
        args.question.clone(),
        args.database.clone(),
    );

    let state_dir = args.state_dir.clone().unwrap_or_else(default_state_dir);
    let store = CheckpointStore::new(&state_dir)?;

    let mut state = store
        .load_latest_before(stage)?
        .map(|(_, state)| state)
        .unwrap_or_default();
    state.options = options;

    let pipeline = Pipeline::new(build_executors(&state.options.llm)?).with_checkpoints(store);

    let runtime = tokio::runtime::Runtime::new()?;
    let state = runtime.block_on(pipeline.run_single(state, stage))?;

    println!(
        "{} stage '{}' complete; checkpoint written to {}",
        "✓".green().bold(),
        stage,
        state_dir.join(format!("{}.json", stage.name())).display()
    );

    if let Some(narrative) = &state.narrative {
        println!("\n{}", narrative.headline.bold());
        println!("\n{}", narrative.body);
    }

    Ok(())
}
