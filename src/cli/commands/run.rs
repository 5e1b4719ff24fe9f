use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::cli::commands::{build_executors, resolve_pipeline_options, LlmArgs};
use crate::core::config::load_or_default;
use crate::core::paths::{config_path, default_state_dir};
use crate::pipeline::runner::Pipeline;
use crate::pipeline::state::{CheckpointStore, PipelineOptions};
use crate::pipeline::Stage;

#[derive(Args)]
pub struct RunArgs {
    /// Query FASTA file
    #[arg(short, long, value_name = "FILE")]
    pub query: PathBuf,

    /// Question guiding the analysis
    #[arg(long, default_value = "")]
    pub question: String,

    /// Similarity-search database (overrides config file)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Directory for pipeline checkpoints (enables resume)
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Resume from this stage using checkpoints in the state directory
    #[arg(long, value_name = "STAGE")]
    pub from: Option<String>,

    #[command(flatten)]
    pub llm: LlmArgs,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_or_default(config_path());
    let options = resolve_pipeline_options(
        &config,
        &args.llm,
        args.query.clone(),
        args.question.clone(),
        args.database.clone(),
    );

    let from = args
        .from
        .as_deref()
        .map(|s| s.parse::<Stage>())
        .transpose()?;

    // Resuming needs somewhere to read checkpoints from
    let state_dir = match (&args.state_dir, &from) {
        (Some(dir), _) => Some(dir.clone()),
        (None, Some(_)) => Some(default_state_dir()),
        (None, None) => None,
    };

    print_run_table(&options, state_dir.as_deref());

    let mut pipeline = Pipeline::new(build_executors(&options.llm)?);
    if let Some(dir) = &state_dir {
        pipeline = pipeline.with_checkpoints(CheckpointStore::new(dir)?);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let state = runtime.block_on(async {
        match from {
            Some(stage) => pipeline.resume(options, stage).await,
            None => pipeline.run(options).await,
        }
    })?;

    if let Some(narrative) = &state.narrative {
        println!("\n{}", narrative.headline.bold());
        println!("\n{}", narrative.body);
    }

    Ok(())
}

fn print_run_table(options: &PipelineOptions, state_dir: Option<&std::path::Path>) {
    use comfy_table::modifiers::UTF8_ROUND_CORNERS;
    use comfy_table::presets::UTF8_FULL;
    use comfy_table::{Cell, ContentArrangement, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Parameter", "Value"]);

    let api_key = if options.llm.api_key.is_some() {
        "***"
    } else {
        "not set"
    };

    table
        .add_row(vec![Cell::new("Config File"), Cell::new(config_path().display())])
        .add_row(vec![Cell::new("Query"), Cell::new(options.query.display())])
        .add_row(vec![Cell::new("Question"), Cell::new(&options.question)])
        .add_row(vec![Cell::new("Database"), Cell::new(&options.database)])
        .add_row(vec![Cell::new("LLM API URL"), Cell::new(&options.llm.api_url)])
        .add_row(vec![Cell::new("LLM Model"), Cell::new(&options.llm.model)])
        .add_row(vec![Cell::new("LLM API Key"), Cell::new(api_key)])
        .add_row(vec![
            Cell::new("State Dir"),
            Cell::new(
                state_dir
                    .map(|d| d.display().to_string())
                    .unwrap_or_else(|| "disabled".to_string()),
            ),
        ]);

    println!("{}", table);
}
