pub mod init;
pub mod run;
pub mod sketch;
pub mod stage;

use clap::Args;

use crate::agent::{LlmClient, LlmConfigureExecutor, LlmReportExecutor, LlmSearchExecutor};
use crate::core::config::Config;
use crate::pipeline::runner::Executors;
use crate::pipeline::state::{LlmOptions, PipelineOptions};
use std::path::PathBuf;

/// LLM connection overrides shared by the pipeline commands.
/// Command-line values win over the configuration file, field by field.
#[derive(Args, Debug)]
pub struct LlmArgs {
    /// LLM API endpoint URL (overrides config file)
    #[arg(long)]
    pub llm_api_url: Option<String>,

    /// LLM model to use (overrides config file)
    #[arg(long)]
    pub llm_model: Option<String>,

    /// API key for the LLM service (overrides config file)
    #[arg(long)]
    pub llm_api_key: Option<String>,
}

pub(crate) fn resolve_llm_options(config: &Config, args: &LlmArgs) -> LlmOptions {
    let mut options = config.llm_options();
    if let Some(url) = &args.llm_api_url {
        options.api_url = url.clone();
    }
    if let Some(model) = &args.llm_model {
        options.model = model.clone();
    }
    if let Some(key) = &args.llm_api_key {
        options.api_key = Some(key.clone());
    }
    options
}

pub(crate) fn resolve_pipeline_options(
    config: &Config,
    llm_args: &LlmArgs,
    query: PathBuf,
    question: String,
    database: Option<String>,
) -> PipelineOptions {
    PipelineOptions {
        query,
        question,
        database: database.unwrap_or_else(|| config.search.database.clone()),
        llm: resolve_llm_options(config, llm_args),
    }
}

pub(crate) fn build_executors(options: &LlmOptions) -> anyhow::Result<Executors> {
    let client = LlmClient::new(options.clone())?;
    Ok(Executors {
        configure: Box::new(LlmConfigureExecutor::with_client(client.clone())),
        search: Box::new(LlmSearchExecutor::with_client(client.clone())),
        report: Box::new(LlmReportExecutor::with_client(client)),
    })
}
