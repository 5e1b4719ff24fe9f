use anyhow::Result;
use async_trait::async_trait;

use crate::agent::LlmClient;
use crate::pipeline::executor::{Narrative, ReportDeps, ReportExecutor};
use crate::pipeline::state::LlmOptions;

const INSTRUCTIONS: &str = "\
You are the reporting step of a sequence analysis pipeline. Compose a \
scientifically accurate narrative answering the user's question from the \
similarity-search results and the analysis configuration. Ground every \
claim in the hits provided; say so plainly when the evidence is weak or \
the search returned nothing relevant.

Reply with a single JSON object with exactly these fields:
  headline (string): a one-line answer
  body (string): the full narrative, a few paragraphs at most";

/// Report-stage executor backed by the LLM service.
pub struct LlmReportExecutor {
    client: LlmClient,
}

impl LlmReportExecutor {
    pub fn new(options: LlmOptions) -> Result<Self> {
        Ok(Self {
            client: LlmClient::new(options)?,
        })
    }

    pub fn with_client(client: LlmClient) -> Self {
        Self { client }
    }
}

fn build_context(deps: &ReportDeps) -> Result<String> {
    Ok(format!(
        "Question: {}\n\nAnalysis configuration:\n{}\n\nSearch results ({} hits):\n{}",
        deps.question,
        serde_json::to_string_pretty(&deps.analysis_config)?,
        deps.search_results.len(),
        serde_json::to_string_pretty(&deps.search_results)?,
    ))
}

#[async_trait]
impl ReportExecutor for LlmReportExecutor {
    async fn run(&self, deps: ReportDeps) -> Result<Narrative> {
        let context = build_context(&deps)?;
        self.client.complete_json(INSTRUCTIONS, &context).await
    }
}
