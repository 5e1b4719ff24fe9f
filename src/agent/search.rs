use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::agent::LlmClient;
use crate::pipeline::executor::{SearchDeps, SearchExecutor, SearchHit};
use crate::pipeline::state::LlmOptions;

const INSTRUCTIONS: &str = "\
You are the similarity-search step of a sequence analysis pipeline. Run a \
search for the query sequences against the configured database using the \
tools available to you, then filter and rank the matches by biological \
significance: e-value, percent identity, coverage, and the relevance of \
each subject to the query.

Reply with a single JSON object of the form:
  {\"hits\": [{\"subject_id\": string, \"description\": string,
    \"percent_identity\": number, \"alignment_length\": integer,
    \"evalue\": number, \"bit_score\": number}, ...]}
Order hits from most to least significant.";

#[derive(Deserialize)]
struct SearchReply {
    hits: Vec<SearchHit>,
}

/// Search-stage executor backed by the LLM service and its search tooling.
pub struct LlmSearchExecutor {
    client: LlmClient,
}

impl LlmSearchExecutor {
    pub fn new(options: LlmOptions) -> Result<Self> {
        Ok(Self {
            client: LlmClient::new(options)?,
        })
    }

    pub fn with_client(client: LlmClient) -> Self {
        Self { client }
    }
}

fn build_context(deps: &SearchDeps) -> Result<String> {
    Ok(format!(
        "Query file: {}\nDatabase: {}\nE-value threshold: {}\n\nBatch sketch:\n{}",
        deps.query_file.display(),
        deps.analysis_config.database,
        deps.analysis_config.evalue,
        serde_json::to_string_pretty(&deps.fasta_sketch)?,
    ))
}

#[async_trait]
impl SearchExecutor for LlmSearchExecutor {
    async fn run(&self, deps: SearchDeps) -> Result<Vec<SearchHit>> {
        let context = build_context(&deps)?;
        let reply: SearchReply = self.client.complete_json(INSTRUCTIONS, &context).await?;
        Ok(reply.hits)
    }
}
