use anyhow::Result;
use async_trait::async_trait;

use crate::agent::LlmClient;
use crate::pipeline::executor::{AnalysisConfig, ConfigureDeps, ConfigureExecutor};
use crate::pipeline::state::LlmOptions;

const INSTRUCTIONS: &str = "\
You are the configuration step of a sequence analysis pipeline. Given the \
user's question and a statistical sketch of their sequence batch, decide \
which analyses to run. Consider the alphabet partitions, record counts, \
average lengths, and whether significant open reading frames were found. \
Keep the preferred database unless the sketch clearly calls for another.

Reply with a single JSON object with exactly these fields:
  database (string): similarity-search database to use, e.g. \"nr\" or \"nt\"
  evalue (number): e-value threshold for the search
  run_similarity_search (boolean)
  run_orf_annotation (boolean)
  run_literature_lookup (boolean)
  rationale (string): one or two sentences on why";

/// Configure-stage executor backed by the LLM service.
pub struct LlmConfigureExecutor {
    client: LlmClient,
}

impl LlmConfigureExecutor {
    pub fn new(options: LlmOptions) -> Result<Self> {
        Ok(Self {
            client: LlmClient::new(options)?,
        })
    }

    pub fn with_client(client: LlmClient) -> Self {
        Self { client }
    }
}

fn build_context(deps: &ConfigureDeps) -> Result<String> {
    Ok(format!(
        "Question: {}\nQuery file: {}\nPreferred database: {}\n\nBatch sketch:\n{}",
        deps.question,
        deps.query_file.display(),
        deps.preferred_database,
        serde_json::to_string_pretty(&deps.fasta_sketch)?,
    ))
}

#[async_trait]
impl ConfigureExecutor for LlmConfigureExecutor {
    async fn run(&self, deps: ConfigureDeps) -> Result<AnalysisConfig> {
        let context = build_context(&deps)?;
        self.client.complete_json(INSTRUCTIONS, &context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::BatchSketch;
    use std::path::PathBuf;

    #[test]
    fn test_context_carries_question_and_sketch() {
        let deps = ConfigureDeps {
            question: "Is this a viral genome?".to_string(),
            query_file: PathBuf::from("query.fasta"),
            preferred_database: "nt".to_string(),
            fasta_sketch: BatchSketch::default(),
        };

        let context = build_context(&deps).unwrap();
        assert!(context.contains("Is this a viral genome?"));
        assert!(context.contains("query.fasta"));
        assert!(context.contains("Preferred database: nt"));
        assert!(context.contains("run_summary"));
    }
}
