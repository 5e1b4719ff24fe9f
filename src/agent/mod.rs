//! LLM-backed stage executors.
//!
//! Each executor sends per-stage instructions plus a context block derived
//! from its dependency record to an OpenAI-style chat-completions endpoint
//! and parses the reply into the stage's typed output.

pub mod configure;
pub mod report;
pub mod search;

pub use configure::LlmConfigureExecutor;
pub use report::LlmReportExecutor;
pub use search::LlmSearchExecutor;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use crate::pipeline::state::LlmOptions;

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Thin chat-completions client shared by the concrete executors.
///
/// Retries rate limits (429) and server errors (5xx) with exponential
/// backoff up to `max_retries`; other HTTP errors fail immediately.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    options: LlmOptions,
}

impl LlmClient {
    pub fn new(options: LlmOptions) -> Result<Self> {
        if options.api_url.is_empty() {
            bail!("LLM API URL must not be empty");
        }
        if options.model.is_empty() {
            bail!("LLM model name must not be empty");
        }

        let client = Client::builder()
            .user_agent(concat!("fabula/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, options })
    }

    /// Run one completion and parse the reply content as JSON into `T`.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        instructions: &str,
        context: &str,
    ) -> Result<T> {
        let url = format!(
            "{}/chat/completions",
            self.options.api_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.options.model,
            "max_tokens": self.options.max_tokens,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": instructions },
                { "role": "user", "content": context },
            ],
        });

        let mut attempt: u32 = 0;
        loop {
            let mut request = self.client.post(&url).json(&body);
            if let Some(key) = &self.options.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let reply: ChatResponse = response
                            .json()
                            .await
                            .context("Malformed completion response")?;
                        let content = reply
                            .choices
                            .into_iter()
                            .next()
                            .map(|c| c.message.content)
                            .ok_or_else(|| anyhow!("Empty completion response"))?;
                        return parse_reply(&content);
                    }

                    // Only rate limits and server errors are worth retrying
                    if status.as_u16() != 429 && !status.is_server_error() {
                        let detail = response.text().await.unwrap_or_default();
                        bail!("LLM API error {}: {}", status, detail);
                    }
                    warn!(%status, attempt, "LLM request throttled or failed, retrying");
                }
                Err(e) => {
                    warn!(error = %e, attempt, "LLM request error, retrying");
                }
            }

            attempt += 1;
            if attempt > self.options.max_retries {
                bail!(
                    "LLM request failed after {} retries",
                    self.options.max_retries
                );
            }
            tokio::time::sleep(Duration::from_secs(1 << attempt.min(5))).await;
        }
    }
}

/// Parse a model reply as JSON, tolerating markdown code fences.
fn parse_reply<T: DeserializeOwned>(content: &str) -> Result<T> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim())
        .with_context(|| format!("Reply was not valid JSON: {}", content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::executor::AnalysisConfig;

    #[test]
    fn test_parse_reply_plain_json() {
        let config: AnalysisConfig = parse_reply(
            r#"{"database":"nr","evalue":0.001,"run_similarity_search":true,
                "run_orf_annotation":false,"run_literature_lookup":false,
                "rationale":"nucleotide batch with long ORFs"}"#,
        )
        .unwrap();
        assert_eq!(config.database, "nr");
        assert!(config.run_similarity_search);
    }

    #[test]
    fn test_parse_reply_fenced_json() {
        let value: serde_json::Value = parse_reply("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_reply_rejects_prose() {
        assert!(parse_reply::<serde_json::Value>("I could not comply").is_err());
    }

    #[test]
    fn test_client_rejects_blank_endpoint() {
        let options = LlmOptions {
            api_url: String::new(),
            ..Default::default()
        };
        assert!(LlmClient::new(options).is_err());
    }
}
