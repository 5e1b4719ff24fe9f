use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::executor::{AnalysisConfig, Narrative, SearchHit, StageResult};
use crate::pipeline::stage::{Stage, StateField};
use crate::sketch::BatchSketch;
use crate::{FabulaError, Result};

/// Connection settings for the LLM service backing the stage executors.
/// Explicit fields with validated defaults; nothing is read from or written
/// to the process environment.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmOptions {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub max_retries: u32,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            api_key: None,
            max_tokens: 2000,
            max_retries: 3,
        }
    }
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineOptions {
    pub query: PathBuf,
    pub question: String,
    pub database: String,
    pub llm: LlmOptions,
}

/// The single mutable record threaded through all stages. Each stage writes
/// exactly one field and never overwrites a field an earlier stage wrote.
/// `options` is supplied fresh on every run and excluded from checkpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    #[serde(skip)]
    pub options: PipelineOptions,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fasta_sketch: Option<BatchSketch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_config: Option<AnalysisConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchHit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Narrative>,
}

impl PipelineState {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn has(&self, field: StateField) -> bool {
        match field {
            StateField::FastaSketch => self.fasta_sketch.is_some(),
            StateField::AnalysisConfig => self.analysis_config.is_some(),
            StateField::SearchResults => self.search_results.is_some(),
            StateField::Narrative => self.narrative.is_some(),
        }
    }

    /// Write a stage's result into its one field.
    pub fn apply(&mut self, result: StageResult) {
        match result {
            StageResult::Sketched(sketch) => self.fasta_sketch = Some(sketch),
            StageResult::Configured(config) => self.analysis_config = Some(config),
            StageResult::Searched(hits) => self.search_results = Some(hits),
            StageResult::Reported(narrative) => self.narrative = Some(narrative),
        }
    }

    /// Fail fast when a stage's prerequisite fields are absent.
    pub fn check_prerequisites(&self, stage: Stage) -> Result<()> {
        for field in stage.prerequisites() {
            if !self.has(*field) {
                return Err(FabulaError::ResumeContract {
                    stage: stage.name().to_string(),
                    missing: field.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// One persisted checkpoint: the full state after a stage completed, plus
/// enough envelope to identify it.
#[derive(Debug, Serialize, Deserialize)]
struct Checkpoint {
    stage: Stage,
    written_at: DateTime<Utc>,
    state_file_path: String,
    #[serde(flatten)]
    state: PipelineState,
}

/// Log-structured checkpoint storage: one JSON document per stage under a
/// caller-supplied directory.
#[derive(Clone)]
pub struct CheckpointStore {
    state_dir: PathBuf,
}

impl CheckpointStore {
    pub fn new<P: AsRef<Path>>(state_dir: P) -> Result<Self> {
        let state_dir = state_dir.as_ref().to_path_buf();
        fs::create_dir_all(&state_dir)?;
        Ok(Self { state_dir })
    }

    fn checkpoint_path(&self, stage: Stage) -> PathBuf {
        self.state_dir.join(format!("{}.json", stage.name()))
    }

    /// Persist the state as the named stage's checkpoint.
    pub fn save(&self, stage: Stage, state: &PipelineState) -> Result<()> {
        let path = self.checkpoint_path(stage);
        let checkpoint = Checkpoint {
            stage,
            written_at: Utc::now(),
            state_file_path: path.display().to_string(),
            state: state.clone(),
        };
        let content = serde_json::to_string_pretty(&checkpoint)
            .map_err(|e| FabulaError::Other(format!("Failed to serialize checkpoint: {}", e)))?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Load the named stage's checkpoint, if present.
    pub fn load(&self, stage: Stage) -> Result<Option<PipelineState>> {
        let path = self.checkpoint_path(stage);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let checkpoint: Checkpoint = serde_json::from_str(&content).map_err(|e| {
            FabulaError::Parse(format!(
                "Malformed checkpoint {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Some(checkpoint.state))
    }

    /// Load the newest checkpoint written by any stage preceding `stage`
    /// in execution order.
    pub fn load_latest_before(&self, stage: Stage) -> Result<Option<(Stage, PipelineState)>> {
        let mut latest = None;
        for candidate in Stage::ALL {
            if candidate == stage {
                break;
            }
            if let Some(state) = self.load(candidate)? {
                latest = Some((candidate, state));
            }
        }
        Ok(latest)
    }
}
