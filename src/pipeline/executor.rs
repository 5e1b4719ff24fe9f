use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::stage::Stage;
use crate::pipeline::state::PipelineState;
use crate::sketch::BatchSketch;
use crate::{FabulaError, Result};

/// Analysis plan produced by the configure stage: which downstream analyses
/// to run and against what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub database: String,
    pub evalue: f64,
    pub run_similarity_search: bool,
    pub run_orf_annotation: bool,
    pub run_literature_lookup: bool,
    pub rationale: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            database: "nr".to_string(),
            evalue: 1e-3,
            run_similarity_search: true,
            run_orf_annotation: false,
            run_literature_lookup: false,
            rationale: String::new(),
        }
    }
}

/// One similarity-search match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub subject_id: String,
    pub description: String,
    pub percent_identity: f64,
    pub alignment_length: usize,
    pub evalue: f64,
    pub bit_score: f64,
}

/// The terminal stage's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub headline: String,
    pub body: String,
}

/// What one stage produced. Exactly one variant per stage; applying it to
/// state writes exactly one field.
#[derive(Debug, Clone)]
pub enum StageResult {
    Sketched(BatchSketch),
    Configured(AnalysisConfig),
    Searched(Vec<SearchHit>),
    Reported(Narrative),
}

fn missing(stage: Stage, field: &str) -> FabulaError {
    FabulaError::ResumeContract {
        stage: stage.name().to_string(),
        missing: field.to_string(),
    }
}

/// Dependencies of the configure stage. Built fresh from state right before
/// invocation; required fields only.
#[derive(Debug, Clone)]
pub struct ConfigureDeps {
    pub question: String,
    pub query_file: PathBuf,
    pub preferred_database: String,
    pub fasta_sketch: BatchSketch,
}

impl ConfigureDeps {
    pub fn from_state(state: &PipelineState) -> Result<Self> {
        Ok(Self {
            question: state.options.question.clone(),
            query_file: state.options.query.clone(),
            preferred_database: state.options.database.clone(),
            fasta_sketch: state
                .fasta_sketch
                .clone()
                .ok_or_else(|| missing(Stage::Configure, "fasta_sketch"))?,
        })
    }
}

/// Dependencies of the search stage.
#[derive(Debug, Clone)]
pub struct SearchDeps {
    pub query_file: PathBuf,
    pub fasta_sketch: BatchSketch,
    pub analysis_config: AnalysisConfig,
}

impl SearchDeps {
    pub fn from_state(state: &PipelineState) -> Result<Self> {
        Ok(Self {
            query_file: state.options.query.clone(),
            fasta_sketch: state
                .fasta_sketch
                .clone()
                .ok_or_else(|| missing(Stage::Search, "fasta_sketch"))?,
            analysis_config: state
                .analysis_config
                .clone()
                .ok_or_else(|| missing(Stage::Search, "analysis_config"))?,
        })
    }
}

/// Dependencies of the report stage.
#[derive(Debug, Clone)]
pub struct ReportDeps {
    pub question: String,
    pub analysis_config: AnalysisConfig,
    pub search_results: Vec<SearchHit>,
}

impl ReportDeps {
    pub fn from_state(state: &PipelineState) -> Result<Self> {
        Ok(Self {
            question: state.options.question.clone(),
            analysis_config: state
                .analysis_config
                .clone()
                .ok_or_else(|| missing(Stage::Report, "analysis_config"))?,
            search_results: state
                .search_results
                .clone()
                .ok_or_else(|| missing(Stage::Report, "search_results"))?,
        })
    }
}

/// Configure-stage executor: decides the analysis plan.
#[async_trait]
pub trait ConfigureExecutor: Send + Sync {
    async fn run(&self, deps: ConfigureDeps) -> anyhow::Result<AnalysisConfig>;
}

/// Search-stage executor: produces similarity-search hits.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    async fn run(&self, deps: SearchDeps) -> anyhow::Result<Vec<SearchHit>>;
}

/// Report-stage executor: composes the final narrative.
#[async_trait]
pub trait ReportExecutor: Send + Sync {
    async fn run(&self, deps: ReportDeps) -> anyhow::Result<Narrative>;
}
