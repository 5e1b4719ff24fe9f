use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A pipeline stage. The sequence is fixed and linear; `next()` is the
/// whole transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Sketch,
    Configure,
    Search,
    Report,
}

/// The state fields stages read and write; used to express stage
/// prerequisites for resume validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateField {
    FastaSketch,
    AnalysisConfig,
    SearchResults,
    Narrative,
}

impl StateField {
    pub fn name(self) -> &'static str {
        match self {
            StateField::FastaSketch => "fasta_sketch",
            StateField::AnalysisConfig => "analysis_config",
            StateField::SearchResults => "search_results",
            StateField::Narrative => "narrative",
        }
    }
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [Stage::Sketch, Stage::Configure, Stage::Search, Stage::Report];

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Sketch => Some(Stage::Configure),
            Stage::Configure => Some(Stage::Search),
            Stage::Search => Some(Stage::Report),
            Stage::Report => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Sketch => "sketch",
            Stage::Configure => "configure",
            Stage::Search => "search",
            Stage::Report => "report",
        }
    }

    /// State fields that must already be populated before this stage runs.
    pub fn prerequisites(self) -> &'static [StateField] {
        match self {
            Stage::Sketch => &[],
            Stage::Configure => &[StateField::FastaSketch],
            Stage::Search => &[StateField::FastaSketch, StateField::AnalysisConfig],
            Stage::Report => &[StateField::AnalysisConfig, StateField::SearchResults],
        }
    }

    /// The field this stage writes.
    pub fn writes(self) -> StateField {
        match self {
            Stage::Sketch => StateField::FastaSketch,
            Stage::Configure => StateField::AnalysisConfig,
            Stage::Search => StateField::SearchResults,
            Stage::Report => StateField::Narrative,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = crate::FabulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sketch" => Ok(Stage::Sketch),
            "configure" | "config" => Ok(Stage::Configure),
            "search" => Ok(Stage::Search),
            "report" => Ok(Stage::Report),
            _ => Err(crate::FabulaError::InvalidStage(s.to_string())),
        }
    }
}
