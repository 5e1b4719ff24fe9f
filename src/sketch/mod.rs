//! Batch sketching of sequence files.
//!
//! A sketch is the machine-readable summary an analysis pipeline uses to
//! decide which downstream tools fit a batch of input files: per-file and
//! per-alphabet record counts, lengths, and a coarse ORF signal.

pub mod batch;
pub mod file;

pub use batch::sketch_batch;
pub use file::analyze_file;

use serde::{Deserialize, Serialize};

/// Overall alphabet of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileAlphabet {
    #[serde(rename = "NT")]
    Nt,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "mixed")]
    Mixed,
    #[serde(rename = "empty")]
    Empty,
}

/// Stats for one alphabet's share of a mixed file, including the split
/// output it was written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPartition {
    pub count: usize,
    pub total_length: usize,
    pub output_file: String,
    pub has_orfs: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPartitions {
    #[serde(rename = "NT")]
    pub nt: SplitPartition,
    #[serde(rename = "AA")]
    pub aa: SplitPartition,
}

/// Summary of a single analyzed file. `partitions` is present exactly when
/// the file was alphabet-mixed and split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSketch {
    pub file_path: String,
    pub total_records: usize,
    pub total_length: usize,
    #[serde(rename = "alphabet_type")]
    pub alphabet: FileAlphabet,
    pub has_orfs: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions: Option<SplitPartitions>,
}

/// A captured per-file failure; these collect in the batch summary instead
/// of aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub error: String,
}

/// One file's contribution to an aggregated partition. For split files,
/// `source_file` is the split output and `original_source` the mixed input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContribution {
    pub source_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_source: Option<String>,
    pub record_count: usize,
    pub total_length: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedPartition {
    pub total_records: usize,
    pub total_length: usize,
    pub average_length: f64,
    pub has_orfs: bool,
    pub files: Vec<FileContribution>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Partitions {
    #[serde(rename = "NT")]
    pub nt: AggregatedPartition,
    #[serde(rename = "AA")]
    pub aa: AggregatedPartition,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_input_files: usize,
    pub input_files_list: Vec<String>,
    pub errors: Vec<FileError>,
}

/// The aggregate sketch for a whole input batch; both partitions are always
/// present, possibly zeroed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchSketch {
    pub run_summary: RunSummary,
    pub partitions: Partitions,
}
