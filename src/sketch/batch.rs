use std::path::PathBuf;

use rayon::prelude::*;
use tracing::debug;

use crate::sketch::file::analyze_file;
use crate::sketch::{
    AggregatedPartition, BatchSketch, FileAlphabet, FileContribution, FileError, FileSketch,
    Partitions, RunSummary,
};

/// Sketch a batch of sequence files into NT and AA aggregates.
///
/// Files are analyzed on the rayon pool; contributions fold in input order,
/// so the `files` lists are deterministic regardless of completion order.
/// Per-file failures collect into `run_summary.errors` and never abort the
/// batch.
pub fn sketch_batch(paths: &[PathBuf]) -> BatchSketch {
    let results: Vec<Result<FileSketch, FileError>> =
        paths.par_iter().map(|path| analyze_file(path)).collect();

    let mut nt = AggregatedPartition::default();
    let mut aa = AggregatedPartition::default();
    let mut errors = Vec::new();

    for result in results {
        let sketch = match result {
            Ok(sketch) => sketch,
            Err(e) => {
                debug!(error = %e.error, "skipping file");
                errors.push(e);
                continue;
            }
        };

        match sketch.alphabet {
            FileAlphabet::Nt => accumulate(&mut nt, &sketch),
            FileAlphabet::Aa => accumulate(&mut aa, &sketch),
            FileAlphabet::Mixed => {
                // Each split partition joins its own aggregate, keeping a
                // pointer back to the mixed input it came from.
                if let Some(parts) = &sketch.partitions {
                    for (agg, split) in [(&mut nt, &parts.nt), (&mut aa, &parts.aa)] {
                        agg.total_records += split.count;
                        agg.total_length += split.total_length;
                        agg.has_orfs |= split.has_orfs;
                        agg.files.push(FileContribution {
                            source_file: split.output_file.clone(),
                            original_source: Some(sketch.file_path.clone()),
                            record_count: split.count,
                            total_length: split.total_length,
                        });
                    }
                }
            }
            FileAlphabet::Empty => {
                // Empty is not an error; it just contributes nothing.
            }
        }
    }

    nt.average_length = average_length(nt.total_length, nt.total_records);
    aa.average_length = average_length(aa.total_length, aa.total_records);

    BatchSketch {
        run_summary: RunSummary {
            total_input_files: paths.len(),
            input_files_list: paths.iter().map(|p| p.display().to_string()).collect(),
            errors,
        },
        partitions: Partitions { nt, aa },
    }
}

fn accumulate(agg: &mut AggregatedPartition, sketch: &FileSketch) {
    agg.total_records += sketch.total_records;
    agg.total_length += sketch.total_length;
    agg.has_orfs |= sketch.has_orfs;
    agg.files.push(FileContribution {
        source_file: sketch.file_path.clone(),
        original_source: None,
        record_count: sketch.total_records,
        total_length: sketch.total_length,
    });
}

/// A single division rounded to two decimals; 0.0 for an empty partition.
fn average_length(total_length: usize, total_records: usize) -> f64 {
    if total_records == 0 {
        return 0.0;
    }
    (total_length as f64 / total_records as f64 * 100.0).round() / 100.0
}
