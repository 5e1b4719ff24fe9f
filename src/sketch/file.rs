use std::path::{Path, PathBuf};

use crate::bio::fasta;
use crate::bio::orf::has_significant_orf;
use crate::bio::sequence::{Alphabet, SequenceRecord};
use crate::sketch::{FileAlphabet, FileError, FileSketch, SplitPartition, SplitPartitions};
use crate::FabulaError;

/// Analyze a single FASTA file.
///
/// Records are partitioned by alphabet; nucleotide records are additionally
/// scanned for a significant ORF. A file containing both alphabets is split
/// into `<base>_NT.fasta` / `<base>_AA.fasta` siblings so downstream tools
/// see single-alphabet inputs. The split filenames are deterministic and
/// re-running overwrites them in place; a crash mid-write can leave a
/// partial split file.
///
/// Failures (missing file, malformed content, unwritable split) come back
/// as a structured [`FileError`], never as a panic or propagated error.
pub fn analyze_file(path: &Path) -> Result<FileSketch, FileError> {
    let file_path = path.display().to_string();

    let records = match fasta::parse_fasta(path) {
        Ok(records) => records,
        Err(FabulaError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FileError {
                file_path: Some(file_path.clone()),
                error: format!("File not found: {}", file_path),
            });
        }
        Err(e) => {
            return Err(FileError {
                file_path: Some(file_path.clone()),
                error: format!("An error occurred while parsing the file: {}", e),
            });
        }
    };

    if records.is_empty() {
        return Ok(FileSketch {
            file_path,
            total_records: 0,
            total_length: 0,
            alphabet: FileAlphabet::Empty,
            has_orfs: false,
            partitions: None,
        });
    }

    let total_records = records.len();
    let total_length: usize = records.iter().map(|r| r.len()).sum();

    let mut nt_partition: Vec<SequenceRecord> = Vec::new();
    let mut aa_partition: Vec<SequenceRecord> = Vec::new();
    let mut nt_has_orfs = false;

    for record in records {
        match record.alphabet() {
            Alphabet::Nt => {
                nt_has_orfs |= has_significant_orf(&record.sequence);
                nt_partition.push(record);
            }
            Alphabet::Aa => aa_partition.push(record),
        }
    }

    // ORF scanning is meaningless for protein sequences, so any partition
    // containing amino acids reports has_orfs vacuously true.
    let (alphabet, has_orfs) = match (!nt_partition.is_empty(), !aa_partition.is_empty()) {
        (true, false) => (FileAlphabet::Nt, nt_has_orfs),
        (false, true) => (FileAlphabet::Aa, true),
        _ => (FileAlphabet::Mixed, true),
    };

    let partitions = if alphabet == FileAlphabet::Mixed {
        Some(split_mixed_file(
            path,
            &file_path,
            &nt_partition,
            &aa_partition,
            nt_has_orfs,
        )?)
    } else {
        None
    };

    Ok(FileSketch {
        file_path,
        total_records,
        total_length,
        alphabet,
        has_orfs,
        partitions,
    })
}

fn split_mixed_file(
    path: &Path,
    file_path: &str,
    nt_partition: &[SequenceRecord],
    aa_partition: &[SequenceRecord],
    nt_has_orfs: bool,
) -> Result<SplitPartitions, FileError> {
    let base = path.with_extension("");
    let nt_file = PathBuf::from(format!("{}_NT.fasta", base.display()));
    let aa_file = PathBuf::from(format!("{}_AA.fasta", base.display()));

    for (out, partition) in [(&nt_file, nt_partition), (&aa_file, aa_partition)] {
        fasta::write_fasta(out, partition).map_err(|e| FileError {
            file_path: Some(file_path.to_string()),
            error: format!("Failed to write split file {}: {}", out.display(), e),
        })?;
    }

    Ok(SplitPartitions {
        nt: SplitPartition {
            count: nt_partition.len(),
            total_length: nt_partition.iter().map(|r| r.len()).sum(),
            output_file: nt_file.display().to_string(),
            has_orfs: nt_has_orfs,
        },
        aa: SplitPartition {
            count: aa_partition.len(),
            total_length: aa_partition.iter().map(|r| r.len()).sum(),
            output_file: aa_file.display().to_string(),
            has_orfs: true,
        },
    })
}
