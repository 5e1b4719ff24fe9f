//! Open reading frame scanning across all six reading frames.
//!
//! An ORF here is a maximal run of in-frame non-stop codons; a start codon
//! is not required, so the measure reflects coding potential rather than
//! annotated genes.

/// Minimum ORF length (nt) that is always considered significant.
pub const SIGNIFICANT_ORF_MIN_NT: usize = 300;

fn is_stop(codon: &[u8]) -> bool {
    matches!(
        codon,
        [b'T', b'A', b'A'] | [b'T', b'A', b'G'] | [b'T', b'G', b'A']
    )
}

/// Reverse complement with A<->T, C<->G, N->N; unrecognized characters pass
/// through unchanged.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&base| match base {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            other => other,
        })
        .collect()
}

/// Longest stop-free codon run starting at the given frame offset, in
/// nucleotides. A trailing run with no closing stop still counts; a partial
/// codon at the end of the sequence does not.
fn longest_run_in_frame(seq: &[u8], frame: usize) -> usize {
    let mut max_len = 0;
    let mut current = 0;

    let mut i = frame;
    while i + 3 <= seq.len() {
        if is_stop(&seq[i..i + 3]) {
            max_len = max_len.max(current);
            current = 0;
        } else {
            current += 3;
        }
        i += 3;
    }

    max_len.max(current)
}

/// Length (nt) of the longest ORF across all six reading frames.
///
/// Input is uppercased and stripped of whitespace before scanning; the
/// result is always a multiple of 3 and never exceeds the input length.
pub fn longest_orf_length(seq: &[u8]) -> usize {
    let cleaned: Vec<u8> = seq
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| b.to_ascii_uppercase())
        .collect();

    let rc = reverse_complement(&cleaned);

    let mut best = 0;
    for frame in 0..3 {
        best = best.max(longest_run_in_frame(&cleaned, frame));
        best = best.max(longest_run_in_frame(&rc, frame));
    }

    best
}

/// Coarse "looks protein-coding" signal: the longest ORF covers more than
/// half the sequence, or is at least [`SIGNIFICANT_ORF_MIN_NT`] long.
pub fn has_significant_orf(seq: &[u8]) -> bool {
    let orf = longest_orf_length(seq);
    orf * 2 > seq.len() || orf >= SIGNIFICANT_ORF_MIN_NT
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"ACGT"), b"ACGT");
        assert_eq!(reverse_complement(b"AAAA"), b"TTTT");
        assert_eq!(reverse_complement(b"ATGN"), b"NCAT");
    }

    #[test]
    fn test_frame_walk_hand_computed() {
        // ATGAAATAAATG, all six frames by hand:
        //   fwd frame 0: ATG AAA | TAA | ATG       -> 6
        //   fwd frame 1: TGA | AAT AAA             -> 6
        //   fwd frame 2: GAA ATA AAT               -> 9
        let seq = b"ATGAAATAAATG";
        assert_eq!(longest_run_in_frame(seq, 0), 6);
        assert_eq!(longest_run_in_frame(seq, 1), 6);
        assert_eq!(longest_run_in_frame(seq, 2), 9);

        //   rev strand CATTTATTTCAT has no in-frame stop at offset 0 -> 12
        let rc = reverse_complement(seq);
        assert_eq!(rc, b"CATTTATTTCAT");
        assert_eq!(longest_run_in_frame(&rc, 0), 12);

        assert_eq!(longest_orf_length(seq), 12);
    }

    #[test]
    fn test_stop_codon_closes_run() {
        // TAA closes the first run; the trailing ATG counts as its own run
        assert_eq!(longest_run_in_frame(b"ATGAAATAAATG", 0), 6);
        // Frame 0 of a pure stop tandem never opens a frame
        assert_eq!(longest_run_in_frame(b"TAATAGTGA", 0), 0);
    }

    #[test]
    fn test_trailing_partial_codon_ignored() {
        // 7 nt: two full codons plus one dangling base
        assert_eq!(longest_orf_length(b"ATGAAAG"), 6);
    }

    #[test]
    fn test_whitespace_and_case_normalized() {
        assert_eq!(
            longest_orf_length(b"atg aaa\ntaa"),
            longest_orf_length(b"ATGAAATAA")
        );
    }

    #[test]
    fn test_short_inputs() {
        assert_eq!(longest_orf_length(b""), 0);
        assert_eq!(longest_orf_length(b"AT"), 0);
        assert_eq!(longest_orf_length(b"ATG"), 3);
    }

    #[test]
    fn test_significance_policy() {
        assert!(has_significant_orf(b"ATGAAATAA"));

        // TTAA tandem is its own reverse complement and carries an in-frame
        // stop every 12 nt in every frame, capping runs at 9 of 36 nt
        let dense_stops = b"TTAA".repeat(9);
        assert_eq!(longest_orf_length(&dense_stops), 9);
        assert!(!has_significant_orf(&dense_stops));
    }

    proptest! {
        #[test]
        fn orf_length_is_codon_aligned_and_bounded(seq in "[ACGTN]{0,200}") {
            let len = longest_orf_length(seq.as_bytes());
            prop_assert_eq!(len % 3, 0);
            prop_assert!(len <= seq.len());
        }
    }
}
