use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: Vec<u8>,
}

/// Sequence alphabet, as guessed by character exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alphabet {
    Nt,
    Aa,
}

impl Alphabet {
    /// Guess the alphabet of a raw sequence.
    ///
    /// Residues E, F, I, L, P, Q and Z have no nucleotide-code meaning, so a
    /// single occurrence marks the whole sequence as amino acid. Short or
    /// ambiguous sequences can misclassify; this is a heuristic, not a
    /// validation pass.
    pub fn classify(sequence: &[u8]) -> Alphabet {
        const EXCLUSIVE_PROTEIN: &[u8] = b"EFILPQZ";
        let is_protein = sequence
            .iter()
            .any(|&c| EXCLUSIVE_PROTEIN.contains(&c.to_ascii_uppercase()));

        if is_protein {
            Alphabet::Aa
        } else {
            Alphabet::Nt
        }
    }
}

impl SequenceRecord {
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            sequence,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn alphabet(&self) -> Alphabet {
        Alphabet::classify(&self.sequence)
    }

    pub fn header(&self) -> String {
        match &self.description {
            Some(desc) => format!(">{} {}", self.id, desc),
            None => format!(">{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_nucleotide() {
        assert_eq!(Alphabet::classify(b"ACGT"), Alphabet::Nt);
        assert_eq!(Alphabet::classify(b"acgtn"), Alphabet::Nt);
        // All-ambiguity and empty input default to nucleotide
        assert_eq!(Alphabet::classify(b"NNNN"), Alphabet::Nt);
        assert_eq!(Alphabet::classify(b""), Alphabet::Nt);
    }

    #[test]
    fn test_classify_protein() {
        assert_eq!(Alphabet::classify(b"MKLEQ"), Alphabet::Aa);
        // One exclusive residue flips the whole sequence
        assert_eq!(Alphabet::classify(b"ACGTL"), Alphabet::Aa);
        assert_eq!(Alphabet::classify(b"acgte"), Alphabet::Aa);
    }

    #[test]
    fn test_header_formatting() {
        let rec = SequenceRecord::new("seq1".into(), b"ACGT".to_vec());
        assert_eq!(rec.header(), ">seq1");

        let rec = rec.with_description("test sequence".into());
        assert_eq!(rec.header(), ">seq1 test sequence");
    }
}
