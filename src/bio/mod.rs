pub mod fasta;
pub mod orf;
pub mod sequence;

pub use sequence::{Alphabet, SequenceRecord};
