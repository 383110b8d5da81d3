pub mod fasta;
pub mod sequence;
pub mod structure;

pub use sequence::SequenceRecord;
pub use structure::{read_structure, Atom, StructureFormat};
