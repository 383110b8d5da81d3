use serde::{Deserialize, Serialize};

/// Which repository an identifier most likely belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdKind {
    UniProt,
    Pdb,
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::UniProt => write!(f, "UniProt"),
            IdKind::Pdb => write!(f, "PDB"),
        }
    }
}

/// Classify an identifier: six or more characters starting with a letter is
/// treated as a UniProt accession, anything else as a PDB entry code.
///
/// This is a heuristic. PDB extended codes such as `pdb_00001abc` and
/// six-character UniProt accessions starting with a digit are misclassified.
pub fn classify(id: &str) -> IdKind {
    match id.chars().next() {
        Some(first) if first.is_alphabetic() && id.chars().count() >= 6 => IdKind::UniProt,
        _ => IdKind::Pdb,
    }
}

pub fn is_uniprot_id(id: &str) -> bool {
    classify(id) == IdKind::UniProt
}
