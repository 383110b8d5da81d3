//! External sequence clustering and search tools

pub mod mmseqs;

pub use mmseqs::Mmseqs;
