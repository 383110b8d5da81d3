pub mod bio;
pub mod cli;
pub mod core;
pub mod download;
pub mod tools;

pub use crate::download::{classify, resolve, Fetcher, FileFormat, IdKind};
pub use crate::tools::mmseqs::Mmseqs;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DanbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not generate URL for format '{format}' and id '{id}'")]
    UnresolvedUrl { format: String, id: String },

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Download failed: {0}")]
    Network(String),

    #[error("{tool} failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    #[error(
        "Unsupported file format: {0}. Supported formats are .cif, .cif.gz, .pdb, .pdb.gz, .ent"
    )]
    UnsupportedFileFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for DanbError {
    fn from(err: reqwest::Error) -> Self {
        DanbError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DanbError>;
