//! Identifier classification, URL resolution and cached downloads
//!
//! An identifier is classified as UniProt or PDB, resolved to a provider URL
//! for the requested format and then fetched either straight to a file or
//! through the FASTA cache.

pub mod fetcher;
pub mod identifier;
pub mod progress;
pub mod resolver;

pub use fetcher::{Fetcher, HttpClient, HttpResponse, HttpSource, CHUNK_SIZE};
pub use identifier::{classify, is_uniprot_id, IdKind};
pub use progress::DownloadProgress;
pub use resolver::{resolve, DownloadTarget, Endpoints, FileFormat};
