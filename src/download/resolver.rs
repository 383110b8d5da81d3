use super::identifier::{classify, IdKind};
use crate::core::config::DownloadConfig;
use crate::{DanbError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Downloadable file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Pdb,
    Cif,
    Fasta,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Pdb => "pdb",
            FileFormat::Cif => "cif",
            FileFormat::Fasta => "fasta",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pdb" => Ok(FileFormat::Pdb),
            "cif" => Ok(FileFormat::Cif),
            "fasta" => Ok(FileFormat::Fasta),
            _ => Err(format!("Unknown file format: {}", s)),
        }
    }
}

/// Provider base URLs used to build download links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub uniprot: String,
    pub rcsb_fasta: String,
    pub rcsb_files: String,
    pub alphafold: String,
    pub alphafold_version: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from(&DownloadConfig::default())
    }
}

impl From<&DownloadConfig> for Endpoints {
    fn from(config: &DownloadConfig) -> Self {
        let base = |url: &str| url.trim_end_matches('/').to_string();
        Self {
            uniprot: base(&config.uniprot_url),
            rcsb_fasta: base(&config.rcsb_fasta_url),
            rcsb_files: base(&config.rcsb_files_url),
            alphafold: base(&config.alphafold_url),
            alphafold_version: config.alphafold_version.clone(),
        }
    }
}

impl Endpoints {
    /// Build the download URL for a format and identifier.
    ///
    /// UniProt and AlphaFold keep the identifier's case; RCSB paths use the
    /// lowercase form.
    pub fn url_for(&self, format: FileFormat, id: &str) -> String {
        let kind = classify(id);
        let lid = id.to_lowercase();

        match (format, kind) {
            (FileFormat::Fasta, IdKind::UniProt) => format!("{}/{}.fasta", self.uniprot, id),
            (FileFormat::Fasta, IdKind::Pdb) => format!("{}/{}", self.rcsb_fasta, lid),
            (FileFormat::Pdb | FileFormat::Cif, IdKind::UniProt) => format!(
                "{}/AF-{}-F1-model_{}.{}",
                self.alphafold, id, self.alphafold_version, format
            ),
            (FileFormat::Pdb | FileFormat::Cif, IdKind::Pdb) => {
                format!("{}/{}.{}", self.rcsb_files, lid, format)
            }
        }
    }

    /// Resolve a format name and identifier; `None` when the format is unknown.
    pub fn resolve(&self, format: &str, id: &str) -> Option<String> {
        format
            .parse::<FileFormat>()
            .ok()
            .map(|format| self.url_for(format, id))
    }

    /// RCSB FASTA endpoint used by the sequence cache, identifier passed through as given
    pub fn rcsb_fasta_entry(&self, id: &str) -> String {
        format!("{}/{}", self.rcsb_fasta, id)
    }
}

/// Resolve against the public provider endpoints.
pub fn resolve(format: &str, id: &str) -> Option<String> {
    Endpoints::default().resolve(format, id)
}

/// A single download request: what to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub format: FileFormat,
    pub id: String,
    pub url: String,
    pub dest: PathBuf,
}

impl DownloadTarget {
    /// Build a target, defaulting the destination to `{id}.{format}`.
    pub fn new(
        endpoints: &Endpoints,
        format: FileFormat,
        id: &str,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            format,
            id: id.to_string(),
            url: endpoints.url_for(format, id),
            dest: output.unwrap_or_else(|| PathBuf::from(format!("{}.{}", id, format))),
        }
    }

    /// Build a target from a format name; unknown formats cannot be resolved.
    pub fn parse(
        endpoints: &Endpoints,
        format: &str,
        id: &str,
        output: Option<PathBuf>,
    ) -> Result<Self> {
        let parsed: FileFormat = format.parse().map_err(|_| DanbError::UnresolvedUrl {
            format: format.to_string(),
            id: id.to_string(),
        })?;
        Ok(Self::new(endpoints, parsed, id, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_format_is_unresolved() {
        assert_eq!(resolve("xml", "12ca"), None);
        assert_eq!(resolve("", "P69905"), None);
        // Format names are matched exactly
        assert_eq!(resolve("PDB", "12ca"), None);
    }

    #[test]
    fn test_custom_endpoints_strip_trailing_slash() {
        let config = DownloadConfig {
            rcsb_files_url: "http://127.0.0.1:8080/download/".to_string(),
            ..DownloadConfig::default()
        };
        let endpoints = Endpoints::from(&config);
        assert_eq!(
            endpoints.url_for(FileFormat::Pdb, "4HHB"),
            "http://127.0.0.1:8080/download/4hhb.pdb"
        );
    }

    #[test]
    fn test_rcsb_fasta_entry_keeps_case() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.rcsb_fasta_entry("12CA"),
            "https://www.rcsb.org/fasta/entry/12CA"
        );
    }

    #[test]
    fn test_download_target_default_destination() {
        let target = DownloadTarget::parse(&Endpoints::default(), "cif", "12CA", None).unwrap();
        assert_eq!(target.format, FileFormat::Cif);
        assert_eq!(target.url, "https://files.rcsb.org/download/12ca.cif");
        assert_eq!(target.dest, PathBuf::from("12CA.cif"));

        let target = DownloadTarget::new(
            &Endpoints::default(),
            FileFormat::Fasta,
            "12ca",
            Some(PathBuf::from("out.fasta")),
        );
        assert_eq!(target.dest, PathBuf::from("out.fasta"));
    }

    #[test]
    fn test_download_target_unresolved() {
        let err = DownloadTarget::parse(&Endpoints::default(), "xml", "12ca", None).unwrap_err();
        assert!(matches!(err, DanbError::UnresolvedUrl { .. }));
    }
}
