use crate::core::config::MmseqsConfig;
use crate::{DanbError, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// MMseqs2 `easy-cluster` / `easy-search` runner.
///
/// The binary is invoked directly with an argument vector, output is
/// discarded and only the exit status decides success.
pub struct Mmseqs {
    config: MmseqsConfig,
}

impl Default for Mmseqs {
    fn default() -> Self {
        Self::new(MmseqsConfig::default())
    }
}

impl Mmseqs {
    pub fn new(config: MmseqsConfig) -> Self {
        Self { config }
    }

    /// Use a specific binary, keeping every other default
    pub fn with_binary<P: Into<PathBuf>>(binary: P) -> Self {
        Self::new(MmseqsConfig {
            binary: binary.into(),
            ..MmseqsConfig::default()
        })
    }

    pub fn config(&self) -> &MmseqsConfig {
        &self.config
    }

    /// Location of the cluster result prefix (`clusterRes` by default)
    pub fn cluster_prefix(&self) -> PathBuf {
        self.output_path(&self.config.cluster_prefix)
    }

    /// Location of the search result table (`alnRes.m8` by default)
    pub fn search_output(&self) -> PathBuf {
        self.output_path(&self.config.search_output)
    }

    fn output_path(&self, name: &str) -> PathBuf {
        match &self.config.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    fn filter_args(&self, min_seq_id: f64) -> Vec<OsString> {
        vec![
            "--min-seq-id".into(),
            min_seq_id.to_string().into(),
            "-c".into(),
            self.config.coverage.to_string().into(),
            "--cov-mode".into(),
            self.config.cov_mode.to_string().into(),
        ]
    }

    pub fn cluster_args(&self, fasta: &Path, tmp_dir: &Path, min_seq_id: f64) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "easy-cluster".into(),
            fasta.into(),
            self.cluster_prefix().into(),
            tmp_dir.into(),
        ];
        args.extend(self.filter_args(min_seq_id));
        args
    }

    pub fn search_args(
        &self,
        query: &Path,
        target: &Path,
        tmp_dir: &Path,
        min_seq_id: f64,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "easy-search".into(),
            query.into(),
            target.into(),
            self.search_output().into(),
            tmp_dir.into(),
        ];
        args.extend(self.filter_args(min_seq_id));
        args
    }

    /// Cluster a FASTA file at the configured identity threshold
    pub fn cluster(&self, fasta: &Path, tmp_dir: &Path) -> Result<PathBuf> {
        self.cluster_with_seq_id(fasta, tmp_dir, self.config.min_seq_id)
    }

    /// Cluster a FASTA file; returns the result prefix
    pub fn cluster_with_seq_id(
        &self,
        fasta: &Path,
        tmp_dir: &Path,
        min_seq_id: f64,
    ) -> Result<PathBuf> {
        check_seq_id(min_seq_id)?;
        self.prepare_output_dir()?;
        info!("Clustering {} at min-seq-id {}", fasta.display(), min_seq_id);
        self.run("easy-cluster", self.cluster_args(fasta, tmp_dir, min_seq_id))?;
        Ok(self.cluster_prefix())
    }

    /// Search `query` against `target` at the configured identity threshold
    pub fn search(&self, query: &Path, target: &Path, tmp_dir: &Path) -> Result<PathBuf> {
        self.search_with_seq_id(query, target, tmp_dir, self.config.min_seq_id)
    }

    /// Search `query` against `target`; returns the m8 result path
    pub fn search_with_seq_id(
        &self,
        query: &Path,
        target: &Path,
        tmp_dir: &Path,
        min_seq_id: f64,
    ) -> Result<PathBuf> {
        check_seq_id(min_seq_id)?;
        self.prepare_output_dir()?;
        info!(
            "Searching {} against {} at min-seq-id {}",
            query.display(),
            target.display(),
            min_seq_id
        );
        self.run("easy-search", self.search_args(query, target, tmp_dir, min_seq_id))?;
        Ok(self.search_output())
    }

    /// Ask the binary for its version string
    pub fn check_version(&self) -> Result<String> {
        let output = Command::new(&self.config.binary)
            .arg("version")
            .stderr(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error("version", e))?;

        if !output.status.success() {
            return Err(DanbError::ExternalTool {
                tool: "mmseqs version".to_string(),
                reason: format!("exited with {}", output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn prepare_output_dir(&self) -> Result<()> {
        if let Some(dir) = &self.config.output_dir {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    fn run(&self, subcommand: &str, args: Vec<OsString>) -> Result<()> {
        debug!("Running {} {:?}", self.config.binary.display(), args);

        let status = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(subcommand, e))?;

        if !status.success() {
            return Err(DanbError::ExternalTool {
                tool: format!("mmseqs {}", subcommand),
                reason: format!("exited with {}", status),
            });
        }

        Ok(())
    }

    fn spawn_error(&self, subcommand: &str, err: std::io::Error) -> DanbError {
        DanbError::ExternalTool {
            tool: format!("mmseqs {}", subcommand),
            reason: format!("could not start {}: {}", self.config.binary.display(), err),
        }
    }
}

fn check_seq_id(min_seq_id: f64) -> Result<()> {
    if (0.0..=1.0).contains(&min_seq_id) {
        Ok(())
    } else {
        Err(DanbError::Config(format!(
            "min-seq-id must be within [0, 1], got {}",
            min_seq_id
        )))
    }
}
