use crate::core::config::{load_config, load_default_config};
use crate::download::{DownloadTarget, Fetcher, FileFormat};
use clap::Parser;
use colored::*;
use humansize::{format_size, DECIMAL};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "danb",
    version,
    about = "Download protein structure and sequence files",
    long_about = "Downloads PDB, mmCIF or FASTA files for a UniProt accession or a PDB ID. \
                  UniProt accessions resolve to UniProt (FASTA) or AlphaFold DB (structures), \
                  PDB IDs resolve to RCSB."
)]
pub struct Cli {
    /// File format to download
    #[arg(value_enum)]
    pub format: FileFormat,

    /// UniProt accession or PDB ID
    pub id: String,

    /// Output file (defaults to {id}.{format})
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (YAML or TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Log filter implied by `-v` when no environment filter is set
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };

    let fetcher = Fetcher::new(&config.download)?.with_progress(!cli.no_progress);
    let target = DownloadTarget::new(fetcher.endpoints(), cli.format, &cli.id, cli.output);
    let written = fetcher.download(&target)?;

    println!(
        "{} {} ({})",
        "Downloaded:".green().bold(),
        target.dest.display(),
        format_size(written, DECIMAL)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_arguments() {
        let cli = Cli::try_parse_from(["danb", "cif", "P69905", "-o", "hba.cif", "-vv"]).unwrap();
        assert_eq!(cli.format, FileFormat::Cif);
        assert_eq!(cli.id, "P69905");
        assert_eq!(cli.output, Some(PathBuf::from("hba.cif")));
        assert_eq!(cli.log_level(), "debug");
        assert!(!cli.no_progress);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["danb", "xml", "12ca"]).is_err());
    }
}
