use crate::core::paths;
use crate::DanbError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub download: DownloadConfig,
    pub mmseqs: MmseqsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    /// UniProt FASTA endpoint, `{uniprot_url}/{id}.fasta`
    pub uniprot_url: String,
    /// RCSB FASTA endpoint, `{rcsb_fasta_url}/{id}`
    pub rcsb_fasta_url: String,
    /// RCSB coordinate files, `{rcsb_files_url}/{id}.{format}`
    pub rcsb_files_url: String,
    /// AlphaFold model files, `{alphafold_url}/AF-{id}-F1-model_{version}.{format}`
    pub alphafold_url: String,
    pub alphafold_version: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    /// Sequence cache directory (defaults to ~/.danb/cache)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MmseqsConfig {
    pub binary: PathBuf,
    pub min_seq_id: f64,
    pub coverage: f64,
    pub cov_mode: u8,
    /// Directory for result files; relative names land in the working directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub cluster_prefix: String,
    pub search_output: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            uniprot_url: "https://www.uniprot.org/uniprot".to_string(),
            rcsb_fasta_url: "https://www.rcsb.org/fasta/entry".to_string(),
            rcsb_files_url: "https://files.rcsb.org/download".to_string(),
            alphafold_url: "https://alphafold.ebi.ac.uk/files".to_string(),
            alphafold_version: "v4".to_string(),
            timeout_secs: 300,
            connect_timeout_secs: 30,
            user_agent: concat!("danb/", env!("CARGO_PKG_VERSION")).to_string(),
            cache_dir: None,
        }
    }
}

impl DownloadConfig {
    /// `cache_dir` if set, otherwise `DANB_CACHE_DIR` / `~/.danb/cache`
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(paths::danb_cache_dir)
    }
}

impl Default for MmseqsConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("mmseqs"),
            min_seq_id: 0.3,
            coverage: 0.8,
            cov_mode: 1,
            output_dir: None,
            cluster_prefix: "clusterRes".to_string(),
            search_output: "alnRes.m8".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, DanbError> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => Err(DanbError::Config(format!(
                "Unsupported config file {}: expected .yaml, .yml or .toml",
                path.display()
            ))),
        }
    }
}

impl Config {
    /// Overlay the keys present in another config file onto this one.
    ///
    /// Nested sections are merged key by key, so a file that only sets
    /// `mmseqs.min_seq_id` leaves every other value untouched.
    pub fn update<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DanbError> {
        let overlay = read_document(path.as_ref())?;
        let mut base = serde_json::to_value(&*self)
            .map_err(|e| DanbError::Config(format!("Failed to serialize config: {}", e)))?;
        merge_values(&mut base, overlay);
        *self = from_document(base, path.as_ref())?;
        Ok(())
    }

    /// Effective cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.download.cache_dir()
    }

    pub fn validate(&self) -> Result<(), DanbError> {
        let m = &self.mmseqs;
        if !(0.0..=1.0).contains(&m.min_seq_id) {
            return Err(DanbError::Config(format!(
                "mmseqs.min_seq_id must be within [0, 1], got {}",
                m.min_seq_id
            )));
        }
        if !(0.0..=1.0).contains(&m.coverage) {
            return Err(DanbError::Config(format!(
                "mmseqs.coverage must be within [0, 1], got {}",
                m.coverage
            )));
        }
        if m.cov_mode > 5 {
            return Err(DanbError::Config(format!(
                "mmseqs.cov_mode must be between 0 and 5, got {}",
                m.cov_mode
            )));
        }
        if self.download.timeout_secs == 0 || self.download.connect_timeout_secs == 0 {
            return Err(DanbError::Config("download timeouts must be positive".to_string()));
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

/// Load the config at `DANB_CONFIG` / `~/.danb/config.yaml` if present, defaults otherwise
pub fn load_default_config() -> Result<Config, DanbError> {
    let path = paths::default_config_path();
    if path.exists() {
        load_config(&path)
    } else {
        debug!("No config file at {}, using defaults", path.display());
        Ok(Config::default())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, DanbError> {
    let path = path.as_ref();
    let document = read_document(path)?;
    let config = from_document(document, path)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), DanbError> {
    let path = path.as_ref();
    let contents = match ConfigFormat::from_path(path)? {
        ConfigFormat::Yaml => serde_yaml::to_string(config)
            .map_err(|e| DanbError::Config(format!("Failed to serialize config: {}", e)))?,
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| DanbError::Config(format!("Failed to serialize config: {}", e)))?,
    };
    std::fs::write(path, contents)?;
    Ok(())
}

fn read_document(path: &Path) -> Result<Value, DanbError> {
    let format = ConfigFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path)
        .map_err(|e| DanbError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str::<Value>(&contents)
            .map_err(|e| DanbError::Config(format!("Failed to parse {}: {}", path.display(), e)))?,
        ConfigFormat::Toml => toml::from_str::<Value>(&contents)
            .map_err(|e| DanbError::Config(format!("Failed to parse {}: {}", path.display(), e)))?,
    };

    // An empty YAML document parses as null
    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}

fn from_document(document: Value, path: &Path) -> Result<Config, DanbError> {
    let config: Config = serde_json::from_value(document)
        .map_err(|e| DanbError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
