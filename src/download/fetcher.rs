use super::progress::DownloadProgress;
use super::resolver::{DownloadTarget, Endpoints};
use crate::bio::fasta::parse_fasta;
use crate::bio::sequence::SequenceRecord;
use crate::core::config::DownloadConfig;
use crate::core::paths;
use crate::{DanbError, Result};
use humansize::{format_size, DECIMAL};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Read size for streaming downloads
pub const CHUNK_SIZE: usize = 8192;

/// An opened HTTP response body
pub struct HttpResponse {
    pub body: Box<dyn Read + Send>,
    pub content_length: Option<u64>,
}

/// Source of HTTP GET responses.
///
/// Implementations must report connection failures and HTTP status >= 400
/// as [`DanbError::Network`].
pub trait HttpSource {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Blocking reqwest client with connect and total timeouts
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

impl HttpSource for HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DanbError::Network(format!("{}: {}", url, e)))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(DanbError::Network(format!("{} returned status {}", url, status)));
        }

        let content_length = response.content_length();
        Ok(HttpResponse {
            body: Box::new(response),
            content_length,
        })
    }
}

/// Downloads provider files and maintains the FASTA cache.
pub struct Fetcher<S: HttpSource = HttpClient> {
    source: S,
    endpoints: Endpoints,
    cache_dir: PathBuf,
    show_progress: bool,
}

impl Fetcher<HttpClient> {
    /// Client, endpoints and cache directory from the `download` config section
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let fetcher = Self::with_source(HttpClient::new(config)?, Endpoints::from(config));
        Ok(fetcher.with_cache_dir(config.cache_dir()))
    }
}

impl<S: HttpSource> Fetcher<S> {
    pub fn with_source(source: S, endpoints: Endpoints) -> Self {
        Self {
            source,
            endpoints,
            cache_dir: paths::danb_cache_dir(),
            show_progress: false,
        }
    }

    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Download a resolved target to its destination
    pub fn download(&self, target: &DownloadTarget) -> Result<u64> {
        info!("Downloading {} {} from {}", target.format, target.id, target.url);
        self.fetch_streaming(&target.url, &target.dest)
    }

    /// Stream `url` into `dest` in [`CHUNK_SIZE`] reads, returning the byte count.
    ///
    /// The body goes to a temporary file beside `dest` that is renamed into
    /// place only after the whole body arrived. On any failure the temporary
    /// file is removed and `dest` is left as it was.
    pub fn fetch_streaming(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.source.get(url)?;

        let mut progress = if self.show_progress {
            DownloadProgress::new(response.content_length)
        } else {
            DownloadProgress::hidden()
        };
        progress.set_message(&dest.display().to_string());

        let mut tmp = temp_file_beside(dest)?;
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            let read = match response.body.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Download of {} interrupted after {} bytes", url, progress.current());
                    return Err(DanbError::Network(format!("{}: {}", url, e)));
                }
            };
            tmp.write_all(&buffer[..read])?;
            progress.increment(read as u64);
        }

        tmp.flush()?;
        persist(tmp, dest)?;
        progress.finish();

        let written = progress.current();
        info!("Saved {} to {}", format_size(written, DECIMAL), dest.display());
        Ok(written)
    }

    /// Return the records for `id`, downloading its RCSB FASTA entry on a cache miss.
    ///
    /// The cache entry is `{cache_dir}/{id}.fasta`; its existence is the only
    /// hit signal and entries never expire. A failed download leaves no entry.
    /// Identifiers that are not plain file names (`../x`, `a/b`) are rejected
    /// before anything is created or requested.
    pub fn fetch_cached(&self, id: &str, cache_dir: &Path) -> Result<Vec<SequenceRecord>> {
        let path = paths::cache_entry(cache_dir, id)?;
        fs::create_dir_all(cache_dir)?;

        if path.exists() {
            debug!("Cache hit for {} at {}", id, path.display());
        } else {
            let url = self.endpoints.rcsb_fasta_entry(id);
            info!("Cache miss for {}, fetching {}", id, url);

            let mut response = self.source.get(&url)?;
            let mut body = Vec::new();
            response
                .body
                .read_to_end(&mut body)
                .map_err(|e| DanbError::Network(format!("{}: {}", url, e)))?;

            let mut tmp = temp_file_beside(&path)?;
            tmp.write_all(&body)?;
            tmp.flush()?;
            persist(tmp, &path)?;
            debug!("Cached {} ({})", path.display(), format_size(body.len(), DECIMAL));
        }

        parse_fasta(&path)
    }

    /// [`Fetcher::fetch_cached`] against the configured cache directory
    pub fn fetch_cached_default(&self, id: &str) -> Result<Vec<SequenceRecord>> {
        self.fetch_cached(id, &self.cache_dir)
    }
}

fn temp_file_beside(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = tempfile::Builder::new()
        .prefix(".danb-")
        .suffix(".part")
        .tempfile_in(dir)?;
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, dest: &Path) -> Result<()> {
    // Temporary files are created 0600; give the result the usual file mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(dest).map_err(|e| DanbError::Io(e.error))?;
    Ok(())
}
