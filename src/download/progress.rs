use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Byte progress for a single streaming download, drawn on stderr.
pub struct DownloadProgress {
    bar: ProgressBar,
    current: u64,
}

impl DownloadProgress {
    pub fn new(total: Option<u64>) -> Self {
        let bar = match total {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar().template(
                    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
                     {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}",
                ) {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            // Servers that stream without Content-Length get a byte counter
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("{spinner:.green} {bytes} {msg}")
                {
                    bar.set_style(style);
                }
                bar
            }
        };
        bar.enable_steady_tick(Duration::from_millis(100));

        DownloadProgress { bar, current: 0 }
    }

    pub fn hidden() -> Self {
        DownloadProgress {
            bar: ProgressBar::hidden(),
            current: 0,
        }
    }

    pub fn set_message(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn increment(&mut self, delta: u64) {
        self.current += delta;
        self.bar.inc(delta);
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn finish(&mut self) {
        self.bar.finish_and_clear();
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Drop for DownloadProgress {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.bar.abandon();
        }
    }
}
