use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::watch_url;
use crate::{ExtractError, Result};

/// Fetches a video's media file for local transcription
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download the video into `dir` as `<file_stem>.<ext>` and return the file path
    async fn download(&self, video_id: &str, file_stem: &str, dir: &Path) -> Result<PathBuf>;
}

/// Media downloader backed by yt-dlp
pub struct YtDlp {
    yt_dlp_path: String,
}

impl YtDlp {
    pub fn new(yt_dlp_path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait]
impl MediaDownloader for YtDlp {
    async fn download(&self, video_id: &str, file_stem: &str, dir: &Path) -> Result<PathBuf> {
        let url = watch_url(video_id);
        let template = dir.join(format!("{}.%(ext)s", file_stem));
        tracing::debug!("Downloading media for {} to {}", url, template.display());

        let output = Command::new(&self.yt_dlp_path)
            .arg(&url)
            .arg("-o")
            .arg(&template)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        // The exit status alone is not trusted; the file lookup below decides.
        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("yt-dlp exited with {}: {}", output.status, error.trim());
        }

        find_downloaded_file(dir, file_stem)
    }
}

/// Locate `<dir>/<file_stem>.*`, whatever extension the downloader picked
pub fn find_downloaded_file(dir: &Path, file_stem: &str) -> Result<PathBuf> {
    // Escape the whole path: output directories may contain glob characters too.
    let pattern = format!(
        "{}.*",
        glob::Pattern::escape(&dir.join(file_stem).to_string_lossy())
    );

    let found = glob::glob(&pattern)
        .map_err(|e| ExtractError::Parse(format!("invalid download pattern: {}", e)))?
        .filter_map(|entry| entry.ok())
        .find(|path| path.is_file());

    found.ok_or_else(|| ExtractError::DownloadNotFound(file_stem.to_string()))
}
