use std::io::Write;
use std::path::{Path, PathBuf};

use crate::extractors::VideoEntry;
use crate::utils::{fit_filename, sanitize_filename};
use crate::Result;

pub const COMBINED_DIR: &str = "all_transcripts";
pub const COMBINED_FILE: &str = "transcripts.md";
pub const INDIVIDUAL_DIR: &str = "individual_transcripts";
pub const VIDEOS_DIR: &str = "video_files";
pub const SKIPPED_LOG: &str = "skipped.log";

/// Where a run writes its files
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn combined_path(&self) -> PathBuf {
        self.root.join(COMBINED_DIR).join(COMBINED_FILE)
    }

    pub fn individual_dir(&self) -> PathBuf {
        self.root.join(INDIVIDUAL_DIR)
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join(VIDEOS_DIR)
    }

    pub fn skipped_log(&self) -> PathBuf {
        self.root.join(SKIPPED_LOG)
    }

    /// Create every output directory
    pub fn prepare(&self) -> Result<()> {
        fs_err::create_dir_all(self.root.join(COMBINED_DIR))?;
        fs_err::create_dir_all(self.individual_dir())?;
        fs_err::create_dir_all(self.videos_dir())?;
        Ok(())
    }

    /// Path of the individual document for an indexed title.
    ///
    /// Long titles are shortened from the end so the index prefix survives.
    pub fn individual_path(&self, indexed_title: &str) -> PathBuf {
        self.individual_dir()
            .join(fit_filename(&sanitize_filename(indexed_title), ".md"))
    }
}

/// `"{index}. {title} - {channel}"`, the heading used for a video in every document
pub fn indexed_title(index: usize, video: &VideoEntry) -> String {
    format!("{}. {} - {}", index, video.title, video.channel_name)
}

/// Render a standalone Markdown document
pub fn render_document(title: &str, body: &str) -> String {
    format!("# {}\n\n{}\n", title, body)
}

/// Render one video's section of the combined document
pub fn render_combined_section(indexed_title: &str, body: &str) -> String {
    format!("# \"{}\"\n\n{}\n\n", indexed_title, body)
}

/// Write a Markdown document, replacing any previous content
pub fn save_markdown(path: &Path, title: &str, body: &str) -> Result<()> {
    fs_err::write(path, render_document(title, body))?;
    Ok(())
}

/// Append an entry to the skip log
pub fn log_skipped(path: &Path, url: &str, reason: &str) -> Result<()> {
    let mut log = fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(log, "{} - {}", url, reason)?;
    Ok(())
}

/// The run-wide document holding every video's transcript
pub struct CombinedTranscript {
    file: fs_err::File,
}

impl CombinedTranscript {
    /// Create or truncate the combined document
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            file: fs_err::File::create(path)?,
        })
    }

    /// Append a video's section
    pub fn append(&mut self, indexed_title: &str, body: &str) -> Result<()> {
        self.file
            .write_all(render_combined_section(indexed_title, body).as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}
