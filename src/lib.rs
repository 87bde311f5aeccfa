//! Playlist Transcripts - A Rust CLI tool for collecting YouTube transcripts
//!
//! This library resolves a YouTube playlist or video URL, fetches the caption track of
//! every video, falls back to a local Whisper transcription when no captions exist,
//! optionally translates the result and writes Markdown files for each video plus one
//! combined document for the whole run.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod operator;
pub mod output;
pub mod pipeline;
pub mod transcribe;
pub mod translate;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{resolve_url, VideoEntry, VideoSource};
pub use operator::{ConsoleOperator, Operator, ScriptedOperator};
pub use pipeline::{Pipeline, RunSession, RunSummary};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error types specific to transcript extraction
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidInput(String),

    #[error("YouTube API request failed: {0}")]
    Provider(String),

    #[error("Transcript data is empty")]
    EmptyTranscript,

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {video_id} in requested languages ({})", .languages.join(", "))]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Could not retrieve transcript for video {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("Downloaded file for {0} not found.")]
    DownloadNotFound(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Unexpected provider response: {0}")]
    Parse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}
