use std::path::PathBuf;

use crate::extractors::downloader::MediaDownloader;
use crate::extractors::VideoEntry;
use crate::operator::{Choice, Operator};
use crate::pipeline::RunSession;
use crate::utils::{normalize_language_code, sanitize_filename, truncate_utf8};
use crate::Result;

pub mod whisper;

pub use whisper::{SpeechToText, WhisperCli};

/// Body written for a video that ends up without any transcript
pub const UNAVAILABLE_SENTINEL: &str = "Transcript not available for this video.";

const GENERATE_PROMPT: &str =
    "Do you want to generate transcription using Whisper? (Y=Yes, A=Yes to all, N=No):";
/// Room left for yt-dlp's format and `.part` suffixes
const MEDIA_STEM_MAX_BYTES: usize = 200;

const LANGUAGE_PROMPT: &str = "Which language is the video spoken in? (e.g., 'pt', 'en', press Enter to use the original language):";

/// Local transcription used when the provider has no transcript
pub struct FallbackTranscriber {
    downloader: Box<dyn MediaDownloader>,
    speech: Box<dyn SpeechToText>,
    videos_dir: PathBuf,
}

impl FallbackTranscriber {
    pub fn new(
        downloader: Box<dyn MediaDownloader>,
        speech: Box<dyn SpeechToText>,
        videos_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloader,
            speech,
            videos_dir: videos_dir.into(),
        }
    }

    /// Offer speech-to-text for a video.
    ///
    /// Returns `Ok(None)` when the operator declines. Once the operator answers
    /// "yes to all", the session remembers it and later videos are not asked again.
    pub async fn generate(
        &self,
        video: &VideoEntry,
        session: &mut RunSession,
        operator: &mut dyn Operator,
    ) -> Result<Option<String>> {
        operator.notify(&format!("'{}' does not have a transcript on YouTube.", video.title));

        if !session.always_transcribe {
            match operator.ask_yes_no_all(GENERATE_PROMPT) {
                Choice::YesToAll => session.always_transcribe = true,
                Choice::Yes => {}
                Choice::No => {
                    tracing::info!(video_id = %video.id, "Speech-to-text declined");
                    return Ok(None);
                }
            }
        }

        let language = operator
            .ask_text(LANGUAGE_PROMPT)
            .and_then(|answer| normalize_language_code(&answer));

        let text = self.transcribe_video(video, language, operator).await?;
        Ok(Some(text))
    }

    async fn transcribe_video(
        &self,
        video: &VideoEntry,
        language: Option<String>,
        operator: &mut dyn Operator,
    ) -> Result<String> {
        let title = sanitize_filename(&video.title);
        let mut file_stem = truncate_utf8(&title, MEDIA_STEM_MAX_BYTES).trim_end().to_string();
        if file_stem.is_empty() {
            file_stem = video.id.clone();
        }

        fs_err::tokio::create_dir_all(&self.videos_dir).await?;

        operator.notify(&format!("Downloading '{}' for transcription...", video.title));
        let media = self
            .downloader
            .download(&video.id, &file_stem, &self.videos_dir)
            .await?;

        operator.notify("Generating transcript using Whisper...");
        tracing::info!(
            video_id = %video.id,
            media = %media.display(),
            language = language.as_deref().unwrap_or("auto"),
            "Running speech-to-text"
        );
        let result = self.speech.transcribe(&media, language).await;

        if let Err(e) = fs_err::tokio::remove_file(&media).await {
            tracing::warn!("Failed to remove downloaded media: {}", e);
        }

        let text = result?;
        operator.notify("Whisper transcription complete.");
        Ok(text)
    }
}
