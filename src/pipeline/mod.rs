use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::extractors::captions::{fetch_transcript, CaptionClient, FetchFailure, TranscriptOutcome, TranscriptSource};
use crate::extractors::downloader::YtDlp;
use crate::extractors::youtube::YoutubeApi;
use crate::extractors::{resolve_url, VideoCatalog, VideoEntry, VideoSource};
use crate::operator::Operator;
use crate::output::{indexed_title, log_skipped, save_markdown, CombinedTranscript, OutputLayout};
use crate::transcribe::{FallbackTranscriber, WhisperCli, UNAVAILABLE_SENTINEL};
use crate::translate::{GoogleTranslator, Translator};
use crate::{ExtractError, Result};

/// State that lives for exactly one run
#[derive(Debug, Default)]
pub struct RunSession {
    /// Operator chose "yes to all" for speech-to-text
    pub always_transcribe: bool,

    pub summary: RunSummary,
}

/// Counters reported at the end of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub videos: usize,
    pub provider_transcripts: usize,
    pub generated_transcripts: usize,
    pub unavailable: usize,
    pub translated: usize,
    pub translation_failures: usize,
}

/// Drives a run from URL to files on disk
pub struct Pipeline {
    catalog: Box<dyn VideoCatalog>,
    captions: Box<dyn TranscriptSource>,
    fallback: FallbackTranscriber,
    translator: Box<dyn Translator>,
    layout: OutputLayout,
    languages: Vec<String>,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(
        catalog: Box<dyn VideoCatalog>,
        captions: Box<dyn TranscriptSource>,
        fallback: FallbackTranscriber,
        translator: Box<dyn Translator>,
        layout: OutputLayout,
    ) -> Self {
        Self {
            catalog,
            captions,
            fallback,
            translator,
            layout,
            languages: vec!["pt".to_string(), "en".to_string()],
            show_progress: false,
        }
    }

    /// Build a pipeline talking to the real services
    pub fn from_config(config: &Config) -> Result<Self> {
        let layout = OutputLayout::new(&config.output.root);
        let fallback = FallbackTranscriber::new(
            Box::new(YtDlp::new(&config.fallback.yt_dlp_path)),
            Box::new(WhisperCli::new(
                &config.fallback.whisper_path,
                &config.fallback.whisper_model,
            )),
            layout.videos_dir(),
        );

        Ok(Self::new(
            Box::new(YoutubeApi::new(&config.youtube)),
            Box::new(CaptionClient::new(&config.youtube)?),
            fallback,
            Box::new(GoogleTranslator::new(&config.translation)),
            layout,
        )
        .with_languages(config.youtube.transcript_languages.clone()))
    }

    /// Caption languages in order of preference
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Resolve the URL into the ordered list of videos to process
    pub async fn collect_videos(&self, url: &str) -> Result<Vec<VideoEntry>> {
        match resolve_url(url)? {
            VideoSource::Playlist { playlist_id } => self.catalog.list_playlist(&playlist_id).await,
            VideoSource::Video { video_id } => match self.catalog.video_info(&video_id).await? {
                Some((title, channel_name)) => Ok(vec![VideoEntry::new(video_id, title, channel_name)]),
                None => Err(ExtractError::Provider(format!(
                    "Could not retrieve title for video {}",
                    video_id
                ))),
            },
        }
    }

    /// Process every video behind `url`, in order.
    ///
    /// `target_lang` of `None` or blank keeps the transcripts in their original language.
    pub async fn run(
        &self,
        url: &str,
        target_lang: Option<&str>,
        operator: &mut dyn Operator,
    ) -> Result<RunSummary> {
        let target_lang = target_lang
            .map(|lang| lang.trim().to_lowercase())
            .filter(|lang| !lang.is_empty());

        self.layout.prepare()?;
        let videos = self.collect_videos(url).await?;
        tracing::info!(count = videos.len(), "Processing videos");

        let mut combined = CombinedTranscript::create(&self.layout.combined_path())?;
        let mut session = RunSession::default();
        let progress = self.progress_bar(videos.len() as u64);

        for (index, video) in videos.iter().enumerate() {
            let index = index + 1;
            progress.set_message(video.title.clone());

            self.process_video(
                index,
                video,
                target_lang.as_deref(),
                &mut combined,
                &mut session,
                operator,
            )
            .await?;

            session.summary.videos += 1;
            tracing::info!(index, total = videos.len(), video_id = %video.id, "Video processed");
            progress.inc(1);
            progress.println(format!("[{}/{}] {}", index, videos.len(), video.title));
        }

        progress.finish_and_clear();
        Ok(session.summary)
    }

    async fn process_video(
        &self,
        index: usize,
        video: &VideoEntry,
        target_lang: Option<&str>,
        combined: &mut CombinedTranscript,
        session: &mut RunSession,
        operator: &mut dyn Operator,
    ) -> Result<()> {
        let body = self.obtain_transcript(video, session, operator).await?;
        let title = indexed_title(index, video);

        combined.append(&title, &body)?;
        let path = self.layout.individual_path(&title);
        save_markdown(&path, &title, &body)?;

        let Some(target) = target_lang else {
            return Ok(());
        };

        match self.translator.translate(&body, target).await {
            Ok(translated) => {
                save_markdown(&path, &format!("{} ({})", title, target), &translated)?;
                session.summary.translated += 1;
            }
            Err(e) => {
                tracing::warn!(video_id = %video.id, error = %e, "Translation failed");
                operator.notify(&format!(
                    "⚠️ Failed to translate transcript for {}: {}",
                    video.title, e
                ));
                session.summary.translation_failures += 1;
            }
        }

        Ok(())
    }

    /// Provider transcript, else speech-to-text, else the unavailable sentinel
    async fn obtain_transcript(
        &self,
        video: &VideoEntry,
        session: &mut RunSession,
        operator: &mut dyn Operator,
    ) -> Result<String> {
        let failure = match fetch_transcript(self.captions.as_ref(), video, &self.languages).await {
            TranscriptOutcome::Found(text) => {
                session.summary.provider_transcripts += 1;
                return Ok(text);
            }
            TranscriptOutcome::Missing(failure) => failure,
        };

        tracing::warn!(video_id = %video.id, reason = %failure.reason(), "No provider transcript");
        operator.notify(&format!("⚠️ {}", failure.describe(&video.title)));

        match self.fallback.generate(video, session, operator).await {
            Ok(Some(text)) => {
                session.summary.generated_transcripts += 1;
                Ok(text)
            }
            Ok(None) => {
                self.record_unavailable(video, &failure, "speech-to-text declined", session)?;
                Ok(UNAVAILABLE_SENTINEL.to_string())
            }
            Err(e) => {
                tracing::error!(video_id = %video.id, error = %e, "Speech-to-text fallback failed");
                operator.notify(&format!(
                    "⚠️ Speech-to-text failed for '{}': {}",
                    video.title, e
                ));
                self.record_unavailable(
                    video,
                    &failure,
                    &format!("speech-to-text failed: {}", e),
                    session,
                )?;
                Ok(UNAVAILABLE_SENTINEL.to_string())
            }
        }
    }

    fn record_unavailable(
        &self,
        video: &VideoEntry,
        failure: &FetchFailure,
        detail: &str,
        session: &mut RunSession,
    ) -> Result<()> {
        session.summary.unavailable += 1;
        log_skipped(
            &self.layout.skipped_log(),
            &video.watch_url(),
            &format!("{}; {}", failure.reason(), detail),
        )
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(len);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("Processing videos {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress
    }
}
