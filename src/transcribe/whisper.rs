use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::{ExtractError, Result};

/// Local speech recognition model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe a media file; `language` of `None` lets the model detect it
    async fn transcribe(&self, media: &Path, language: Option<String>) -> Result<String>;
}

/// Speech-to-text through the `whisper` command line tool
pub struct WhisperCli {
    whisper_path: String,
    model: String,
}

impl WhisperCli {
    pub fn new(whisper_path: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            whisper_path: whisper_path.into(),
            model: model.into(),
        }
    }

    fn build_command(&self, media: &Path, output_dir: &Path, language: Option<&str>) -> Command {
        let mut command = Command::new(&self.whisper_path);
        command
            .arg(media)
            .args(["--model", self.model.as_str()])
            .args(["--output_format", "txt"])
            .arg("--output_dir")
            .arg(output_dir)
            .args(["--verbose", "False"]);

        if let Some(language) = language {
            command.args(["--language", language]);
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for WhisperCli {
    fn default() -> Self {
        Self::new("whisper", "base")
    }
}

#[async_trait]
impl SpeechToText for WhisperCli {
    async fn transcribe(&self, media: &Path, language: Option<String>) -> Result<String> {
        let output_dir = tempfile::tempdir()?;

        let output = self
            .build_command(media, output_dir.path(), language.as_deref())
            .output()
            .await
            .map_err(|e| ExtractError::Transcription(format!("failed to spawn {}: {}", self.whisper_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Transcription(format!(
                "whisper exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stem = media
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let transcript_path = output_dir.path().join(format!("{}.txt", stem));

        let text = fs_err::tokio::read_to_string(&transcript_path)
            .await
            .map_err(|e| ExtractError::Transcription(format!("no transcript produced: {}", e)))?;

        Ok(text.trim().to_string())
    }
}
