use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the YouTube Data API key
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API and caption provider settings
    pub youtube: YoutubeConfig,

    /// Speech-to-text fallback settings
    pub fallback: FallbackConfig,

    /// Translation service settings
    pub translation: TranslationConfig,

    /// Output layout settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Data API key, usually supplied through `YOUTUBE_API_KEY`
    pub api_key: Option<String>,

    /// Base URL of the Data API v3
    pub api_base: String,

    /// Base URL of the watch page and the player API
    pub watch_base: String,

    /// Caption languages in order of preference
    pub transcript_languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// whisper executable
    pub whisper_path: String,

    /// Whisper model size
    pub whisper_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Base URL of the translation endpoint
    pub endpoint: String,

    /// Largest piece of text sent in one request
    pub max_chunk_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which every output folder is created
    pub root: PathBuf,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            watch_base: "https://www.youtube.com".to_string(),
            transcript_languages: vec!["pt".to_string(), "en".to_string()],
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            whisper_path: "whisper".to_string(),
            whisper_model: "base".to_string(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com".to_string(),
            max_chunk_chars: 5000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from file or fall back to defaults, then apply the environment
    pub fn load() -> Result<Self> {
        let mut config = match Self::existing_config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.apply_api_key(Some(key));
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        serde_yaml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Use the given key unless it is blank
    pub fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.youtube.api_key = Some(key);
        }
    }

    /// Whether an API key is available
    pub fn has_api_key(&self) -> bool {
        self.youtube.api_key.is_some()
    }

    fn existing_config_path() -> Option<PathBuf> {
        Self::config_path().ok().filter(|path| path.exists())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("playlist-transcripts").join("config.yaml"))
    }

    fn validate(&self) -> Result<()> {
        if self.youtube.transcript_languages.is_empty() {
            anyhow::bail!("At least one transcript language must be configured");
        }

        if self.translation.max_chunk_chars == 0 {
            anyhow::bail!("translation.max_chunk_chars must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!(
            "  API Key: {}",
            if self.has_api_key() { "set" } else { "missing" }
        );
        println!("  Data API: {}", self.youtube.api_base);
        println!(
            "  Transcript Languages: {}",
            self.youtube.transcript_languages.join(", ")
        );
        println!("  yt-dlp: {}", self.fallback.yt_dlp_path);
        println!(
            "  Whisper: {} (model: {})",
            self.fallback.whisper_path, self.fallback.whisper_model
        );
        println!("  Translation Endpoint: {}", self.translation.endpoint);
        println!("  Output Root: {}", self.output.root.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_languages_prefer_portuguese() {
        let config = Config::default();
        assert_eq!(config.youtube.transcript_languages, vec!["pt", "en"]);
        assert_eq!(config.fallback.whisper_model, "base");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            "youtube:\n  api_key: abc\nfallback:\n  whisper_model: small\n",
        )
        .unwrap();

        assert_eq!(config.youtube.api_key.as_deref(), Some("abc"));
        assert_eq!(config.youtube.api_base, "https://www.googleapis.com/youtube/v3");
        assert_eq!(config.fallback.whisper_model, "small");
        assert_eq!(config.fallback.yt_dlp_path, "yt-dlp");
        assert_eq!(config.translation.max_chunk_chars, 5000);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let mut config = Config::default();
        config.apply_api_key(Some("   ".to_string()));
        assert!(!config.has_api_key());

        config.apply_api_key(Some(" key ".to_string()));
        assert_eq!(config.youtube.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_validate_rejects_empty_languages() {
        let mut config = Config::default();
        config.youtube.transcript_languages.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "output:\n  root: /tmp/out\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output.root, PathBuf::from("/tmp/out"));
    }
}
