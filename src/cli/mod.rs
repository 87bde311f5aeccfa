use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-transcripts",
    about = "Playlist Transcripts - Collect transcripts for every video of a YouTube playlist",
    version,
    long_about = "Downloads the captions of a YouTube playlist or single video, falls back to a local Whisper transcription when a video has none, optionally translates the text and writes one Markdown file per video plus a combined document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch transcripts for a playlist or a single video
    Fetch {
        /// Playlist or video URL (asked interactively if omitted)
        #[arg(value_name = "URL")]
        url: Option<String>,

        /// Language to translate transcripts into (asked interactively if omitted, empty keeps the original)
        #[arg(short, long, value_name = "LANG")]
        target_lang: Option<String>,

        /// YouTube Data API key
        #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Directory where output folders are created
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Caption languages in order of preference
        #[arg(short, long, value_delimiter = ',', value_name = "LANGS")]
        languages: Option<Vec<String>>,
    },

    /// Show the configuration or write a default config file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// Check that yt-dlp and whisper are installed
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_arguments() {
        let cli = Cli::try_parse_from([
            "yt-transcripts",
            "fetch",
            "https://www.youtube.com/playlist?list=PL1",
            "--target-lang",
            "en",
            "--languages",
            "es,en",
            "-q",
        ])
        .unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Fetch {
                url,
                target_lang,
                languages,
                ..
            } => {
                assert_eq!(url.as_deref(), Some("https://www.youtube.com/playlist?list=PL1"));
                assert_eq!(target_lang.as_deref(), Some("en"));
                assert_eq!(languages, Some(vec!["es".to_string(), "en".to_string()]));
            }
            _ => panic!("expected fetch command"),
        }
    }
}
