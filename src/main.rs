use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlist_transcripts::cli::{Cli, Commands};
use playlist_transcripts::config::{Config, API_KEY_ENV};
use playlist_transcripts::operator::{ConsoleOperator, Operator};
use playlist_transcripts::{utils, Pipeline};

const TARGET_LANG_PROMPT: &str = "Which language do you want the final transcript translated to? (e.g., 'en', 'pt', etc.) or press Enter to use the original language:";
const URL_PROMPT: &str = "Enter the YouTube playlist or video URL:";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "playlist_transcripts=debug,yt_transcripts=debug"
    } else {
        "playlist_transcripts=info,yt_transcripts=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load()?;

    match cli.command {
        Commands::Fetch {
            url,
            target_lang,
            api_key,
            output_dir,
            languages,
        } => {
            config.apply_api_key(api_key);
            if let Some(dir) = output_dir {
                config.output.root = dir;
            }
            if let Some(languages) = languages {
                let languages: Vec<String> = languages
                    .into_iter()
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect();
                if languages.is_empty() {
                    anyhow::bail!("--languages needs at least one language code");
                }
                config.youtube.transcript_languages = languages;
            }

            if config.has_api_key() {
                println!("✅ YouTube API key loaded successfully.");
            } else {
                eprintln!(
                    "⚠️  Missing API key. Set {} or add youtube.api_key to config.yaml.",
                    API_KEY_ENV
                );
            }

            let mut operator = ConsoleOperator::new();
            let target_lang = match target_lang {
                Some(lang) => lang,
                None => operator.ask_text(TARGET_LANG_PROMPT).unwrap_or_default(),
            };
            let url = match url {
                Some(url) => url,
                None => operator
                    .ask_text(URL_PROMPT)
                    .context("No playlist or video URL provided")?,
            };

            let pipeline = Pipeline::from_config(&config)?.with_progress(!cli.quiet);

            tracing::info!("Starting transcript extraction for URL: {}", url);
            let started = Instant::now();
            let summary = pipeline.run(&url, Some(&target_lang), &mut operator).await?;

            println!("✅ Transcripts saved successfully.");
            println!(
                "   {} videos in {} ({} from YouTube, {} from Whisper, {} unavailable)",
                summary.videos,
                utils::format_duration(started.elapsed().as_secs_f64()),
                summary.provider_transcripts,
                summary.generated_transcripts,
                summary.unavailable
            );
            if summary.translated > 0 || summary.translation_failures > 0 {
                println!(
                    "   {} translated, {} translation failures",
                    summary.translated, summary.translation_failures
                );
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = config.save()?;
                println!("Configuration written to: {}", path.display());
            }
        }
        Commands::Doctor => {
            let missing = utils::check_dependencies(
                &config.fallback.yt_dlp_path,
                &config.fallback.whisper_path,
            )
            .await;

            if missing.is_empty() {
                println!("✅ yt-dlp and whisper are available.");
            } else {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing {
                    eprintln!("   • {}", dep);
                }
            }

            if !config.has_api_key() {
                eprintln!("⚠️  {} is not set.", API_KEY_ENV);
            }
        }
    }

    Ok(())
}
