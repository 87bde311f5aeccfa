use async_trait::async_trait;
use url::Url;

pub mod captions;
pub mod downloader;
pub mod youtube;

use crate::{ExtractError, Result};

/// A video taking part in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    /// YouTube video id
    pub id: String,

    /// Video title as reported by the provider
    pub title: String,

    /// Channel that owns the video
    pub channel_name: String,
}

impl VideoEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>, channel_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel_name: channel_name.into(),
        }
    }

    /// Public watch URL for this video
    pub fn watch_url(&self) -> String {
        watch_url(&self.id)
    }
}

/// What an input URL refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    Playlist { playlist_id: String },
    Video { video_id: String },
}

/// Build the canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Decide whether a URL names a playlist or a single video.
///
/// A `list` parameter wins over `v`, so a watch URL opened from inside a playlist
/// resolves to the whole playlist.
pub fn resolve_url(input: &str) -> Result<VideoSource> {
    let parsed = Url::parse(input.trim())
        .map_err(|_| ExtractError::InvalidInput(format!("could not parse '{}'", input.trim())))?;

    if let Some(playlist_id) = first_query_value(&parsed, "list") {
        return Ok(VideoSource::Playlist { playlist_id });
    }

    if let Some(video_id) = first_query_value(&parsed, "v") {
        return Ok(VideoSource::Video { video_id });
    }

    Err(ExtractError::InvalidInput(
        "missing 'v' or 'list' parameter".to_string(),
    ))
}

fn first_query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Catalog of videos hosted by the provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// List every video of a playlist in provider order
    async fn list_playlist(&self, playlist_id: &str) -> Result<Vec<VideoEntry>>;

    /// Fetch title and channel of a single video, `None` if the provider does not know it
    async fn video_info(&self, video_id: &str) -> Result<Option<(String, String)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_playlist_url() {
        let source = resolve_url("https://www.youtube.com/playlist?list=PL123").unwrap();
        assert_eq!(
            source,
            VideoSource::Playlist {
                playlist_id: "PL123".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_prefers_list_over_video() {
        let source = resolve_url("https://www.youtube.com/watch?v=abc&list=PL9&index=2").unwrap();
        assert_eq!(
            source,
            VideoSource::Playlist {
                playlist_id: "PL9".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_video_url() {
        let source = resolve_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(
            source,
            VideoSource::Video {
                video_id: "dQw4w9WgXcQ".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_rejects_urls_without_reference() {
        let err = resolve_url("https://www.youtube.com/feed/trending").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidInput(_)));

        let err = resolve_url("not a url").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidInput(_)));
    }

    #[test]
    fn test_watch_url() {
        let entry = VideoEntry::new("abc", "Intro", "ChannelA");
        assert_eq!(entry.watch_url(), "https://www.youtube.com/watch?v=abc");
    }
}
