use async_trait::async_trait;
use serde::Deserialize;

use super::{VideoCatalog, VideoEntry};
use crate::config::YoutubeConfig;
use crate::{ExtractError, Result};

/// Page size accepted by `playlistItems`
const PAGE_SIZE: &str = "50";

/// Client for the YouTube Data API v3
pub struct YoutubeApi {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsPage {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    title: String,
    resource_id: ResourceId,
    video_owner_channel_title: Option<String>,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: String,
}

impl PlaylistSnippet {
    fn into_entry(self) -> VideoEntry {
        let channel_name = self
            .video_owner_channel_title
            .or(self.channel_title)
            .unwrap_or_else(|| "Unknown".to_string());

        VideoEntry {
            id: self.resource_id.video_id,
            title: self.title,
            channel_name,
        }
    }
}

impl YoutubeApi {
    pub fn new(config: &YoutubeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &YoutubeConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn key_param(&self) -> Vec<(&'static str, String)> {
        self.api_key
            .iter()
            .map(|key| ("key", key.clone()))
            .collect()
    }

    async fn fetch_page(&self, playlist_id: &str, page_token: &str) -> Result<PlaylistItemsPage> {
        let response = self
            .client
            .get(format!("{}/playlistItems", self.api_base))
            .query(&[
                ("part", "snippet"),
                ("playlistId", playlist_id),
                ("maxResults", PAGE_SIZE),
                ("pageToken", page_token),
            ])
            .query(&self.key_param())
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Provider(format!(
                "Failed to fetch playlist videos: {}",
                body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoCatalog for YoutubeApi {
    async fn list_playlist(&self, playlist_id: &str) -> Result<Vec<VideoEntry>> {
        let mut entries = Vec::new();
        let mut page_token = String::new();

        loop {
            tracing::debug!(playlist_id, page_token = %page_token, "Fetching playlist page");
            let page = self.fetch_page(playlist_id, &page_token).await?;

            entries.extend(page.items.into_iter().map(|item| item.snippet.into_entry()));

            match page.next_page_token {
                Some(token) => page_token = token,
                None => break,
            }
        }

        tracing::info!(playlist_id, count = entries.len(), "Playlist enumerated");
        Ok(entries)
    }

    async fn video_info(&self, video_id: &str) -> Result<Option<(String, String)>> {
        let response = self
            .client
            .get(format!("{}/videos", self.api_base))
            .query(&[("part", "snippet"), ("id", video_id)])
            .query(&self.key_param())
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(video_id, status = %response.status(), "Video details request failed");
            return Ok(None);
        }

        let body: VideoListResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .next()
            .map(|item| (item.snippet.title, item.snippet.channel_title)))
    }
}
