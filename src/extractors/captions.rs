use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

use super::VideoEntry;
use crate::config::YoutubeConfig;
use crate::{ExtractError, Result};

/// Client version sent to the player API
const ANDROID_CLIENT_VERSION: &str = "20.10.38";

/// Form action of the cookie consent interstitial served in the EU
const CONSENT_FORM_MARKER: &str = r#"action="https://consent.youtube.com/s""#;

static INNERTUBE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("innertube key pattern")
});
static CONSENT_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("consent value pattern"));
static TEXT_ELEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").expect("text element pattern"));
static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("attribute pattern"));
static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern"));

/// One timed line of a caption track
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Why no provider transcript could be used for a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    Disabled,
    NotFound { languages: Vec<String> },
    Unavailable(String),
    Empty,
    Other(String),
}

/// Result of asking the provider for a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    Found(String),
    Missing(FetchFailure),
}

impl FetchFailure {
    /// Message shown to the operator
    pub fn describe(&self, title: &str) -> String {
        match self {
            FetchFailure::Disabled => format!("Transcripts are disabled for '{}'", title),
            FetchFailure::NotFound { languages } => format!(
                "No transcript found for '{}' in requested languages ({})",
                title,
                languages.join(", ")
            ),
            FetchFailure::Unavailable(_) => format!(
                "Could not retrieve transcript for '{}'; may be blocked or private",
                title
            ),
            FetchFailure::Empty => format!(
                "Unexpected error fetching transcript for '{}': {}",
                title,
                ExtractError::EmptyTranscript
            ),
            FetchFailure::Other(message) => format!(
                "Unexpected error fetching transcript for '{}': {}",
                title, message
            ),
        }
    }

    /// Short reason recorded in the skip log
    pub fn reason(&self) -> String {
        match self {
            FetchFailure::Disabled => "transcripts disabled".to_string(),
            FetchFailure::NotFound { languages } => {
                format!("no transcript in {}", languages.join(", "))
            }
            FetchFailure::Unavailable(reason) => format!("transcript unavailable ({})", reason),
            FetchFailure::Empty => "empty transcript".to_string(),
            FetchFailure::Other(message) => format!("transcript error ({})", message),
        }
    }
}

impl From<ExtractError> for FetchFailure {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::TranscriptsDisabled(_) => FetchFailure::Disabled,
            ExtractError::NoTranscriptFound { languages, .. } => FetchFailure::NotFound { languages },
            ExtractError::TranscriptUnavailable { reason, .. } => FetchFailure::Unavailable(reason),
            ExtractError::EmptyTranscript => FetchFailure::Empty,
            other => FetchFailure::Other(other.to_string()),
        }
    }
}

/// Provider of timed caption tracks
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the first available track among `languages`, in preference order
    async fn fetch_segments(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSegment>>;
}

/// Ask the provider for a transcript and classify the failure, if any
pub async fn fetch_transcript(
    source: &dyn TranscriptSource,
    video: &VideoEntry,
    languages: &[String],
) -> TranscriptOutcome {
    let segments = match source.fetch_segments(&video.id, languages).await {
        Ok(segments) => segments,
        Err(err) => {
            tracing::debug!(video_id = %video.id, error = %err, "Provider transcript unavailable");
            return TranscriptOutcome::Missing(err.into());
        }
    };

    if segments.is_empty() {
        return TranscriptOutcome::Missing(FetchFailure::Empty);
    }

    let text = segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    TranscriptOutcome::Found(text)
}

#[derive(Debug, Clone)]
struct CaptionTrack {
    language_code: String,
    base_url: String,
    is_generated: bool,
}

/// Caption track client speaking the watch page / player API protocol
pub struct CaptionClient {
    client: reqwest::Client,
    watch_base: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: Option<String>,
    language_code: Option<String>,
    kind: Option<String>,
}

impl CaptionClient {
    pub fn new(config: &YoutubeConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            watch_base: config.watch_base.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_video_html(&self, video_id: &str) -> Result<String> {
        let html = self.get_watch_page(video_id, None).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        let cookie = consent_cookie(&html, video_id)?;
        tracing::debug!(video_id, "Consent page served, retrying with consent cookie");

        let html = self.get_watch_page(video_id, Some(&cookie)).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(ExtractError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: "cookie consent could not be given".to_string(),
            });
        }

        Ok(html)
    }

    async fn get_watch_page(&self, video_id: &str, cookie: Option<&str>) -> Result<String> {
        let mut request = self
            .client
            .get(format!("{}/watch", self.watch_base))
            .query(&[("v", video_id)]);
        if let Some(cookie) = cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await?;
        check_http_errors(&response, video_id)?;
        Ok(response.text().await?)
    }

    async fn fetch_player_data(&self, video_id: &str, api_key: &str) -> Result<Value> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": ANDROID_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let response = self
            .client
            .post(format!("{}/youtubei/v1/player", self.watch_base))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        check_http_errors(&response, video_id)?;
        Ok(response.json().await?)
    }

    async fn fetch_track(&self, video_id: &str, track: &CaptionTrack) -> Result<Vec<TranscriptSegment>> {
        if track.base_url.contains("&exp=xpe") {
            return Err(ExtractError::TranscriptUnavailable {
                video_id: video_id.to_string(),
                reason: "a PO token is required".to_string(),
            });
        }

        let response = self.client.get(&track.base_url).send().await?;
        check_http_errors(&response, video_id)?;

        let xml = response.text().await?;
        Ok(parse_timedtext(&xml))
    }
}

#[async_trait]
impl TranscriptSource for CaptionClient {
    async fn fetch_segments(&self, video_id: &str, languages: &[String]) -> Result<Vec<TranscriptSegment>> {
        let html = self.fetch_video_html(video_id).await?;
        let api_key = extract_innertube_api_key(&html, video_id)?;
        let player = self.fetch_player_data(video_id, &api_key).await?;

        assert_playability(video_id, &player)?;
        let tracks = extract_caption_tracks(video_id, &player)?;
        let track = select_track(&tracks, languages).ok_or_else(|| ExtractError::NoTranscriptFound {
            video_id: video_id.to_string(),
            languages: languages.to_vec(),
        })?;

        tracing::debug!(
            video_id,
            language = %track.language_code,
            generated = track.is_generated,
            "Fetching caption track"
        );

        self.fetch_track(video_id, track).await
    }
}

fn check_http_errors(response: &reqwest::Response, video_id: &str) -> Result<()> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ExtractError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: "too many requests, IP blocked".to_string(),
        });
    }

    if !status.is_success() {
        return Err(ExtractError::Provider(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )));
    }

    Ok(())
}

fn extract_innertube_api_key(html: &str, video_id: &str) -> Result<String> {
    if html.contains("g-recaptcha") {
        return Err(ExtractError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: "IP blocked by captcha".to_string(),
        });
    }

    INNERTUBE_KEY_RE
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|key| key.as_str().to_string())
        .ok_or_else(|| ExtractError::Parse(format!("player key not found for {}", video_id)))
}

/// `CONSENT=YES+<v>` built from the hidden `v` field of the consent form
fn consent_cookie(html: &str, video_id: &str) -> Result<String> {
    CONSENT_VALUE_RE
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|value| format!("CONSENT=YES+{}", value.as_str()))
        .ok_or_else(|| ExtractError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: "cookie consent form without a consent value".to_string(),
        })
}

fn assert_playability(video_id: &str, player: &Value) -> Result<()> {
    let Some(status) = player.get("playabilityStatus") else {
        return Ok(());
    };

    let state = status.get("status").and_then(Value::as_str).unwrap_or("OK");
    if state == "OK" {
        return Ok(());
    }

    let reason = status
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or(state)
        .to_string();

    Err(ExtractError::TranscriptUnavailable {
        video_id: video_id.to_string(),
        reason,
    })
}

fn extract_caption_tracks(video_id: &str, player: &Value) -> Result<Vec<CaptionTrack>> {
    let Some(renderer) = player
        .get("captions")
        .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
    else {
        return Err(ExtractError::TranscriptsDisabled(video_id.to_string()));
    };

    let raw: Vec<RawCaptionTrack> = renderer
        .get("captionTracks")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| ExtractError::Parse(e.to_string()))?
        .unwrap_or_default();

    let tracks: Vec<CaptionTrack> = raw
        .into_iter()
        .filter_map(|track| {
            Some(CaptionTrack {
                language_code: track.language_code?,
                base_url: track.base_url?.replace("&fmt=srv3", ""),
                is_generated: track.kind.as_deref() == Some("asr"),
            })
        })
        .collect();

    if tracks.is_empty() {
        return Err(ExtractError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(tracks)
}

/// Manually created tracks win over generated ones within the same language
fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|language| {
        tracks
            .iter()
            .filter(|track| &track.language_code == language)
            .min_by_key(|track| track.is_generated)
    })
}

/// Parse a timedtext XML document into segments
pub fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();
    for captures in TEXT_ELEMENT_RE.captures_iter(xml) {
        let mut start = 0.0;
        let mut duration = 0.0;
        for attr in ATTRIBUTE_RE.captures_iter(&captures[1]) {
            match &attr[1] {
                "start" => start = attr[2].parse().unwrap_or(0.0),
                "dur" => duration = attr[2].parse().unwrap_or(0.0),
                _ => {}
            }
        }

        // Entities arrive escaped twice: once by XML, once by HTML.
        let text = unescape_entities(&unescape_entities(&captures[2]));
        let text = MARKUP_RE.replace_all(&text, "").into_owned();
        if text.trim().is_empty() {
            continue;
        }

        segments.push(TranscriptSegment {
            text,
            start,
            duration,
        });
    }

    segments
}

fn unescape_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => entity[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
