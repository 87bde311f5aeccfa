use async_trait::async_trait;
use serde_json::Value;

use crate::config::TranslationConfig;
use crate::{ExtractError, Result};

/// Machine translation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`, detecting the source language
    async fn translate(&self, text: &str, target: &str) -> Result<String>;
}

/// Google Translate's public single-shot endpoint
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    max_chunk_chars: usize,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            max_chunk_chars: config.max_chunk_chars,
        }
    }

    async fn translate_chunk(&self, chunk: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.endpoint))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", chunk),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExtractError::Translation(format!(
                "translation request failed with HTTP {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        let mut translated = Vec::new();
        for chunk in split_into_chunks(text, self.max_chunk_chars) {
            if chunk.trim().is_empty() {
                translated.push(chunk);
                continue;
            }
            translated.push(self.translate_chunk(&chunk, target).await?);
        }

        Ok(translated.join("\n"))
    }
}

/// Pull the translated sentences out of `[[["translated", "original", ...], ...], ...]`
fn parse_translation(body: &Value) -> Result<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractError::Translation("unexpected translation response".to_string()))?;

    Ok(sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect())
}

/// Split text on line boundaries into pieces of at most `max_chars` characters.
///
/// A single line longer than the limit is cut on character boundaries.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current: Option<String> = None;
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if let Some(buf) = current.as_mut() {
            if current_len + 1 + line_len <= max_chars {
                buf.push('\n');
                buf.push_str(line);
                current_len += 1 + line_len;
                continue;
            }
            chunks.extend(current.take());
        }

        if line_len <= max_chars {
            current = Some(line.to_string());
            current_len = line_len;
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut pieces: Vec<String> = chars
            .chunks(max_chars)
            .map(|piece| piece.iter().collect())
            .collect();
        current = pieces.pop();
        current_len = current.as_ref().map_or(0, |piece| piece.chars().count());
        chunks.extend(pieces);
    }

    chunks.extend(current);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_split_keeps_short_text_whole() {
        assert_eq!(split_into_chunks("one\ntwo", 5000), vec!["one\ntwo"]);
        assert_eq!(split_into_chunks("", 10), vec![""]);
    }

    #[test]
    fn test_split_on_line_boundaries() {
        let chunks = split_into_chunks("aaaa\nbbbb\ncccc", 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
        assert_eq!(chunks.join("\n"), "aaaa\nbbbb\ncccc");
    }

    #[test]
    fn test_split_cuts_long_lines() {
        let chunks = split_into_chunks("abcdefgh\nij", 3);
        assert_eq!(chunks, vec!["abc", "def", "gh", "ij"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
    }

    #[test]
    fn test_parse_translation() {
        let body = json!([[["Hello ", "Olá ", null], ["world", "mundo", null]], null, "pt"]);
        assert_eq!(parse_translation(&body).unwrap(), "Hello world");
        assert!(parse_translation(&json!({"error": true})).is_err());
    }

    #[tokio::test]
    async fn test_google_translator_requests_auto_source() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("sl", "auto"))
            .and(query_param("tl", "en"))
            .and(query_param("q", "Olá mundo"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([[["Hello world", "Olá mundo"]], null, "pt"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(&TranslationConfig {
            endpoint: server.uri(),
            max_chunk_chars: 5000,
        });

        assert_eq!(translator.translate("Olá mundo", "en").await.unwrap(), "Hello world");
    }

    #[tokio::test]
    async fn test_google_translator_http_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let translator = GoogleTranslator::new(&TranslationConfig {
            endpoint: server.uri(),
            max_chunk_chars: 5000,
        });

        let err = translator.translate("texto", "en").await.unwrap_err();
        assert!(matches!(err, ExtractError::Translation(_)));
    }
}
