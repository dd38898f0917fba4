//! OpenAI chat-completions adapter for vocabulary extraction.
//!
//! The model is asked for a JSON object `{"words": [{"word", "ipa"}]}`.
//! Replies are validated by `parse_vocabulary`: a `words` array inside an
//! object, or a bare array, is accepted; anything else counts as no words.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::VocabularyExtractor;
use crate::domain::ExtractedWord;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "Extract CEFR B1 or higher level words from the user content and \
provide their American English pronunciations in IPA format. Return a JSON object of the form \
{\"words\": [{\"word\": \"...\", \"ipa\": \"...\"}]}. Return {\"words\": []} if there are none.";

/// OpenAI vocabulary extractor
pub struct OpenAiVocabulary {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiVocabulary {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from OPENAI_API_KEY
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = crate::config::secret("OPENAI_API_KEY")?;
        Ok(Self::new(api_key, model))
    }

    /// Point the client at an OpenAI-compatible endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body(&self, text: &str) -> Value {
        let messages = [
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: text,
            },
        ];

        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "response_format": { "type": "json_object" },
            "temperature": 0,
        })
    }
}

/// Validate a model reply and pull out the word list.
///
/// Accepted shapes: `{"words": [...]}` or `[...]`, where every entry is an
/// object with a non-empty `word`. `ipa` is optional and defaults to an
/// empty string. Entries that do not fit are skipped; a reply of any other
/// shape yields an empty list.
pub fn parse_vocabulary(content: &str) -> Vec<ExtractedWord> {
    let value: Value = match serde_json::from_str(content.trim()) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Vocabulary reply is not JSON, treating as empty");
            return Vec::new();
        }
    };

    let entries = match value {
        Value::Object(mut map) => match map.remove("words") {
            Some(Value::Array(entries)) => entries,
            _ => {
                warn!("Vocabulary reply has no `words` array, treating as empty");
                return Vec::new();
            }
        },
        Value::Array(entries) => entries,
        _ => {
            warn!("Vocabulary reply has unexpected shape, treating as empty");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<ExtractedWord>(entry).ok())
        .map(|w| ExtractedWord::new(w.word.trim(), w.ipa.trim()))
        .filter(|w| !w.word.is_empty())
        .collect()
}

#[async_trait]
impl VocabularyExtractor for OpenAiVocabulary {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract(&self, text: &str) -> Result<Vec<ExtractedWord>> {
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .await
            .context("Failed to call OpenAI")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI error ({}): {}", status, body.trim());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let words = parse_vocabulary(&content);
        debug!(count = words.len(), "Vocabulary extracted");
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_words_object() {
        let words = parse_vocabulary(r#"{"words": [{"word": "quiet", "ipa": "/ˈkwaɪ.ət/"}]}"#);
        assert_eq!(words, vec![ExtractedWord::new("quiet", "/ˈkwaɪ.ət/")]);
    }

    #[test]
    fn test_parse_bare_array() {
        let words = parse_vocabulary(
            r#"[{"word": "library", "ipa": "/ˈlaɪ.brer.i/"}, {"word": "quiet", "ipa": "/ˈkwaɪ.ət/"}]"#,
        );
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "library");
    }

    #[test]
    fn test_unexpected_shapes_are_empty() {
        assert!(parse_vocabulary("").is_empty());
        assert!(parse_vocabulary("not json").is_empty());
        assert!(parse_vocabulary("{}").is_empty());
        assert!(parse_vocabulary(r#"{"vocabulary": [{"word": "quiet"}]}"#).is_empty());
        assert!(parse_vocabulary(r#"{"words": "quiet"}"#).is_empty());
        assert!(parse_vocabulary("42").is_empty());
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let words = parse_vocabulary(
            r#"{"words": [{"word": "quiet", "ipa": "/ˈkwaɪ.ət/"}, {"ipa": "/x/"}, "loose", {"word": "  "}]}"#,
        );
        assert_eq!(words, vec![ExtractedWord::new("quiet", "/ˈkwaɪ.ət/")]);
    }

    #[test]
    fn test_missing_ipa_defaults_to_empty() {
        let words = parse_vocabulary(r#"{"words": [{"word": "quiet"}, {"word": "calm", "ipa": null}]}"#);
        assert_eq!(words, vec![ExtractedWord::new("quiet", "")]);
    }

    #[test]
    fn test_request_body() {
        let adapter = OpenAiVocabulary::new("KEY".to_string(), "gpt-4o-mini-2024-07-18");
        let body = adapter.request_body("The library is a quiet place.");

        assert_eq!(body["model"], "gpt-4o-mini-2024-07-18");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["temperature"], 0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "The library is a quiet place.");
    }
}
