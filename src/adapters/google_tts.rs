//! Google Cloud Text-to-Speech adapter (REST, API key auth).

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SpeechSynthesizer;
use crate::config::VoiceSettings;

const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Google Cloud TTS client
pub struct GoogleTts {
    api_key: String,
    endpoint: String,
    voice: VoiceSettings,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: TextInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

impl GoogleTts {
    pub fn new(api_key: String, voice: VoiceSettings) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            voice,
            client: reqwest::Client::new(),
        }
    }

    /// Create from GOOGLE_TTS_API_KEY
    pub fn from_env(voice: VoiceSettings) -> Result<Self> {
        let api_key = crate::config::secret("GOOGLE_TTS_API_KEY")?;
        Ok(Self::new(api_key, voice))
    }

    /// Point the client at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body<'a>(&'a self, text: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: TextInput { text },
            voice: VoiceSelection {
                language_code: &self.voice.language_code,
                name: &self.voice.name,
                ssml_gender: &self.voice.gender,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: self.voice.speaking_rate,
            },
        }
    }
}

/// Decode the base64 `audioContent` field; missing content decodes to empty
fn decode_audio(response: SynthesizeResponse) -> Result<Vec<u8>> {
    match response.audio_content {
        Some(encoded) if !encoded.is_empty() => STANDARD
            .decode(encoded.as_bytes())
            .context("TTS audioContent is not valid base64"),
        _ => Ok(Vec::new()),
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    fn name(&self) -> &str {
        "google-tts"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(text))
            .send()
            .await
            .context("Failed to call Google TTS")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Google TTS error ({}): {}", status, body.trim());
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .context("Failed to parse Google TTS response")?;

        let audio = decode_audio(parsed)?;
        debug!(bytes = audio.len(), "Speech synthesized");
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let tts = GoogleTts::new("KEY".to_string(), VoiceSettings::default());
        let body = serde_json::to_value(tts.request_body("Hello there")).unwrap();

        assert_eq!(body["input"]["text"], "Hello there");
        assert_eq!(body["voice"]["languageCode"], "en-US");
        assert_eq!(body["voice"]["name"], "en-US-Wavenet-D");
        assert_eq!(body["voice"]["ssmlGender"], "MALE");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
        assert!((body["audioConfig"]["speakingRate"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_decode_audio() {
        let response: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": "SUQz"}"#).unwrap();
        assert_eq!(decode_audio(response).unwrap(), b"ID3".to_vec());

        let empty: SynthesizeResponse = serde_json::from_str("{}").unwrap();
        assert!(decode_audio(empty).unwrap().is_empty());

        let invalid: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": "***"}"#).unwrap();
        assert!(decode_audio(invalid).is_err());
    }
}
