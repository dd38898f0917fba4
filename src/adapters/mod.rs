//! Adapter interfaces for external systems.
//!
//! Every external collaborator sits behind a trait so the registration
//! pipeline and the study driver take injected handles instead of global
//! clients:
//! - `SpeechSynthesizer`: text → audio bytes (Google Cloud TTS)
//! - `VocabularyExtractor`: text → notable words with IPA (OpenAI)
//! - `ObjectStore`: audio bytes → public URL (Supabase Storage, local dir)
//! - `AudioPlayer`: plays a complete audio file to the end

pub mod google_tts;
pub mod openai;
pub mod player;
pub mod storage;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::ExtractedWord;

pub use google_tts::GoogleTts;
pub use openai::{parse_vocabulary, OpenAiVocabulary};
pub use player::{CommandPlayer, NullPlayer};
pub use storage::{LocalStorage, SupabaseStorage};

/// MIME type of synthesized audio
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Text-to-speech service
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Synthesize speech; an empty buffer means the service produced nothing
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Language-model vocabulary extraction
#[async_trait]
pub trait VocabularyExtractor: Send + Sync {
    fn name(&self) -> &str;

    /// Extract notable words with their IPA; an empty list is valid
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedWord>>;
}

/// Durable object storage with public URLs
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn name(&self) -> &str;

    /// Upload bytes under `key` and return a publicly retrievable URL
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Remove an object (used to clean up after a failed registration)
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Audio playback primitive
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    fn name(&self) -> &str;

    /// Play the asset at `url`, returning once playback finishes naturally.
    /// Dropping the future stops playback.
    async fn play(&self, url: &str) -> Result<()>;
}
