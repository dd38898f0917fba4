//! QA registration pipeline.
//!
//! Turns a question, an answer and a category into one complete card:
//! 1. Check identity and inputs (no external call happens before this)
//! 2. Fan out: synthesize + upload question audio, synthesize + upload
//!    answer audio, extract vocabulary from the answer
//! 3. Fan in: wait for all three to settle
//! 4. Persist card → question → answer → words in one transaction
//!
//! If anything fails after audio was uploaded, the uploaded objects are
//! deleted again on a best-effort basis.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{ObjectStore, SpeechSynthesizer, VocabularyExtractor, AUDIO_CONTENT_TYPE};
use crate::auth::{require_user, UserId};
use crate::config::LimitSettings;
use crate::domain::{Answer, Card, ExtractedWord, Question, RegisteredCard, Word};
use crate::error::{MyeltsError, Result};
use crate::store::Database;

use super::validation::{require_field, validate_card_text};

const SPEECH_SERVICE: &str = "speech synthesis";
const STORAGE_SERVICE: &str = "object storage";
const VOCABULARY_SERVICE: &str = "vocabulary extraction";

/// Input of one registration
#[derive(Debug, Clone)]
pub struct QaInput {
    pub question: String,
    pub answer: String,
    pub category_id: String,
}

impl QaInput {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category_id: category_id.into(),
        }
    }
}

/// Registration pipeline with injected service handles
pub struct Registrar {
    speech: Arc<dyn SpeechSynthesizer>,
    vocabulary: Arc<dyn VocabularyExtractor>,
    storage: Arc<dyn ObjectStore>,
    db: Database,
    limits: LimitSettings,
}

impl Registrar {
    pub fn new(
        speech: Arc<dyn SpeechSynthesizer>,
        vocabulary: Arc<dyn VocabularyExtractor>,
        storage: Arc<dyn ObjectStore>,
        db: Database,
    ) -> Self {
        Self {
            speech,
            vocabulary,
            storage,
            db,
            limits: LimitSettings::default(),
        }
    }

    pub fn with_limits(mut self, limits: LimitSettings) -> Self {
        self.limits = limits;
        self
    }

    /// Register one question/answer pair for `user`
    #[instrument(skip(self, user, input), fields(category_id = %input.category_id))]
    pub async fn register_qa(&self, user: Option<&UserId>, input: QaInput) -> Result<RegisteredCard> {
        let user = require_user(user)?;

        let max_chars = self.limits.max_text_chars;
        let question = validate_card_text("question", &input.question, max_chars)?;
        let answer = validate_card_text("answer", &input.answer, max_chars)?;
        let category_id = require_field("category", &input.category_id)?;

        if self.db.categories().get(category_id)?.is_none() {
            return Err(MyeltsError::Validation(format!(
                "unknown category: {}",
                category_id
            )));
        }

        info!(%user, "Starting QA registration");

        // Fan out, then wait for every branch to settle
        let ((question_key, question_audio), (answer_key, answer_audio), words) = tokio::join!(
            self.generate_speech(question),
            self.generate_speech(answer),
            self.extract_vocabulary(answer),
        );

        // Includes uploads that failed or timed out: the object may exist anyway
        let uploaded: Vec<String> = [question_key, answer_key].into_iter().flatten().collect();

        let (question_audio, answer_audio, words) = match (question_audio, answer_audio, words) {
            (Ok(q), Ok(a), Ok(w)) => (q, a, w),
            (q, a, w) => {
                let err = [q.err(), a.err(), w.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .unwrap_or_else(|| MyeltsError::upstream(SPEECH_SERVICE, "unknown failure"));
                error!(error = %err, "Generation failed, nothing persisted");
                self.discard_uploads(&uploaded).await;
                return Err(err);
            }
        };

        let card = Card::new(user.as_str(), category_id);
        let question = Question::new(&card.id, question, question_audio);
        let answer = Answer::new(&card.id, answer, answer_audio);
        let words = words.iter().map(|w| Word::new(&answer.id, w)).collect();

        let registered = RegisteredCard {
            card,
            question,
            answer,
            words,
        };

        if let Err(e) = self.db.cards().insert_registration(&registered) {
            error!(error = %e, "Failed to persist card");
            self.discard_uploads(&uploaded).await;
            return Err(e);
        }

        info!(
            card_id = %registered.card.id,
            words = registered.words.len(),
            "QA registration completed"
        );

        Ok(registered)
    }

    /// Synthesize `text` and upload it. Returns the object key once an
    /// upload was attempted, alongside the public URL or the failure.
    async fn generate_speech(&self, text: &str) -> (Option<String>, Result<String>) {
        let audio = match self.bounded(SPEECH_SERVICE, self.speech.synthesize(text)).await {
            Ok(audio) if audio.is_empty() => {
                return (
                    None,
                    Err(MyeltsError::upstream(SPEECH_SERVICE, "empty audio content")),
                );
            }
            Ok(audio) => audio,
            Err(e) => return (None, Err(e)),
        };

        let key = format!("tts/{}.mp3", Uuid::new_v4());
        let result = self
            .bounded(
                STORAGE_SERVICE,
                self.storage.upload(&key, audio, AUDIO_CONTENT_TYPE),
            )
            .await;

        if let Ok(url) = &result {
            debug!(%key, %url, "Audio stored");
        }
        (Some(key), result)
    }

    async fn extract_vocabulary(&self, text: &str) -> Result<Vec<ExtractedWord>> {
        self.bounded(VOCABULARY_SERVICE, self.vocabulary.extract(text))
            .await
    }

    /// Run an adapter call under the upstream timeout
    async fn bounded<T>(
        &self,
        service: &'static str,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T> {
        let timeout = self.limits.upstream_timeout();
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(MyeltsError::upstream(service, format!("{:#}", e))),
            Err(_) => Err(MyeltsError::upstream(
                service,
                format!("timed out after {:?}", timeout),
            )),
        }
    }

    /// Delete uploaded assets that no card will reference
    async fn discard_uploads(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                warn!(%key, error = %e, "Failed to delete orphaned audio");
            }
        }
    }
}
