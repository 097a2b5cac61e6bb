//! Direct Gemini API gateway.
//!
//! Talks to `generateContent` with a locally-held API key. Word and quiz
//! replies are schema-constrained JSON; speech replies carry inline PCM16
//! audio that is decoded and handed straight to the player.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::instrument;

use engvantage_core::audio::{AudioClip, SpeechPlayer};
use engvantage_core::error::GatewayError;
use engvantage_core::model::{QuizQuestion, StudentLevel, TargetLanguage, Word};
use engvantage_core::traits::ContentGateway;

use crate::http::{build_client, error_for_status, transport_error};
use crate::parse::{parse_quiz, parse_words, text_or_empty};
use crate::prompt::{quiz_prompt, speech_prompt, words_prompt};
use crate::wire::{
    audio_generation_config, json_generation_config, normalize_reply, quiz_schema, reply_audio,
    word_list_schema, GenerateContentRequest, GenerateContentResponse,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_VOICE: &str = "Kore";

/// Gateway calling the Gemini API directly.
pub struct GeminiGateway {
    api_key: String,
    base_url: String,
    text_model: String,
    tts_model: String,
    voice: String,
    client: reqwest::Client,
    player: Arc<dyn SpeechPlayer>,
}

impl GeminiGateway {
    pub fn new(api_key: &str, base_url: Option<String>, player: Arc<dyn SpeechPlayer>) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            client: build_client(),
            player,
        }
    }

    /// Override the default model and voice ids.
    pub fn with_models(
        mut self,
        text_model: Option<String>,
        tts_model: Option<String>,
        voice: Option<String>,
    ) -> Self {
        if let Some(m) = text_model {
            self.text_model = m;
        }
        if let Some(m) = tts_model {
            self.tts_model = m;
        }
        if let Some(v) = voice {
            self.voice = v;
        }
        self
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let response = error_for_status(response).await?;
        response.text().await.map_err(transport_error)
    }
}

#[async_trait]
impl ContentGateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self), fields(model = %self.text_model, %level, language = %target_language))]
    async fn fetch_words(
        &self,
        level: StudentLevel,
        target_language: TargetLanguage,
        count: usize,
    ) -> Result<Vec<Word>, GatewayError> {
        let request = GenerateContentRequest::text(
            &words_prompt(level, target_language, count),
            Some(json_generation_config(word_list_schema())),
        );
        let body = self.generate(&self.text_model, &request).await?;
        let text = text_or_empty(normalize_reply(&body), "word fetch");
        Ok(parse_words(&text, level))
    }

    #[instrument(skip(self, words), fields(model = %self.text_model, words = words.len()))]
    async fn generate_quiz(&self, words: &[Word]) -> Result<Vec<QuizQuestion>, GatewayError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let request = GenerateContentRequest::text(
            &quiz_prompt(words),
            Some(json_generation_config(quiz_schema())),
        );
        let body = self.generate(&self.text_model, &request).await?;
        let text = text_or_empty(normalize_reply(&body), "quiz generation");
        Ok(parse_quiz(&text, words))
    }

    #[instrument(skip(self), fields(model = %self.tts_model))]
    async fn synthesize_speech(&self, text: &str, language: &str) -> Result<(), GatewayError> {
        let request = GenerateContentRequest::text(
            &speech_prompt(text, language),
            Some(audio_generation_config(&self.voice)),
        );
        let body = self.generate(&self.tts_model, &request).await?;

        let response: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::ApiError {
                status: 0,
                message: format!("failed to parse speech response: {e}"),
            })?;
        let inline = reply_audio(&response).ok_or(GatewayError::MissingAudio)?;
        let pcm = BASE64
            .decode(&inline.data)
            .map_err(|e| GatewayError::ApiError {
                status: 0,
                message: format!("invalid audio payload: {e}"),
            })?;

        self.player.play(AudioClip::from_pcm16(&pcm));
        Ok(())
    }
}
