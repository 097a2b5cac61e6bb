//! Relay gateway.
//!
//! Sends every call as a single POST to one fixed endpoint. The body is the
//! provider request verbatim plus the model id; the relay holds the API key
//! server-side and forwards the request unmodified. Replies come back in
//! either wire shape (flat `text` or nested candidates) and are unwrapped by
//! `normalize_reply`.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
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

const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_VOICE: &str = "Kore";

#[derive(Serialize)]
struct RelayRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a GenerateContentRequest,
}

/// Gateway calling a credential-holding relay backend.
pub struct RelayGateway {
    endpoint: String,
    text_model: String,
    tts_model: String,
    voice: String,
    client: reqwest::Client,
    player: Arc<dyn SpeechPlayer>,
}

impl RelayGateway {
    pub fn new(endpoint: &str, player: Arc<dyn SpeechPlayer>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
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

    async fn forward(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&RelayRequest { model, request })
            .send()
            .await
            .map_err(transport_error)?;

        let response = error_for_status(response).await?;
        response.text().await.map_err(transport_error)
    }
}

#[async_trait]
impl ContentGateway for RelayGateway {
    fn name(&self) -> &str {
        "relay"
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint, %level, language = %target_language))]
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
        let body = self.forward(&self.text_model, &request).await?;
        let text = text_or_empty(normalize_reply(&body), "word fetch");
        Ok(parse_words(&text, level))
    }

    #[instrument(skip(self, words), fields(endpoint = %self.endpoint, words = words.len()))]
    async fn generate_quiz(&self, words: &[Word]) -> Result<Vec<QuizQuestion>, GatewayError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let request = GenerateContentRequest::text(
            &quiz_prompt(words),
            Some(json_generation_config(quiz_schema())),
        );
        let body = self.forward(&self.text_model, &request).await?;
        let text = text_or_empty(normalize_reply(&body), "quiz generation");
        Ok(parse_quiz(&text, words))
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn synthesize_speech(&self, text: &str, language: &str) -> Result<(), GatewayError> {
        let request = GenerateContentRequest::text(
            &speech_prompt(text, language),
            Some(audio_generation_config(&self.voice)),
        );
        let body = self.forward(&self.tts_model, &request).await?;

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

#[cfg(test)]
mod tests {
    use super::*;

    use engvantage_core::audio::NullPlayer;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> RelayGateway {
        RelayGateway::new(&format!("{}/api/generate", server.uri()), Arc::new(NullPlayer))
    }

    const WORDS_JSON: &str = r#"[
        {"word": "notice", "phonetic": "/ˈnoʊtɪs/", "definition": "to become aware",
         "translation": "注意", "exampleSentence": "I noticed a change.",
         "exampleTranslation": "我注意到一個變化。"}
    ]"#;

    #[tokio::test]
    async fn relay_unwraps_flat_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "gemini-3-flash-preview"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": WORDS_JSON})),
            )
            .mount(&server)
            .await;

        let words = gateway(&server)
            .fetch_words(StudentLevel::JuniorHigh, TargetLanguage::TraditionalChinese, 1)
            .await
            .unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "notice");
    }

    #[tokio::test]
    async fn relay_unwraps_nested_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": WORDS_JSON}]}}]
            })))
            .mount(&server)
            .await;

        let words = gateway(&server)
            .fetch_words(StudentLevel::JuniorHigh, TargetLanguage::TraditionalChinese, 1)
            .await
            .unwrap();
        assert_eq!(words.len(), 1);
    }

    #[tokio::test]
    async fn relay_body_carries_request_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "gemini-3-flash-preview",
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "[]"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let words = gateway(&server)
            .fetch_words(StudentLevel::SeniorHigh, TargetLanguage::Japanese, 10)
            .await
            .unwrap();
        assert!(words.is_empty());
    }

    #[tokio::test]
    async fn relay_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .fetch_words(StudentLevel::JuniorHigh, TargetLanguage::TraditionalChinese, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ApiError { status: 502, .. }));
    }
}
