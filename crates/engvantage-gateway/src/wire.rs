//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Requests declare a JSON response schema so the model is constrained to
//! the shapes the parsers expect. Responses arrive in two shapes across
//! provider and relay: a top-level `text` field, or the nested
//! `candidates[0].content.parts[0].text`; `normalize_reply` folds both into
//! one tagged result so callers match exhaustively instead of probing
//! optional fields.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

impl GenerateContentRequest {
    /// A plain text prompt with an optional generation config.
    pub fn text(prompt: &str, config: Option<GenerationConfig>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: config,
        }
    }
}

/// Declared schema for the word-list response: an array of objects with the
/// six required string fields.
pub fn word_list_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "word": { "type": "STRING" },
                "phonetic": { "type": "STRING" },
                "definition": { "type": "STRING" },
                "translation": { "type": "STRING" },
                "exampleSentence": { "type": "STRING" },
                "exampleTranslation": { "type": "STRING" },
            },
            "required": [
                "word", "phonetic", "definition", "translation",
                "exampleSentence", "exampleTranslation",
            ],
        },
    })
}

/// Declared schema for the quiz response. `wordId` and `type` are extension
/// fields the parser treats as optional.
pub fn quiz_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                "correctAnswer": { "type": "STRING" },
                "wordId": {
                    "type": "STRING",
                    "description": "The actual word this question is testing",
                },
                "type": { "type": "STRING", "enum": ["meaning", "completion"] },
            },
            "required": ["question", "options", "correctAnswer", "wordId", "type"],
        },
    })
}

/// JSON generation config constraining the reply to `schema`.
pub fn json_generation_config(schema: serde_json::Value) -> GenerationConfig {
    GenerationConfig {
        response_mime_type: Some("application/json".to_string()),
        response_schema: Some(schema),
        ..GenerationConfig::default()
    }
}

/// Audio generation config with a prebuilt voice.
pub fn audio_generation_config(voice: &str) -> GenerationConfig {
    GenerationConfig {
        response_modalities: vec!["AUDIO".to_string()],
        speech_config: Some(SpeechConfig {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: voice.to_string(),
                },
            },
        }),
        ..GenerationConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Convenience text field some relays flatten the reply into.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

/// Failure modes of reply normalization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyShapeError {
    /// The body was valid JSON but carried no text payload in either shape.
    #[error("reply carries no text payload")]
    MissingField,
    /// The body was not valid JSON at all.
    #[error("reply is not valid JSON: {0}")]
    ParseError(String),
}

/// Extract the generated text from a raw response body.
///
/// Accepts both shapes the boundary produces: a top-level `text` field (the
/// relay's flattened form) and the provider's nested
/// `candidates[0].content.parts[0].text`.
pub fn normalize_reply(body: &str) -> Result<String, ReplyShapeError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ReplyShapeError::ParseError(e.to_string()))?;
    reply_text(&response).ok_or(ReplyShapeError::MissingField)
}

/// The generated text of an already-deserialized response, if present.
pub fn reply_text(response: &GenerateContentResponse) -> Option<String> {
    if let Some(text) = &response.text {
        return Some(text.clone());
    }
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .text
        .clone()
}

/// The inline audio payload of a speech response, if present.
pub fn reply_audio(response: &GenerateContentResponse) -> Option<&InlineData> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .inline_data
        .as_ref()
}
