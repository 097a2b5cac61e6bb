//! The gateway trait the session controller drives.
//!
//! Implemented by the `engvantage-gateway` crate for the direct Gemini
//! client, the relay client, and the mock used in tests.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::{QuizQuestion, StudentLevel, TargetLanguage, Word};

/// Number of words requested per list load.
pub const DEFAULT_WORD_COUNT: usize = 10;

/// Boundary to the generative-AI service.
///
/// All intelligence (word generation, quiz generation, speech synthesis)
/// lives behind this trait; the controller treats it as opaque.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Human-readable gateway name (e.g. "gemini", "relay").
    fn name(&self) -> &str;

    /// Fetch a fresh vocabulary list for a level and target language.
    ///
    /// Malformed model output yields an empty list, not an error; errors are
    /// reserved for transport and API failures.
    async fn fetch_words(
        &self,
        level: StudentLevel,
        target_language: TargetLanguage,
        count: usize,
    ) -> Result<Vec<Word>, GatewayError>;

    /// Generate one multiple-choice question per word (bounded at twice the
    /// word count). An empty word list short-circuits to an empty quiz
    /// without a network call.
    async fn generate_quiz(&self, words: &[Word]) -> Result<Vec<QuizQuestion>, GatewayError>;

    /// Synthesize and immediately play pronunciation audio for `text`.
    ///
    /// The audio buffer is not returned and playback cannot be cancelled.
    /// `language` is a free-form instruction hint ("English" everywhere
    /// today).
    async fn synthesize_speech(&self, text: &str, language: &str) -> Result<(), GatewayError>;
}
