//! Mock gateway for testing the session controller without real API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use engvantage_core::error::GatewayError;
use engvantage_core::model::{QuizKind, QuizQuestion, StudentLevel, TargetLanguage, Word};
use engvantage_core::traits::ContentGateway;

/// The last word-fetch request the mock saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRequest {
    pub level: StudentLevel,
    pub target_language: TargetLanguage,
    pub count: usize,
}

struct ScriptedFetch {
    delay: Duration,
    /// `None` synthesizes the default well-formed batch after the delay.
    outcome: Option<Result<Vec<Word>, GatewayError>>,
}

/// Configurable gateway double.
///
/// By default it synthesizes well-formed words for any request and one
/// meaning question per word, immediately. Individual fetches can be
/// scripted (delayed, failed, or replaced) in FIFO order for race and
/// failure tests.
pub struct MockGateway {
    fetch_script: Mutex<VecDeque<ScriptedFetch>>,
    fail_speech: AtomicBool,
    fetch_calls: AtomicU32,
    quiz_calls: AtomicU32,
    speech_calls: AtomicU32,
    last_fetch: Mutex<Option<WordRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            fetch_script: Mutex::new(VecDeque::new()),
            fail_speech: AtomicBool::new(false),
            fetch_calls: AtomicU32::new(0),
            quiz_calls: AtomicU32::new(0),
            speech_calls: AtomicU32::new(0),
            last_fetch: Mutex::new(None),
        }
    }

    /// Delay the next fetch, keeping the default synthesized batch.
    pub fn delay_next_fetch(&self, delay: Duration) {
        self.fetch_script
            .lock()
            .unwrap()
            .push_back(ScriptedFetch { delay, outcome: None });
    }

    /// Fail the next fetch with the given error.
    pub fn fail_next_fetch(&self, error: GatewayError) {
        self.fetch_script.lock().unwrap().push_back(ScriptedFetch {
            delay: Duration::ZERO,
            outcome: Some(Err(error)),
        });
    }

    /// Answer the next fetch with an explicit batch after a delay.
    pub fn queue_words(&self, delay: Duration, words: Vec<Word>) {
        self.fetch_script.lock().unwrap().push_back(ScriptedFetch {
            delay,
            outcome: Some(Ok(words)),
        });
    }

    /// Make every speech request fail with `MissingAudio`.
    pub fn fail_speech(&self) {
        self.fail_speech.store(true, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn quiz_calls(&self) -> u32 {
        self.quiz_calls.load(Ordering::SeqCst)
    }

    pub fn speech_calls(&self) -> u32 {
        self.speech_calls.load(Ordering::SeqCst)
    }

    pub fn last_fetch(&self) -> Option<WordRequest> {
        *self.last_fetch.lock().unwrap()
    }

    /// Synthesize a well-formed batch the way the default fetch does.
    pub fn sample_words(
        count: usize,
        level: StudentLevel,
        target_language: TargetLanguage,
    ) -> Vec<Word> {
        (0..count)
            .map(|i| Word {
                id: Uuid::new_v4(),
                word: format!("word-{i}"),
                phonetic: format!("/wɜːd{i}/"),
                definition: format!("definition of word-{i}"),
                translation: format!("{target_language} rendering {i}"),
                example_sentence: format!("This is example sentence {i}."),
                example_translation: format!("{target_language} example {i}"),
                level,
                learned: false,
            })
            .collect()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_words(
        &self,
        level: StudentLevel,
        target_language: TargetLanguage,
        count: usize,
    ) -> Result<Vec<Word>, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_fetch.lock().unwrap() = Some(WordRequest {
            level,
            target_language,
            count,
        });

        let step = self.fetch_script.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                tokio::time::sleep(step.delay).await;
                step.outcome
                    .unwrap_or_else(|| Ok(Self::sample_words(count, level, target_language)))
            }
            None => Ok(Self::sample_words(count, level, target_language)),
        }
    }

    async fn generate_quiz(&self, words: &[Word]) -> Result<Vec<QuizQuestion>, GatewayError> {
        if words.is_empty() {
            return Ok(Vec::new());
        }
        self.quiz_calls.fetch_add(1, Ordering::SeqCst);
        Ok(words
            .iter()
            .map(|w| QuizQuestion {
                question: format!("What does '{}' mean?", w.word),
                options: vec![
                    w.definition.clone(),
                    "something else".into(),
                    "a third thing".into(),
                    "none of these".into(),
                ],
                correct_answer: w.definition.clone(),
                word: w.word.clone(),
                kind: QuizKind::Meaning,
            })
            .collect())
    }

    async fn synthesize_speech(&self, _text: &str, _language: &str) -> Result<(), GatewayError> {
        self.speech_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_speech.load(Ordering::SeqCst) {
            return Err(GatewayError::MissingAudio);
        }
        Ok(())
    }
}
