//! Session state controller.
//!
//! Single authority for what is currently on screen: the selection, the word
//! list, per-request loading state, the active quiz, and the persisted stats
//! record. All mutation happens on the thread draining the event channel;
//! gateway calls run as spawned tasks that report back as `SessionEvent`s.
//!
//! Overlapping requests are possible by design (rapid level switches each
//! fire an independent fetch). Every fetch is tagged with a monotonically
//! increasing sequence number and a completion is applied only if it carries
//! the latest sequence issued for its kind, so a slow stale response can
//! never overwrite a fresher selection. There is no cancellation: superseded
//! tasks run to completion and their events are discarded on arrival.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::model::{QuizQuestion, StudentLevel, TargetLanguage, UserStats, Word};
use crate::stats::StatsStore;
use crate::traits::{ContentGateway, DEFAULT_WORD_COUNT};

/// Instruction hint passed to speech synthesis. Every current call site
/// pronounces English surface forms.
const SPEECH_LANGUAGE: &str = "English";

/// Loading state of one request kind.
///
/// A discriminated enum rather than a boolean so overlapping requests cannot
/// clobber each other's flag: `Loading` remembers which sequence it belongs
/// to, and only that sequence's completion resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { seq: u64 },
    Loaded,
    Failed { reason: String },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }

    /// The failure reason, if this state is `Failed`.
    pub fn failure(&self) -> Option<&str> {
        match self {
            LoadState::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Completion of a spawned gateway task.
#[derive(Debug)]
pub enum SessionEvent {
    WordsFetched {
        seq: u64,
        result: Result<Vec<Word>, GatewayError>,
    },
    QuizGenerated {
        seq: u64,
        result: Result<Vec<QuizQuestion>, GatewayError>,
    },
}

/// Result of a finished quiz, reported to the presentation layer only.
/// Scores are deliberately not persisted into `UserStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: usize,
    pub total: usize,
}

/// Orchestrates the gateway, the stats store, and the in-memory view.
pub struct SessionController {
    gateway: Arc<dyn ContentGateway>,
    store: StatsStore,
    word_count: usize,

    level: StudentLevel,
    target_language: TargetLanguage,
    words: Vec<Word>,
    words_load: LoadState,
    quiz: Option<Vec<QuizQuestion>>,
    quiz_load: LoadState,
    stats: UserStats,

    word_seq: u64,
    quiz_seq: u64,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    /// Create a controller, restoring the selection from the persisted stats
    /// record. No fetch is issued until `reload_words` is called.
    pub fn new(gateway: Arc<dyn ContentGateway>, store: StatsStore) -> Self {
        let stats = store.load();
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            store,
            word_count: DEFAULT_WORD_COUNT,
            level: stats.level,
            target_language: stats.target_language,
            words: Vec::new(),
            words_load: LoadState::Idle,
            quiz: None,
            quiz_load: LoadState::Idle,
            stats,
            word_seq: 0,
            quiz_seq: 0,
            tx,
            rx,
        }
    }

    /// Override how many words each list load requests.
    pub fn with_word_count(mut self, count: usize) -> Self {
        self.word_count = count;
        self
    }

    pub fn level(&self) -> StudentLevel {
        self.level
    }

    pub fn target_language(&self) -> TargetLanguage {
        self.target_language
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn words_load(&self) -> &LoadState {
        &self.words_load
    }

    pub fn quiz_load(&self) -> &LoadState {
        &self.quiz_load
    }

    /// The active quiz questions, present iff quiz mode is on.
    pub fn quiz(&self) -> Option<&[QuizQuestion]> {
        self.quiz.as_deref()
    }

    pub fn in_quiz_mode(&self) -> bool {
        self.quiz.is_some()
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Change the level. Unchanged values are a no-op; otherwise the
    /// selection is mirrored into the persisted stats and a reload fires.
    pub fn set_level(&mut self, level: StudentLevel) {
        if level == self.level {
            return;
        }
        info!(%level, "level changed");
        self.level = level;
        self.stats.level = level;
        self.persist_stats();
        self.reload_words();
    }

    /// Change the target language. Same contract as `set_level`.
    pub fn set_target_language(&mut self, lang: TargetLanguage) {
        if lang == self.target_language {
            return;
        }
        info!(language = %lang, "target language changed");
        self.target_language = lang;
        self.stats.target_language = lang;
        self.persist_stats();
        self.reload_words();
    }

    /// Fetch a fresh word list for the current selection.
    ///
    /// The previous list stays on screen until the fetch succeeds; a failure
    /// leaves it untouched and records the reason for inline surfacing.
    pub fn reload_words(&mut self) {
        self.word_seq += 1;
        let seq = self.word_seq;
        self.words_load = LoadState::Loading { seq };

        let gateway = Arc::clone(&self.gateway);
        let (level, lang, count) = (self.level, self.target_language, self.word_count);
        let tx = self.tx.clone();
        debug!(seq, %level, language = %lang, "word fetch issued");
        tokio::spawn(async move {
            let result = gateway.fetch_words(level, lang, count).await;
            let _ = tx.send(SessionEvent::WordsFetched { seq, result });
        });
    }

    /// Flip the learned flag on the matching word and update stats.
    /// Unknown ids are a silent no-op.
    pub fn toggle_learned(&mut self, word_id: Uuid) {
        let Some(word) = self.words.iter_mut().find(|w| w.id == word_id) else {
            debug!(%word_id, "toggle for unknown word id ignored");
            return;
        };
        word.learned = !word.learned;
        if word.learned {
            self.stats.record_learned(Local::now().date_naive());
        } else {
            self.stats.record_unlearned();
        }
        self.persist_stats();
    }

    /// Request a quiz over the current word list.
    ///
    /// No-op when the list is empty or a quiz request is already in flight.
    pub fn start_quiz(&mut self) {
        if self.words.is_empty() {
            debug!("quiz requested with no words loaded, ignoring");
            return;
        }
        if self.quiz_load.is_loading() {
            return;
        }
        self.quiz_seq += 1;
        let seq = self.quiz_seq;
        self.quiz_load = LoadState::Loading { seq };

        let gateway = Arc::clone(&self.gateway);
        let words = self.words.clone();
        let tx = self.tx.clone();
        debug!(seq, words = words.len(), "quiz generation issued");
        tokio::spawn(async move {
            let result = gateway.generate_quiz(&words).await;
            let _ = tx.send(SessionEvent::QuizGenerated { seq, result });
        });
    }

    /// Report a score and leave quiz mode. Returns `None` when no quiz is
    /// active.
    pub fn complete_quiz(&mut self, score: usize) -> Option<QuizOutcome> {
        let questions = self.quiz.take()?;
        self.quiz_load = LoadState::Idle;
        let outcome = QuizOutcome {
            score,
            total: questions.len(),
        };
        info!(score = outcome.score, total = outcome.total, "quiz completed");
        Some(outcome)
    }

    /// Leave quiz mode without scoring.
    pub fn cancel_quiz(&mut self) {
        if self.quiz.take().is_some() {
            self.quiz_load = LoadState::Idle;
            info!("quiz cancelled");
        }
    }

    /// Fire-and-forget pronunciation of `text`.
    ///
    /// Failures are logged and never surfaced; overlapping playback is
    /// allowed.
    pub fn pronounce(&self, text: &str) {
        let gateway = Arc::clone(&self.gateway);
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = gateway.synthesize_speech(&text, SPEECH_LANGUAGE).await {
                warn!(%text, error = %e, "pronunciation failed");
            }
        });
    }

    /// Await one gateway completion and apply it. Returns `false` if the
    /// channel is closed (cannot happen while the controller is alive).
    pub async fn tick(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply already-arrived completions without waiting.
    pub fn drain_pending(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
        }
    }

    /// Apply completions until nothing is loading.
    ///
    /// Terminates because every `Loading` state has exactly one outstanding
    /// task that will send an event.
    pub async fn settle(&mut self) {
        while self.words_load.is_loading() || self.quiz_load.is_loading() {
            if !self.tick().await {
                break;
            }
        }
    }

    /// Apply one completion, discarding it if it is not the latest issued
    /// request of its kind.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::WordsFetched { seq, result } => {
                if seq != self.word_seq {
                    debug!(seq, latest = self.word_seq, "stale word fetch discarded");
                    return;
                }
                match result {
                    Ok(words) => {
                        info!(seq, count = words.len(), "word list replaced");
                        self.words = words;
                        self.words_load = LoadState::Loaded;
                    }
                    Err(e) => {
                        warn!(seq, error = %e, "word fetch failed");
                        self.words_load = LoadState::Failed {
                            reason: e.to_string(),
                        };
                    }
                }
            }
            SessionEvent::QuizGenerated { seq, result } => {
                if seq != self.quiz_seq {
                    debug!(seq, latest = self.quiz_seq, "stale quiz discarded");
                    return;
                }
                match result {
                    // A fully swallowed parse yields zero questions; that is
                    // not a quiz worth entering.
                    Ok(questions) if questions.is_empty() => {
                        warn!(seq, "quiz generation produced no questions");
                        self.quiz_load = LoadState::Failed {
                            reason: "the model returned no usable questions".into(),
                        };
                    }
                    Ok(questions) => {
                        info!(seq, count = questions.len(), "quiz ready");
                        self.quiz = Some(questions);
                        self.quiz_load = LoadState::Loaded;
                    }
                    Err(e) => {
                        warn!(seq, error = %e, "quiz generation failed");
                        self.quiz_load = LoadState::Failed {
                            reason: e.to_string(),
                        };
                    }
                }
            }
        }
    }

    fn persist_stats(&self) {
        // Persistence failures degrade to in-memory stats, never a crash.
        if let Err(e) = self.store.save(&self.stats) {
            warn!(error = %e, "failed to persist stats");
        }
    }
}
