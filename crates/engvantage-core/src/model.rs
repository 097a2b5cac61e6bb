//! Core data model types for engvantage.
//!
//! These are the fundamental types the whole system passes around: vocabulary
//! words, quiz questions, and the persisted user-progress record.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used in the persisted stats record (`lastStudyDate`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current schema version of the persisted stats record.
pub const STATS_SCHEMA_VERSION: u32 = 1;

/// Curriculum tier that scopes vocabulary generation.
///
/// The wire and disk representation is the human-readable tier name
/// (`"Junior High"`), which is also what the generation prompt interpolates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StudentLevel {
    #[default]
    #[serde(rename = "Junior High")]
    JuniorHigh,
    #[serde(rename = "Senior High")]
    SeniorHigh,
    #[serde(rename = "TOEIC")]
    Toeic,
}

impl StudentLevel {
    /// All levels, in curriculum order. Used by the selection UI.
    pub const ALL: [StudentLevel; 3] = [
        StudentLevel::JuniorHigh,
        StudentLevel::SeniorHigh,
        StudentLevel::Toeic,
    ];
}

impl fmt::Display for StudentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentLevel::JuniorHigh => write!(f, "Junior High"),
            StudentLevel::SeniorHigh => write!(f, "Senior High"),
            StudentLevel::Toeic => write!(f, "TOEIC"),
        }
    }
}

impl FromStr for StudentLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").trim() {
            "junior" | "junior high" => Ok(StudentLevel::JuniorHigh),
            "senior" | "senior high" => Ok(StudentLevel::SeniorHigh),
            "toeic" => Ok(StudentLevel::Toeic),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// Language into which translations and example translations are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TargetLanguage {
    #[default]
    #[serde(rename = "Traditional Chinese")]
    TraditionalChinese,
    #[serde(rename = "Simplified Chinese")]
    SimplifiedChinese,
    #[serde(rename = "Japanese")]
    Japanese,
    #[serde(rename = "Korean")]
    Korean,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 4] = [
        TargetLanguage::TraditionalChinese,
        TargetLanguage::SimplifiedChinese,
        TargetLanguage::Japanese,
        TargetLanguage::Korean,
    ];
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetLanguage::TraditionalChinese => write!(f, "Traditional Chinese"),
            TargetLanguage::SimplifiedChinese => write!(f, "Simplified Chinese"),
            TargetLanguage::Japanese => write!(f, "Japanese"),
            TargetLanguage::Korean => write!(f, "Korean"),
        }
    }
}

impl FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").trim() {
            "traditional chinese" | "zh tw" | "zh" => Ok(TargetLanguage::TraditionalChinese),
            "simplified chinese" | "zh cn" => Ok(TargetLanguage::SimplifiedChinese),
            "japanese" | "ja" => Ok(TargetLanguage::Japanese),
            "korean" | "ko" => Ok(TargetLanguage::Korean),
            other => Err(format!("unknown target language: {other}")),
        }
    }
}

/// One vocabulary entry, created only from a content-fetch response.
///
/// The id is a fresh v4 UUID assigned at parse time; the original client
/// synthesized ids from level, wall-clock time, and response index, which is
/// only unique within one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub id: Uuid,
    /// Surface form, e.g. "accomplish".
    pub word: String,
    /// Phonetic transcription, e.g. "/əˈkʌmplɪʃ/".
    pub phonetic: String,
    /// Concise English definition.
    pub definition: String,
    /// Translation into the selected target language.
    pub translation: String,
    pub example_sentence: String,
    pub example_translation: String,
    /// The level this word was generated for.
    pub level: StudentLevel,
    /// User-acknowledged mastery flag; feeds the cumulative stats counter.
    pub learned: bool,
}

/// What a quiz question tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    #[default]
    Meaning,
    Completion,
    Spelling,
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizKind::Meaning => write!(f, "meaning"),
            QuizKind::Completion => write!(f, "completion"),
            QuizKind::Spelling => write!(f, "spelling"),
        }
    }
}

impl FromStr for QuizKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "meaning" => Ok(QuizKind::Meaning),
            "completion" => Ok(QuizKind::Completion),
            "spelling" => Ok(QuizKind::Spelling),
            other => Err(format!("unknown quiz kind: {other}")),
        }
    }
}

/// One multiple-choice quiz item.
///
/// Option order is preserved exactly as generated; exactly one option equals
/// `correct_answer` (entries violating this are dropped at parse time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    /// Surface form of the word this question tests.
    pub word: String,
    pub kind: QuizKind,
}

impl QuizQuestion {
    /// Index of the correct answer within `options`, if present.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

/// Persisted session-spanning progress record.
///
/// Field names are camelCase on disk, matching the record the original web
/// client kept in local storage. Every field carries a serde default so that
/// records written by older versions load with newer fields back-filled
/// (the target language was added exactly this way).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Cumulative count of words marked learned. Never goes negative.
    #[serde(default)]
    pub total_words_learned: u32,
    /// Consecutive days with at least one word marked learned.
    #[serde(default)]
    pub current_streak: u32,
    /// ISO date (`YYYY-MM-DD`) of the last study action; empty if never.
    #[serde(default)]
    pub last_study_date: String,
    #[serde(default)]
    pub level: StudentLevel,
    #[serde(default)]
    pub target_language: TargetLanguage,
}

fn default_schema_version() -> u32 {
    STATS_SCHEMA_VERSION
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            schema_version: STATS_SCHEMA_VERSION,
            total_words_learned: 0,
            current_streak: 0,
            last_study_date: String::new(),
            level: StudentLevel::default(),
            target_language: TargetLanguage::default(),
        }
    }
}

impl UserStats {
    /// Record a word transitioning to learned on the given local date.
    ///
    /// Advances the study streak: a second action on the same day keeps it, a
    /// consecutive day increments it, and any gap resets it to 1.
    pub fn record_learned(&mut self, today: NaiveDate) {
        self.total_words_learned += 1;

        let today_str = today.format(DATE_FORMAT).to_string();
        if self.last_study_date == today_str {
            return;
        }
        let continued = NaiveDate::parse_from_str(&self.last_study_date, DATE_FORMAT)
            .ok()
            .zip(today.pred_opt())
            .is_some_and(|(last, yesterday)| last == yesterday);
        self.current_streak = if continued { self.current_streak + 1 } else { 1 };
        self.last_study_date = today_str;
    }

    /// Record a word transitioning away from learned.
    ///
    /// The counter floors at zero; the streak is untouched.
    pub fn record_unlearned(&mut self) {
        self.total_words_learned = self.total_words_learned.saturating_sub(1);
    }
}
