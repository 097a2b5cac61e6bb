//! Parsing of schema-constrained JSON replies into domain records.
//!
//! The parse policy is deliberate: malformed model output yields an empty
//! list, never an error, so unpredictable replies degrade to "nothing
//! loaded" instead of crashing the session. Individual quiz entries that
//! are internally incoherent are dropped with a warning.

use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use engvantage_core::model::{QuizKind, QuizQuestion, StudentLevel, Word};

use crate::wire::ReplyShapeError;

/// Parsed quiz lists are capped at this multiple of the word count.
const QUIZ_CAP_PER_WORD: usize = 2;

/// Fold a reply-shape failure into the swallow-malformed-output policy:
/// warn and treat the reply as empty.
pub(crate) fn text_or_empty(reply: Result<String, ReplyShapeError>, context: &str) -> String {
    match reply {
        Ok(text) => text,
        Err(ReplyShapeError::MissingField) => {
            warn!(context, "reply carried no text payload");
            String::new()
        }
        Err(ReplyShapeError::ParseError(e)) => {
            warn!(context, error = %e, "reply body was not valid JSON");
            String::new()
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWord {
    word: String,
    phonetic: String,
    definition: String,
    translation: String,
    example_sentence: String,
    example_translation: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuizQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    /// Extension field: the surface form of the tested word.
    #[serde(default)]
    word_id: Option<String>,
    /// Extension field: question category.
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Strip an optional markdown code fence around a JSON payload.
///
/// Schema-constrained generation usually returns bare JSON, but models
/// occasionally wrap it in ```json fences anyway.
fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse a word-list reply. Each record gets a fresh UUID, the requested
/// level, and `learned = false`. Malformed input parses to an empty list.
pub fn parse_words(text: &str, level: StudentLevel) -> Vec<Word> {
    let payload = strip_json_fences(text);
    let records: Vec<WireWord> = match serde_json::from_str(payload) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "discarding malformed word list reply");
            return Vec::new();
        }
    };
    records
        .into_iter()
        .map(|r| Word {
            id: Uuid::new_v4(),
            word: r.word,
            phonetic: r.phonetic,
            definition: r.definition,
            translation: r.translation,
            example_sentence: r.example_sentence,
            example_translation: r.example_translation,
            level,
            learned: false,
        })
        .collect()
}

/// Parse a quiz reply against the words it was generated for.
///
/// Entries whose correct answer does not appear among the options are
/// dropped. A missing `wordId` falls back to the word at the same index;
/// unknown `type` strings fall back to `Meaning`. The result is capped at
/// twice the word count.
pub fn parse_quiz(text: &str, words: &[Word]) -> Vec<QuizQuestion> {
    let payload = strip_json_fences(text);
    let records: Vec<WireQuizQuestion> = match serde_json::from_str(payload) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "discarding malformed quiz reply");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| {
            if !r.options.iter().any(|o| *o == r.correct_answer) {
                warn!(question = %r.question, "dropping quiz entry: correct answer not among options");
                return None;
            }
            let word = r
                .word_id
                .filter(|w| !w.is_empty())
                .or_else(|| words.get(i).map(|w| w.word.clone()))
                .unwrap_or_default();
            let kind = r
                .kind
                .as_deref()
                .and_then(|k| k.parse::<QuizKind>().ok())
                .unwrap_or_default();
            Some(QuizQuestion {
                question: r.question,
                options: r.options,
                correct_answer: r.correct_answer,
                word,
                kind,
            })
        })
        .take(words.len() * QUIZ_CAP_PER_WORD)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_word_json(n: usize) -> String {
        let entries: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"word": "word{i}", "phonetic": "/w{i}/", "definition": "def {i}",
                        "translation": "trans {i}", "exampleSentence": "Sentence {i}.",
                        "exampleTranslation": "ex-trans {i}"}}"#
                )
            })
            .collect();
        format!("[{}]", entries.join(","))
    }

    fn words(n: usize) -> Vec<Word> {
        parse_words(&sample_word_json(n), StudentLevel::JuniorHigh)
    }

    #[test]
    fn conformant_array_parses_fully() {
        let parsed = parse_words(&sample_word_json(10), StudentLevel::SeniorHigh);
        assert_eq!(parsed.len(), 10);
        for w in &parsed {
            assert_eq!(w.level, StudentLevel::SeniorHigh);
            assert!(!w.learned);
        }
        // Fresh ids, unique within the batch.
        let mut ids: Vec<_> = parsed.iter().map(|w| w.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn fenced_payload_parses() {
        let fenced = format!("```json\n{}\n```", sample_word_json(3));
        assert_eq!(parse_words(&fenced, StudentLevel::JuniorHigh).len(), 3);
    }

    #[test]
    fn non_json_yields_empty_not_error() {
        assert!(parse_words("I'm sorry, I can't do that.", StudentLevel::JuniorHigh).is_empty());
        assert!(parse_words("", StudentLevel::JuniorHigh).is_empty());
    }

    #[test]
    fn schema_violation_yields_empty() {
        // Missing required fields.
        let bad = r#"[{"word": "apple"}]"#;
        assert!(parse_words(bad, StudentLevel::JuniorHigh).is_empty());
        // Right fields, wrong types.
        let wrong_type = r#"[{"word": 1, "phonetic": "", "definition": "", "translation": "",
            "exampleSentence": "", "exampleTranslation": ""}]"#;
        assert!(parse_words(wrong_type, StudentLevel::JuniorHigh).is_empty());
    }

    #[test]
    fn quiz_parses_with_extension_fields() {
        let text = r#"[{
            "question": "What does 'word0' mean?",
            "options": ["def 0", "a", "b", "c"],
            "correctAnswer": "def 0",
            "wordId": "word0",
            "type": "completion"
        }]"#;
        let quiz = parse_quiz(text, &words(3));
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].word, "word0");
        assert_eq!(quiz[0].kind, QuizKind::Completion);
        assert_eq!(quiz[0].correct_index(), Some(0));
    }

    #[test]
    fn quiz_without_extension_fields_falls_back() {
        let text = r#"[{
            "question": "Q?",
            "options": ["x", "y", "z", "w"],
            "correctAnswer": "y"
        }]"#;
        let quiz = parse_quiz(text, &words(2));
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].word, "word0", "index fallback");
        assert_eq!(quiz[0].kind, QuizKind::Meaning);
    }

    #[test]
    fn unknown_quiz_kind_maps_to_meaning() {
        let text = r#"[{
            "question": "Q?",
            "options": ["x", "y", "z", "w"],
            "correctAnswer": "x",
            "type": "essay"
        }]"#;
        let quiz = parse_quiz(text, &words(1));
        assert_eq!(quiz[0].kind, QuizKind::Meaning);
    }

    #[test]
    fn incoherent_quiz_entry_is_dropped() {
        let text = r#"[
            {"question": "ok", "options": ["a", "b", "c", "d"], "correctAnswer": "a"},
            {"question": "bad", "options": ["a", "b", "c", "d"], "correctAnswer": "nope"}
        ]"#;
        let quiz = parse_quiz(text, &words(2));
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].question, "ok");
    }

    #[test]
    fn quiz_is_capped_at_twice_word_count() {
        let entries: Vec<String> = (0..10)
            .map(|i| {
                format!(
                    r#"{{"question": "q{i}", "options": ["a", "b", "c", "d"], "correctAnswer": "a"}}"#
                )
            })
            .collect();
        let text = format!("[{}]", entries.join(","));
        let quiz = parse_quiz(&text, &words(3));
        assert_eq!(quiz.len(), 6);
    }

    #[test]
    fn malformed_quiz_yields_empty() {
        assert!(parse_quiz("not json", &words(2)).is_empty());
    }
}
