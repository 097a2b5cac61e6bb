//! Prompt construction for word, quiz, and speech requests.

use engvantage_core::model::{StudentLevel, TargetLanguage, Word};

/// Prompt for a word-list generation request.
pub fn words_prompt(level: StudentLevel, target_language: TargetLanguage, count: usize) -> String {
    format!(
        "Generate {count} essential English vocabulary words for {level} students. \
         Include phonetic symbols, {target_language} translation, a concise English \
         definition, and one high-quality example sentence with its {target_language} \
         translation."
    )
}

/// Prompt for a quiz-generation request over the given words.
pub fn quiz_prompt(words: &[Word]) -> String {
    let word_list = words
        .iter()
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Generate a vocabulary quiz for these words: {word_list}. For each word, \
         create one multiple-choice question. The question can be about the meaning \
         or a sentence completion. Provide 4 options for each."
    )
}

/// Instruction for a speech-synthesis request.
pub fn speech_prompt(text: &str, language: &str) -> String {
    if language.eq_ignore_ascii_case("english") {
        format!("Pronounce: {text}")
    } else {
        format!("Pronounce in {language}: {text}")
    }
}
