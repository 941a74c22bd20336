//! Quiz extraction from free-form model output.
//!
//! Models are asked to answer with a JSON array but usually wrap it in prose
//! or a markdown fence. The array is taken to span from the first `[` to the
//! last `]` of the response; anything else about the surrounding text is
//! ignored. A `]` in trailing prose breaks this, and that case simply yields
//! no quiz.

use thiserror::Error;

use crate::model::QuizQuestion;

/// Why a response did not yield a quiz.
#[derive(Debug, Error)]
pub enum QuizParseError {
    #[error("no JSON array found in model response")]
    NoArray,

    #[error("malformed quiz JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Return the slice between the first `[` and the last `]`, inclusive.
pub fn find_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the embedded quiz array, reporting why parsing failed.
pub fn try_extract_quiz(text: &str) -> Result<Vec<QuizQuestion>, QuizParseError> {
    let array = find_json_array(text).ok_or(QuizParseError::NoArray)?;
    Ok(serde_json::from_str(array)?)
}

/// Parse the embedded quiz array; an unusable response is an empty quiz.
pub fn extract_quiz(text: &str) -> Vec<QuizQuestion> {
    match try_extract_quiz(text) {
        Ok(questions) => questions,
        Err(e) => {
            tracing::debug!("discarding quiz response: {e}");
            Vec::new()
        }
    }
}
