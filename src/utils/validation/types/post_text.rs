//! Validated body of a post.
//!
//! A post body is accepted only if:
//! - it is not blank once surrounding whitespace is stripped
//! - it holds at most [`MAX_POST_TEXT_LENGTH`] characters
//! - none of its whitespace-delimited words holds more than
//!   [`MAX_POST_WORD_LENGTH`] characters
//!
//! Lengths are counted in characters, not bytes, so Cyrillic or accented
//! text gets the same budget as ASCII.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::utils::validation::{MAX_POST_TEXT_LENGTH, MAX_POST_WORD_LENGTH};

/// Reasons a post body can be refused. The `Display` text is shown to the
/// user next to the form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PostTextError {
    #[error("This field is required.")]
    Empty,
    #[error("Your text is too long, please shorten it.")]
    TooLong,
    #[error("Your post contains a word that is too long, please replace it.")]
    WordTooLong,
}

impl PostTextError {
    /// Stable machine-readable code of the error
    pub fn code(&self) -> &'static str {
        match self {
            PostTextError::Empty => "required",
            PostTextError::TooLong => "max_length_text",
            PostTextError::WordTooLong => "max_length_word",
        }
    }
}

/// Body of a post that passed validation. Can only be built through
/// [`PostText::new`], including when read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostText(String);

impl PostText {
    pub fn new(raw: &str) -> Result<Self, PostTextError> {
        let text = raw.trim();

        if text.is_empty() {
            return Err(PostTextError::Empty);
        }

        if text.chars().count() > MAX_POST_TEXT_LENGTH {
            return Err(PostTextError::TooLong);
        }

        if text
            .split_whitespace()
            .any(|word| word.chars().count() > MAX_POST_WORD_LENGTH)
        {
            return Err(PostTextError::WordTooLong);
        }

        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` characters of the text
    pub fn preview(&self, n: usize) -> &str {
        match self.0.char_indices().nth(n) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl TryFrom<String> for PostText {
    type Error = PostTextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PostText> for String {
    fn from(value: PostText) -> Self {
        value.0
    }
}

impl fmt::Display for PostText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PostText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_regular_text() {
        let text = PostText::new("  Тестовый текст поста  ").unwrap();
        assert_eq!(text.as_str(), "Тестовый текст поста");
    }

    #[test]
    fn test_rejects_blank_text() {
        assert_eq!(PostText::new(""), Err(PostTextError::Empty));
        assert_eq!(PostText::new(" \n\t "), Err(PostTextError::Empty));
    }

    #[test]
    fn test_text_length_limit() {
        // Short words so that only the total length matters
        let at_limit = "ab ".repeat(MAX_POST_TEXT_LENGTH / 3) + "ab";
        assert_eq!(at_limit.chars().count(), MAX_POST_TEXT_LENGTH);
        assert!(PostText::new(&at_limit).is_ok());

        let over_limit = format!("{at_limit}a");
        assert_eq!(PostText::new(&over_limit), Err(PostTextError::TooLong));
    }

    #[test]
    fn test_text_length_counts_characters() {
        // 2048 two-byte characters split into short words: 4096 bytes
        let text = "ж".repeat(64).repeat(32);
        let text: String = text
            .chars()
            .enumerate()
            .map(|(i, c)| if i % 64 == 63 { ' ' } else { c })
            .collect();
        assert!(text.len() > MAX_POST_TEXT_LENGTH);
        assert!(PostText::new(&text).is_ok());
    }

    #[test]
    fn test_word_length_limit() {
        let longest_word = "w".repeat(MAX_POST_WORD_LENGTH);
        assert!(PostText::new(&format!("start {longest_word} end")).is_ok());

        let long_word = "w".repeat(MAX_POST_WORD_LENGTH + 1);
        for text in [
            long_word.clone(),
            format!("start {long_word}"),
            format!("{long_word} end"),
            format!("line one\n{long_word}\nline three"),
        ] {
            assert_eq!(PostText::new(&text), Err(PostTextError::WordTooLong));
        }
    }

    #[test]
    fn test_word_length_counts_characters() {
        let word = "я".repeat(MAX_POST_WORD_LENGTH);
        assert!(PostText::new(&word).is_ok());
        let word = "я".repeat(MAX_POST_WORD_LENGTH + 1);
        assert_eq!(PostText::new(&word), Err(PostTextError::WordTooLong));
    }

    #[test]
    fn test_total_length_is_checked_first() {
        let text = "x".repeat(MAX_POST_TEXT_LENGTH + 1);
        assert_eq!(PostText::new(&text), Err(PostTextError::TooLong));
    }

    #[test]
    fn test_preview() {
        let text = PostText::new("Тестовый пост для проверки").unwrap();
        assert_eq!(text.preview(15), "Тестовый пост д");
        assert_eq!(PostText::new("short").unwrap().preview(15), "short");
    }

    #[test]
    fn test_deserialization_revalidates() {
        let ok: Result<PostText, _> = serde_yaml::from_str("hello world");
        assert!(ok.is_ok());

        let yaml = "w".repeat(MAX_POST_WORD_LENGTH + 1);
        let err: Result<PostText, _> = serde_yaml::from_str(&yaml);
        assert!(err.is_err());
    }
}
