//! Provides a validated text content representation for comments,
//! names and group metadata.
//!
//! This module ensures that text content meets safety requirements by:
//! - Validating length constraints
//! - Checking for control characters that could be dangerous
//! - Preventing HTML in names and titles
//! - Normalizing whitespace

use ammonia::is_html;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use validator::ValidateNonControlCharacter;

use crate::utils::validation::{MAX_CONTENT_LENGTH, MAX_SHORT_CONTENT_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextInputError {
    #[error("This field is required.")]
    Empty,
    #[error("Ensure this value has at most {0} characters.")]
    TooLong(usize),
    #[error("Text contains invalid control characters.")]
    ControlCharacters,
    #[error("HTML is not allowed here.")]
    Html,
    #[error("Enter a valid slug consisting of letters, numbers, underscores or hyphens.")]
    InvalidSlug,
}

/// Represents validated textual content that is guaranteed to be safe for use.
/// This type can only be constructed through validation, ensuring that any
/// instance meets our security and formatting requirements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextInput {
    // The validated and normalized text content
    text_content: String,
}

impl TextInput {
    /// Creates a new TextInput for long-form content like comments.
    ///
    /// # Example
    /// ```
    /// use yatube::utils::validation::TextInput;
    ///
    /// let comment = TextInput::new_long_form("Nice post!").unwrap();
    /// assert_eq!(comment.as_str(), "Nice post!");
    /// ```
    ///
    /// Long-form text may hold `<` and `>` freely (`Vec<u8>`, `a<b`):
    /// templates escape it on output.
    pub fn new_long_form(content: &str) -> Result<Self, TextInputError> {
        Self::new(content, MAX_CONTENT_LENGTH, false)
    }

    /// Creates a new TextInput for short-form content like names or
    /// group titles. This applies stricter length constraints.
    pub fn new_short_form(content: &str) -> Result<Self, TextInputError> {
        Self::new(content, MAX_SHORT_CONTENT_LENGTH, true)
    }

    /// Internal function that performs the actual validation and creation.
    /// This ensures consistent validation rules across different content types.
    fn new(content: &str, max_length: usize, reject_html: bool) -> Result<Self, TextInputError> {
        // First, normalize whitespace by trimming
        let trimmed = content.trim();

        // Perform our validation checks in order of complexity
        if trimmed.is_empty() {
            return Err(TextInputError::Empty);
        }

        if trimmed.chars().count() > max_length {
            return Err(TextInputError::TooLong(max_length));
        }

        // Line breaks and tabs are the only control characters a form may carry
        let without_breaks: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
            .collect();
        if !without_breaks.validate_non_control_character() {
            return Err(TextInputError::ControlCharacters);
        }

        if reject_html && is_html(trimmed) {
            return Err(TextInputError::Html);
        }

        // Normalize Unicode characters to ensure consistent representation
        let normalized = trimmed.nfkc().collect::<String>();

        Ok(Self {
            text_content: normalized,
        })
    }

    /// Returns the validated content as a string slice
    pub fn as_str(&self) -> &str {
        &self.text_content
    }

    /// Returns the length of the content in characters
    pub fn len(&self) -> usize {
        self.text_content.chars().count()
    }

    /// Always false: empty content is rejected at construction
    pub fn is_empty(&self) -> bool {
        self.text_content.is_empty()
    }
}

impl TryFrom<String> for TextInput {
    type Error = TextInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        // Stored values were written by us; only the long-form budget applies
        Self::new(&value, MAX_CONTENT_LENGTH, false)
    }
}

impl From<TextInput> for String {
    fn from(value: TextInput) -> Self {
        value.text_content
    }
}

/// Implements Display to allow printing the text content
impl fmt::Display for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_content)
    }
}

/// Allows using TextInput wherever a string reference is needed
impl AsRef<str> for TextInput {
    fn as_ref(&self) -> &str {
        &self.text_content
    }
}
