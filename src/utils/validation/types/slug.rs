//! Validated group slug (URL component).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::validation::TextInputError;

static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-a-zA-Z0-9_]{1,50}$").expect("Failed to compile slug regex")
});

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(slug: &str) -> Result<Self, TextInputError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(TextInputError::Empty);
        }
        if !SLUG_REGEX.is_match(slug) {
            return Err(TextInputError::InvalidSlug);
        }
        Ok(Self(slug.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = TextInputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs() {
        assert!(Slug::new("test-slug").is_ok());
        assert!(Slug::new("cats_2024").is_ok());
        assert!(Slug::new("").is_err());
        assert!(Slug::new("with space").is_err());
        assert!(Slug::new("Тестовый").is_err());
        assert!(Slug::new(&"s".repeat(51)).is_err());
    }
}
