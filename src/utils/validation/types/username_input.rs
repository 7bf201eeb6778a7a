//! Represents validated account credentials.
//!
//! Usernames accept letters (any script), digits and the characters
//! `.`, `@`, `+`, `-` and `_`. Passwords are only checked for length; they
//! are never stored, only hashed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::utils::validation::{MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH};

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("Failed to compile username regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("This field is required.")]
    Empty,
    #[error("Ensure this value has at most 150 characters.")]
    TooLong,
    #[error("Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.")]
    InvalidCharacters,
    #[error("Password must be between 8 and 64 characters and differ from the username.")]
    WeakPassword,
}

/// A validated username, unique key of an account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Creates a new `Username` after validating the provided string.
    ///
    /// # Example
    /// ```
    /// use yatube::utils::validation::Username;
    ///
    /// assert!(Username::new("leo_tolstoy").is_ok());
    /// assert!(Username::new("has space").is_err());
    /// ```
    pub fn new(username: &str) -> Result<Self, UsernameError> {
        let username = username.trim();

        if username.is_empty() {
            return Err(UsernameError::Empty);
        }

        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(UsernameError::TooLong);
        }

        if !USERNAME_REGEX.is_match(username) {
            return Err(UsernameError::InvalidCharacters);
        }

        Ok(Self(username.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A clear-text password that satisfies the length policy.
/// Neither `Display` nor `Serialize`.
pub struct Password(String);

impl Password {
    pub fn new(password: &str, username: &Username) -> Result<Self, UsernameError> {
        let length = password.chars().count();
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
            return Err(UsernameError::WeakPassword);
        }

        if password.eq_ignore_ascii_case(username.as_str()) {
            return Err(UsernameError::WeakPassword);
        }

        Ok(Self(password.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}
