//! Constants used throughout the validation system


/// Maximum length of a post body, in characters
pub const MAX_POST_TEXT_LENGTH: usize = 2_048;
/// Maximum length of a single whitespace-delimited word in a post body
pub const MAX_POST_WORD_LENGTH: usize = 128;
/// Maximum length for long-form content such as comments
pub const MAX_CONTENT_LENGTH: usize = 2_000;
/// Maximum length for short-form content such as names and group titles
pub const MAX_SHORT_CONTENT_LENGTH: usize = 200;
/// Maximum length of a username
pub const MAX_USERNAME_LENGTH: usize = 150;
/// Password length bounds
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 64;
