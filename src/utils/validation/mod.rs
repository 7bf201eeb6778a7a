//! Root module for the validation system.
//! Exposes the public API for input validation.

mod types;
mod constants;

// Re-export commonly used types and functions
pub use constants::*;
pub use types::{
    FileInput, FileInputError, Password, PostText, PostTextError, Slug, TextInput,
    TextInputError, Username, UsernameError,
};

#[cfg(test)]
pub(crate) mod tests_support {
    /// 2x1 GIF, the smallest useful upload
    pub(crate) const SMALL_GIF: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
        0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
        0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C,
        0x0A, 0x00, 0x3B,
    ];
}
