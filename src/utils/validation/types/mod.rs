//! Type definitions for the validation system

mod file_input;
mod post_text;
mod slug;
mod text_input;
mod username_input;

// Re-export commonly used types and functions
pub use file_input::{FileInput, FileInputError};
pub use post_text::{PostText, PostTextError};
pub use slug::Slug;
pub use text_input::{TextInput, TextInputError};
pub use username_input::{Password, Username, UsernameError};
