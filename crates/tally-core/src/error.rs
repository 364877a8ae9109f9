//! # Core Error Types
//!
//! Structured errors for the foundational types. Uses `thiserror` for
//! ergonomic error definitions.

use thiserror::Error;

/// Errors from catalog key validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key text is empty or whitespace-only.
    #[error("catalog key must not be empty")]
    Empty,

    /// The key text contains a character outside `[A-Za-z0-9_.-]`.
    #[error("catalog key '{key}' contains invalid character '{character}'")]
    InvalidCharacter {
        /// The offending key text.
        key: String,
        /// The first invalid character found.
        character: char,
    },
}
