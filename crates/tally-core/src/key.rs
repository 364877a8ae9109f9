//! # Catalog Keys
//!
//! [`CatalogKey`] is the identifier under which every catalog object is
//! registered. Entries of all kinds and tags share one key namespace, so a
//! single type covers both.
//!
//! ## Validation
//!
//! Keys are validated at construction time: the text is trimmed, must be
//! non-empty, and is restricted to ASCII alphanumerics plus `_`, `-`, and
//! `.`. Equality, hashing, and ordering are defined by the key text.

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

// -- Validating Deserialize for CatalogKey ------------------------------------

impl<'de> Deserialize<'de> for CatalogKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A validated catalog identifier (e.g. `"gold"`, `"sword.iron"`,
/// `"starter-pack"`).
///
/// # Validation
///
/// Must be non-empty after trimming and contain only ASCII alphanumerics,
/// `_`, `-`, or `.`. The restriction keeps keys usable verbatim in config
/// files, save data, and storefront identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CatalogKey(String);

impl CatalogKey {
    /// Create a catalog key from a string, validating its text.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Empty`] for empty or whitespace-only input, and
    /// [`KeyError::InvalidCharacter`] for text outside the allowed set.
    pub fn new(value: impl Into<String>) -> Result<Self, KeyError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(KeyError::Empty);
        }
        if let Some(character) = trimmed
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '-' | '.'))
        {
            return Err(KeyError::InvalidCharacter {
                key: trimmed,
                character,
            });
        }
        Ok(Self(trimmed))
    }

    /// Access the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CatalogKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
