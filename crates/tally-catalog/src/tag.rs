//! # Tags and the Tag Store
//!
//! Tags are the catalog's cross-cutting classification mechanism: an
//! immutable, key-identified value attachable to entries of any kind.
//! Tag equality is value equality over the key, and the "both absent"
//! case is defined equal via [`Tag::option_eq`].
//!
//! The [`TagStore`] is a flat collection; lookup by key text is a linear
//! scan. Callers performing repeated tag queries should resolve the
//! [`Tag`] reference once and reuse it.

use std::sync::Arc;

use serde::Serialize;
use tally_core::CatalogKey;

/// An immutable classification value identified by its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Tag {
    key: CatalogKey,
}

impl Tag {
    pub(crate) fn new(key: CatalogKey) -> Self {
        Self { key }
    }

    /// The key identifying this tag.
    pub fn key(&self) -> &CatalogKey {
        &self.key
    }

    /// Null-safe equality: two absent tags compare equal, an absent and a
    /// present tag do not, and two present tags compare by value.
    pub fn option_eq(a: Option<&Tag>, b: Option<&Tag>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// The immutable flat collection of all compiled tags.
///
/// Produced exactly once by a successful build. Each key appears exactly
/// once; iteration order is not significant across rebuilds.
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    tags: Vec<Arc<Tag>>,
}

impl TagStore {
    pub(crate) fn new(tags: Vec<Arc<Tag>>) -> Self {
        Self { tags }
    }

    /// Look up a tag by key text. O(n) over the store.
    pub fn find(&self, key: &str) -> Option<&Arc<Tag>> {
        self.tags.iter().find(|t| t.key().as_str() == key)
    }

    /// Number of tags in the store.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the store holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over all tags.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tag>> {
        self.tags.iter()
    }
}
