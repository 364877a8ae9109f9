//! # Catalog Store
//!
//! The immutable, indexed container of all compiled entries, and the
//! single read path used by every other subsystem. Exact-key lookup is
//! the only indexed access; every other query is an O(n) scan — catalogs
//! are small (tens to low hundreds of entries), so scan simplicity wins
//! over index maintenance.
//!
//! Scan queries can append into a caller-supplied, pre-sized buffer to
//! avoid per-call allocation, and always return the matched count.

use std::collections::BTreeMap;
use std::sync::Arc;

use tally_core::CatalogKey;

use crate::entry::{CatalogEntry, EntryDetail, EntryKind};
use crate::tag::Tag;

/// The immutable key→entry container produced by a successful build.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    entries: BTreeMap<CatalogKey, Arc<CatalogEntry>>,
}

impl CatalogStore {
    pub(crate) fn new(entries: BTreeMap<CatalogKey, Arc<CatalogEntry>>) -> Self {
        Self { entries }
    }

    /// Look up the entry under `key` if it exists and is of `kind`.
    /// An absent key and a kind mismatch both yield `None` — speculative
    /// lookups are cheap and never error.
    pub fn find(&self, kind: EntryKind, key: &str) -> Option<&Arc<CatalogEntry>> {
        self.find_any(key).filter(|entry| entry.kind() == kind)
    }

    /// Look up the entry under `key` regardless of kind.
    pub fn find_any(&self, key: &str) -> Option<&Arc<CatalogEntry>> {
        let key = CatalogKey::new(key).ok()?;
        self.entries.get(&key)
    }

    /// Append every entry of `kind` into `target`, emptying it first when
    /// `clear` is set. Returns the matched count.
    pub fn get_all_into(
        &self,
        kind: EntryKind,
        target: &mut Vec<Arc<CatalogEntry>>,
        clear: bool,
    ) -> usize {
        self.find_where_into(|entry| entry.kind() == kind, target, clear)
    }

    /// Collect every entry of `kind` into a fresh vector.
    pub fn get_all(&self, kind: EntryKind) -> Vec<Arc<CatalogEntry>> {
        let mut out = Vec::new();
        self.get_all_into(kind, &mut out, false);
        out
    }

    /// Append every entry of `kind` whose tag array contains `tag` into
    /// `target`. Tag membership is a linear scan of each entry's tag
    /// array. Returns the matched count.
    pub fn find_by_tag_into(
        &self,
        kind: EntryKind,
        tag: &Tag,
        target: &mut Vec<Arc<CatalogEntry>>,
        clear: bool,
    ) -> usize {
        self.find_where_into(
            |entry| entry.kind() == kind && entry.has_tag(tag),
            target,
            clear,
        )
    }

    /// Collect every entry of `kind` carrying `tag` into a fresh vector.
    pub fn find_by_tag(&self, kind: EntryKind, tag: &Tag) -> Vec<Arc<CatalogEntry>> {
        let mut out = Vec::new();
        self.find_by_tag_into(kind, tag, &mut out, false);
        out
    }

    /// Append every entry satisfying `predicate` into `target`, emptying
    /// it first when `clear` is set. Returns the matched count.
    pub fn find_where_into(
        &self,
        mut predicate: impl FnMut(&Arc<CatalogEntry>) -> bool,
        target: &mut Vec<Arc<CatalogEntry>>,
        clear: bool,
    ) -> usize {
        if clear {
            target.clear();
        }
        let mut count = 0;
        for entry in self.entries.values() {
            if predicate(entry) {
                target.push(Arc::clone(entry));
                count += 1;
            }
        }
        count
    }

    /// Stateful variant of [`CatalogStore::find_where_into`]: a plain fn
    /// pointer plus auxiliary data, for call sites that want to avoid
    /// building a capturing closure per query.
    pub fn find_where_with_into<S>(
        &self,
        state: &S,
        predicate: fn(&S, &Arc<CatalogEntry>) -> bool,
        target: &mut Vec<Arc<CatalogEntry>>,
        clear: bool,
    ) -> usize {
        self.find_where_into(|entry| predicate(state, entry), target, clear)
    }

    /// Find the first store transaction whose external product identifier
    /// equals `product_id`. O(n) scan; storefront catalogs are small
    /// enough that no index is kept.
    pub fn find_first_by_product_id(&self, product_id: &str) -> Option<&Arc<CatalogEntry>> {
        self.entries.values().find(|entry| match entry.detail() {
            EntryDetail::StoreTransaction(detail) => detail.product_id() == product_id,
            _ => false,
        })
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CatalogEntry>> {
        self.entries.values()
    }
}
