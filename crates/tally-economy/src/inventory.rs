//! # Inventory
//!
//! Owned item instances for one session. Each instance is created from an
//! item definition entry and carries a unique id and creation timestamp.
//! The definition reference is the `Arc<CatalogEntry>` held by the store —
//! instances rely on the key-identity contract for grouping and lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use tally_catalog::{CatalogEntry, CatalogStore, Tag};

use crate::error::EconomyError;

/// Unique identifier of one inventory item instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(Uuid);

impl ItemId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One owned instance of an item definition.
#[derive(Debug, Clone)]
pub struct InventoryItem {
    id: ItemId,
    definition: Arc<CatalogEntry>,
    created_at: DateTime<Utc>,
    /// Monotonic creation sequence within one inventory; wall-clock
    /// timestamps can tie, this cannot.
    seq: u64,
}

impl InventoryItem {
    /// The unique instance id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The item definition this instance was created from.
    pub fn definition(&self) -> &Arc<CatalogEntry> {
        &self.definition
    }

    /// When this instance was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The set of item instances owned by one session.
#[derive(Debug, Clone, Default)]
pub struct InventoryManager {
    items: BTreeMap<ItemId, InventoryItem>,
    next_seq: u64,
}

impl InventoryManager {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one instance of every item definition's initial allocation.
    /// Returns the number of instances created.
    pub fn grant_initial_allocations(&mut self, store: &CatalogStore) -> usize {
        let mut created = 0;
        for entry in store.iter() {
            if let Some(detail) = entry.as_item() {
                for _ in 0..detail.initial_allocation {
                    self.insert(Arc::clone(entry));
                    created += 1;
                }
            }
        }
        created
    }

    /// Create a new instance of `definition`.
    ///
    /// # Errors
    ///
    /// [`EconomyError::NotAnItem`] if the entry is not an item definition.
    pub fn create_item(
        &mut self,
        definition: &Arc<CatalogEntry>,
    ) -> Result<&InventoryItem, EconomyError> {
        if definition.as_item().is_none() {
            return Err(EconomyError::NotAnItem {
                key: definition.key().as_str().to_string(),
            });
        }
        let id = self.insert(Arc::clone(definition));
        Ok(&self.items[&id])
    }

    /// Remove the instance under `id`, returning it.
    ///
    /// # Errors
    ///
    /// [`EconomyError::ItemNotFound`] if no such instance exists.
    pub fn remove_item(&mut self, id: ItemId) -> Result<InventoryItem, EconomyError> {
        self.items
            .remove(&id)
            .ok_or(EconomyError::ItemNotFound { id })
    }

    /// Look up an instance by id.
    pub fn item(&self, id: ItemId) -> Option<&InventoryItem> {
        self.items.get(&id)
    }

    /// Number of instances created from `definition`.
    pub fn count_by_definition(&self, definition: &CatalogEntry) -> usize {
        self.items
            .values()
            .filter(|item| item.definition.as_ref() == definition)
            .count()
    }

    /// All instances created from `definition`.
    pub fn items_by_definition(&self, definition: &CatalogEntry) -> Vec<&InventoryItem> {
        self.items
            .values()
            .filter(|item| item.definition.as_ref() == definition)
            .collect()
    }

    /// All instances whose definition carries `tag`.
    pub fn items_by_tag(&self, tag: &Tag) -> Vec<&InventoryItem> {
        self.items
            .values()
            .filter(|item| item.definition.has_tag(tag))
            .collect()
    }

    /// Remove the `count` oldest instances of `definition`, returning
    /// their ids. Used to consume transaction costs.
    ///
    /// # Errors
    ///
    /// [`EconomyError::InsufficientItems`] if fewer than `count` instances
    /// exist; nothing is removed in that case.
    pub(crate) fn take_oldest_by_definition(
        &mut self,
        definition: &CatalogEntry,
        count: usize,
    ) -> Result<Vec<ItemId>, EconomyError> {
        let mut candidates: Vec<(u64, ItemId)> = self
            .items
            .values()
            .filter(|item| item.definition.as_ref() == definition)
            .map(|item| (item.seq, item.id))
            .collect();
        if candidates.len() < count {
            return Err(EconomyError::InsufficientItems {
                item: definition.key().as_str().to_string(),
                required: count,
                available: candidates.len(),
            });
        }
        candidates.sort();
        let taken: Vec<ItemId> = candidates
            .into_iter()
            .take(count)
            .map(|(_, id)| id)
            .collect();
        for id in &taken {
            self.items.remove(id);
        }
        Ok(taken)
    }

    /// Total number of instances.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the inventory holds no instances.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over all instances.
    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }

    fn insert(&mut self, definition: Arc<CatalogEntry>) -> ItemId {
        let id = ItemId::new();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.items.insert(
            id,
            InventoryItem {
                id,
                definition,
                created_at: Utc::now(),
                seq,
            },
        );
        id
    }
}
