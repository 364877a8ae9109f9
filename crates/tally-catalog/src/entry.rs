//! # Runtime Catalog Entries
//!
//! The immutable, compiled counterparts of descriptors. Once a build
//! succeeds, an entry's tag set and cross-references never change for the
//! life of the store.
//!
//! ## Identity Contract
//!
//! Equality, hashing, and ordering are defined solely by key. Two entries
//! never share a key within one store, and consumers may hold
//! `Arc<CatalogEntry>` references across calls relying on this contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use tally_core::{CatalogKey, PropertyValue};

use crate::tag::Tag;

/// Discriminates the closed set of entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    Currency,
    Item,
    VirtualTransaction,
    StoreTransaction,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntryKind::Currency => "currency",
            EntryKind::Item => "item",
            EntryKind::VirtualTransaction => "virtual transaction",
            EntryKind::StoreTransaction => "store transaction",
        };
        write!(f, "{name}")
    }
}

/// A resolved exchange line: a direct reference to the tradable entry
/// (guaranteed by the link phase to be a currency or item) and an amount.
#[derive(Debug, Clone)]
pub struct Exchange {
    tradable: Arc<CatalogEntry>,
    amount: u64,
}

impl Exchange {
    pub(crate) fn new(tradable: Arc<CatalogEntry>, amount: u64) -> Self {
        Self { tradable, amount }
    }

    /// The currency or item entry being exchanged.
    pub fn tradable(&self) -> &Arc<CatalogEntry> {
        &self.tradable
    }

    /// The amount exchanged. Always positive.
    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// Compiled currency data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyDetail {
    /// Balance granted when a wallet is first created.
    pub initial_balance: i64,
    /// Balance cap. Zero means uncapped.
    pub maximum_balance: i64,
}

impl CurrencyDetail {
    /// Whether this currency carries a balance cap.
    pub fn is_capped(&self) -> bool {
        self.maximum_balance > 0
    }
}

/// Compiled inventory item definition data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetail {
    /// Number of instances granted when an inventory is first created.
    pub initial_allocation: u32,
}

/// Compiled virtual transaction data with resolved exchange lists.
#[derive(Debug, Clone)]
pub struct VirtualTransactionDetail {
    pub(crate) costs: Vec<Exchange>,
    pub(crate) payouts: Vec<Exchange>,
}

impl VirtualTransactionDetail {
    /// Cost lines paid from the player's wallet and inventory.
    pub fn costs(&self) -> &[Exchange] {
        &self.costs
    }

    /// Payout lines granted on success.
    pub fn payouts(&self) -> &[Exchange] {
        &self.payouts
    }
}

/// Compiled store transaction data with its resolved payout list.
#[derive(Debug, Clone)]
pub struct StoreTransactionDetail {
    pub(crate) product_id: String,
    pub(crate) payouts: Vec<Exchange>,
}

impl StoreTransactionDetail {
    /// The external storefront product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Payout lines granted when the purchase is confirmed.
    pub fn payouts(&self) -> &[Exchange] {
        &self.payouts
    }
}

/// Kind-specific compiled data.
#[derive(Debug, Clone)]
pub enum EntryDetail {
    Currency(CurrencyDetail),
    Item(ItemDetail),
    VirtualTransaction(VirtualTransactionDetail),
    StoreTransaction(StoreTransactionDetail),
}

/// An immutable, compiled catalog entry.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    key: CatalogKey,
    display_name: String,
    tags: Vec<Arc<Tag>>,
    static_properties: BTreeMap<String, PropertyValue>,
    detail: EntryDetail,
}

impl CatalogEntry {
    pub(crate) fn new(
        key: CatalogKey,
        display_name: String,
        tags: Vec<Arc<Tag>>,
        static_properties: BTreeMap<String, PropertyValue>,
        detail: EntryDetail,
    ) -> Self {
        Self {
            key,
            display_name,
            tags,
            static_properties,
            detail,
        }
    }

    /// The unique key identifying this entry.
    pub fn key(&self) -> &CatalogKey {
        &self.key
    }

    /// The human-readable display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The kind of this entry.
    pub fn kind(&self) -> EntryKind {
        match &self.detail {
            EntryDetail::Currency(_) => EntryKind::Currency,
            EntryDetail::Item(_) => EntryKind::Item,
            EntryDetail::VirtualTransaction(_) => EntryKind::VirtualTransaction,
            EntryDetail::StoreTransaction(_) => EntryKind::StoreTransaction,
        }
    }

    /// The resolved tags attached to this entry, in authoring order.
    pub fn tags(&self) -> &[Arc<Tag>] {
        &self.tags
    }

    /// Whether `tag` is present in this entry's tag array. Linear scan
    /// using tag value equality.
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.iter().any(|t| t.as_ref() == tag)
    }

    /// Look up one static property by name.
    pub fn static_property(&self, name: &str) -> Option<&PropertyValue> {
        self.static_properties.get(name)
    }

    /// All static properties.
    pub fn static_properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.static_properties
    }

    /// The kind-specific compiled data.
    pub fn detail(&self) -> &EntryDetail {
        &self.detail
    }

    /// The currency data, if this entry is a currency.
    pub fn as_currency(&self) -> Option<&CurrencyDetail> {
        match &self.detail {
            EntryDetail::Currency(d) => Some(d),
            _ => None,
        }
    }

    /// The item definition data, if this entry is an item.
    pub fn as_item(&self) -> Option<&ItemDetail> {
        match &self.detail {
            EntryDetail::Item(d) => Some(d),
            _ => None,
        }
    }

    /// The virtual transaction data, if this entry is one.
    pub fn as_virtual_transaction(&self) -> Option<&VirtualTransactionDetail> {
        match &self.detail {
            EntryDetail::VirtualTransaction(d) => Some(d),
            _ => None,
        }
    }

    /// The store transaction data, if this entry is one.
    pub fn as_store_transaction(&self) -> Option<&StoreTransactionDetail> {
        match &self.detail {
            EntryDetail::StoreTransaction(d) => Some(d),
            _ => None,
        }
    }
}

// Identity is the key alone; see the module docs.

impl PartialEq for CatalogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CatalogEntry {}

impl std::hash::Hash for CatalogEntry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for CatalogEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CatalogEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}
