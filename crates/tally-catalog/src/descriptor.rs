//! # Authoring-Time Descriptors
//!
//! Mutable records describing catalog content before compilation. One
//! descriptor type per entry kind, all embedding the common
//! [`DescriptorBase`] shape (key, display name, tag keys, static
//! properties). Descriptors are created through the
//! [`CatalogCompiler`](crate::CatalogCompiler)'s registration methods,
//! mutated freely by the configuration callback, and consumed — not
//! retained — by `build()`.
//!
//! Field validation is deliberately loose here; the compile phase is where
//! invalid combinations are reported, in aggregate, so that every authoring
//! mistake surfaces in one build attempt.

use std::collections::BTreeMap;

use tally_core::{CatalogKey, PropertyValue};

/// Fields common to every entry descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorBase {
    pub(crate) key: CatalogKey,
    pub(crate) display_name: String,
    pub(crate) tag_keys: Vec<CatalogKey>,
    pub(crate) static_properties: BTreeMap<String, PropertyValue>,
}

impl DescriptorBase {
    fn new(key: CatalogKey) -> Self {
        let display_name = key.as_str().to_string();
        Self {
            key,
            display_name,
            tag_keys: Vec::new(),
            static_properties: BTreeMap::new(),
        }
    }
}

/// Implements the shared authoring surface for a descriptor type embedding
/// a `base: DescriptorBase` field.
macro_rules! impl_descriptor_base {
    ($ty:ident) => {
        impl $ty {
            /// The key this descriptor was registered under.
            pub fn key(&self) -> &CatalogKey {
                &self.base.key
            }

            /// The display name. Defaults to the key text.
            pub fn display_name(&self) -> &str {
                &self.base.display_name
            }

            /// Replace the display name.
            pub fn set_display_name(&mut self, name: impl Into<String>) -> &mut Self {
                self.base.display_name = name.into();
                self
            }

            /// Append a tag key. The sequence is ordered; adding a key
            /// already present is a no-op. The tag itself need not exist
            /// yet — resolution happens at compile time.
            pub fn add_tag(&mut self, tag: CatalogKey) -> &mut Self {
                if !self.base.tag_keys.contains(&tag) {
                    self.base.tag_keys.push(tag);
                }
                self
            }

            /// The ordered tag keys attached so far.
            pub fn tag_keys(&self) -> &[CatalogKey] {
                &self.base.tag_keys
            }

            /// Set a static property, replacing any previous value under
            /// `name`.
            pub fn set_static_property(
                &mut self,
                name: impl Into<String>,
                value: PropertyValue,
            ) -> &mut Self {
                self.base.static_properties.insert(name.into(), value);
                self
            }

            /// The static properties attached so far.
            pub fn static_properties(&self) -> &BTreeMap<String, PropertyValue> {
                &self.base.static_properties
            }
        }
    };
}

/// One line of a transaction's cost or payout list: a target key (expected
/// to resolve to a currency or item at link time) and an amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSpec {
    /// Key of the currency or item being exchanged.
    pub target: CatalogKey,
    /// Amount exchanged. Must be positive; validated at compile time.
    pub amount: i64,
}

/// Authoring-time description of a currency.
#[derive(Debug, Clone)]
pub struct CurrencyDescriptor {
    pub(crate) base: DescriptorBase,
    pub(crate) initial_balance: i64,
    pub(crate) maximum_balance: i64,
}

impl CurrencyDescriptor {
    pub(crate) fn new(key: CatalogKey) -> Self {
        Self {
            base: DescriptorBase::new(key),
            initial_balance: 0,
            maximum_balance: 0,
        }
    }

    /// Balance granted when a wallet is first created.
    pub fn initial_balance(&self) -> i64 {
        self.initial_balance
    }

    /// Set the initial balance.
    pub fn set_initial_balance(&mut self, amount: i64) -> &mut Self {
        self.initial_balance = amount;
        self
    }

    /// Balance cap. Zero means uncapped.
    pub fn maximum_balance(&self) -> i64 {
        self.maximum_balance
    }

    /// Set the balance cap. Zero means uncapped.
    pub fn set_maximum_balance(&mut self, amount: i64) -> &mut Self {
        self.maximum_balance = amount;
        self
    }
}

impl_descriptor_base!(CurrencyDescriptor);

/// Authoring-time description of an inventory item definition.
#[derive(Debug, Clone)]
pub struct ItemDescriptor {
    pub(crate) base: DescriptorBase,
    pub(crate) initial_allocation: u32,
}

impl ItemDescriptor {
    pub(crate) fn new(key: CatalogKey) -> Self {
        Self {
            base: DescriptorBase::new(key),
            initial_allocation: 0,
        }
    }

    /// Number of instances granted when an inventory is first created.
    pub fn initial_allocation(&self) -> u32 {
        self.initial_allocation
    }

    /// Set the initial allocation.
    pub fn set_initial_allocation(&mut self, count: u32) -> &mut Self {
        self.initial_allocation = count;
        self
    }
}

impl_descriptor_base!(ItemDescriptor);

/// Authoring-time description of a virtual transaction: a cost list paid
/// from the player's wallet/inventory in exchange for a payout list.
#[derive(Debug, Clone)]
pub struct VirtualTransactionDescriptor {
    pub(crate) base: DescriptorBase,
    pub(crate) costs: Vec<ExchangeSpec>,
    pub(crate) payouts: Vec<ExchangeSpec>,
}

impl VirtualTransactionDescriptor {
    pub(crate) fn new(key: CatalogKey) -> Self {
        Self {
            base: DescriptorBase::new(key),
            costs: Vec::new(),
            payouts: Vec::new(),
        }
    }

    /// Append a cost line.
    pub fn add_cost(&mut self, target: CatalogKey, amount: i64) -> &mut Self {
        self.costs.push(ExchangeSpec { target, amount });
        self
    }

    /// Append a payout line.
    pub fn add_payout(&mut self, target: CatalogKey, amount: i64) -> &mut Self {
        self.payouts.push(ExchangeSpec { target, amount });
        self
    }

    /// The cost lines added so far.
    pub fn costs(&self) -> &[ExchangeSpec] {
        &self.costs
    }

    /// The payout lines added so far.
    pub fn payouts(&self) -> &[ExchangeSpec] {
        &self.payouts
    }
}

impl_descriptor_base!(VirtualTransactionDescriptor);

/// Authoring-time description of a store transaction: a payout list granted
/// when an external storefront purchase (identified by `product_id`) is
/// confirmed by the platform adapter.
#[derive(Debug, Clone)]
pub struct StoreTransactionDescriptor {
    pub(crate) base: DescriptorBase,
    pub(crate) product_id: String,
    pub(crate) payouts: Vec<ExchangeSpec>,
}

impl StoreTransactionDescriptor {
    pub(crate) fn new(key: CatalogKey) -> Self {
        Self {
            base: DescriptorBase::new(key),
            product_id: String::new(),
            payouts: Vec::new(),
        }
    }

    /// The external storefront product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Set the external storefront product identifier.
    pub fn set_product_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.product_id = id.into();
        self
    }

    /// Append a payout line.
    pub fn add_payout(&mut self, target: CatalogKey, amount: i64) -> &mut Self {
        self.payouts.push(ExchangeSpec { target, amount });
        self
    }

    /// The payout lines added so far.
    pub fn payouts(&self) -> &[ExchangeSpec] {
        &self.payouts
    }
}

impl_descriptor_base!(StoreTransactionDescriptor);

/// Authoring-time description of a tag. Carries only its key.
#[derive(Debug, Clone)]
pub struct TagDescriptor {
    pub(crate) key: CatalogKey,
}

impl TagDescriptor {
    pub(crate) fn new(key: CatalogKey) -> Self {
        Self { key }
    }

    /// The key this tag was registered under.
    pub fn key(&self) -> &CatalogKey {
        &self.key
    }
}
