//! # Catalog Compiler
//!
//! The build orchestrator. Accumulates entry and tag descriptors under one
//! shared key namespace, then executes the two-phase pipeline:
//!
//! 1. **Compile** — tags convert first, then every entry descriptor
//!    converts to its runtime form independently. A failure in one
//!    descriptor never stops the compilation of the others; all failures
//!    collect into one list.
//! 2. **Link** — reached only on a fully successful compile. Every entry's
//!    cross-references resolve against the full compiled set with the same
//!    fail-slow discipline. Link therefore never needs to special-case a
//!    referenced entry that failed to compile.
//!
//! A build settles exactly once: with the immutable store pair, or with an
//! aggregate error carrying every cause. A partially valid store is never
//! observable.

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use tally_core::{CatalogKey, PropertyValue};

use crate::descriptor::{
    CurrencyDescriptor, DescriptorBase, ExchangeSpec, ItemDescriptor, StoreTransactionDescriptor,
    TagDescriptor, VirtualTransactionDescriptor,
};
use crate::entry::{
    CatalogEntry, CurrencyDetail, EntryDetail, EntryKind, Exchange, ItemDetail,
    StoreTransactionDetail, VirtualTransactionDetail,
};
use crate::error::{BuildError, CompileError, LinkError, RegistryError};
use crate::settlement::Completer;
use crate::store::CatalogStore;
use crate::tag::{Tag, TagStore};

/// The store pair produced by a successful build.
#[derive(Debug, Clone)]
pub struct BuiltCatalog {
    /// The immutable, indexed container of all compiled entries.
    pub catalog: CatalogStore,
    /// The flat collection of all compiled tags.
    pub tags: TagStore,
}

/// Accumulates descriptors and executes the two-phase build.
#[derive(Debug, Default)]
pub struct CatalogCompiler {
    /// The shared namespace: every entry key of every kind, and every tag
    /// key, is claimed here exactly once.
    keys: BTreeSet<CatalogKey>,
    tags: BTreeMap<CatalogKey, TagDescriptor>,
    currencies: BTreeMap<CatalogKey, CurrencyDescriptor>,
    items: BTreeMap<CatalogKey, ItemDescriptor>,
    virtual_transactions: BTreeMap<CatalogKey, VirtualTransactionDescriptor>,
    store_transactions: BTreeMap<CatalogKey, StoreTransactionDescriptor>,
}

impl CatalogCompiler {
    /// Create an empty compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a currency descriptor under `key`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateKey`] if the key exists anywhere in the
    /// shared namespace, regardless of kind;
    /// [`RegistryError::InvalidKey`] if the key text fails validation.
    pub fn register_currency(&mut self, key: &str) -> Result<&mut CurrencyDescriptor, RegistryError> {
        let key = self.claim(key)?;
        Ok(self
            .currencies
            .entry(key.clone())
            .or_insert_with(|| CurrencyDescriptor::new(key)))
    }

    /// Register an inventory item descriptor under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogCompiler::register_currency`].
    pub fn register_item(&mut self, key: &str) -> Result<&mut ItemDescriptor, RegistryError> {
        let key = self.claim(key)?;
        Ok(self
            .items
            .entry(key.clone())
            .or_insert_with(|| ItemDescriptor::new(key)))
    }

    /// Register a virtual transaction descriptor under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogCompiler::register_currency`].
    pub fn register_virtual_transaction(
        &mut self,
        key: &str,
    ) -> Result<&mut VirtualTransactionDescriptor, RegistryError> {
        let key = self.claim(key)?;
        Ok(self
            .virtual_transactions
            .entry(key.clone())
            .or_insert_with(|| VirtualTransactionDescriptor::new(key)))
    }

    /// Register a store transaction descriptor under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogCompiler::register_currency`].
    pub fn register_store_transaction(
        &mut self,
        key: &str,
    ) -> Result<&mut StoreTransactionDescriptor, RegistryError> {
        let key = self.claim(key)?;
        Ok(self
            .store_transactions
            .entry(key.clone())
            .or_insert_with(|| StoreTransactionDescriptor::new(key)))
    }

    /// Get the tag descriptor under `key`, creating it if absent.
    /// Idempotent for an existing tag.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateKey`] if creating would reuse an entry
    /// key (the namespace is shared);
    /// [`RegistryError::InvalidKey`] if the key text fails validation.
    pub fn get_or_create_tag(&mut self, key: &str) -> Result<&mut TagDescriptor, RegistryError> {
        let key = CatalogKey::new(key)?;
        match self.tags.entry(key.clone()) {
            btree_map::Entry::Occupied(existing) => Ok(existing.into_mut()),
            btree_map::Entry::Vacant(vacant) => {
                if !self.keys.insert(key.clone()) {
                    return Err(RegistryError::DuplicateKey {
                        key: key.as_str().to_string(),
                    });
                }
                Ok(vacant.insert(TagDescriptor::new(key)))
            }
        }
    }

    /// Look up an existing tag descriptor without creating one.
    pub fn find_tag(&self, key: &str) -> Option<&TagDescriptor> {
        let key = CatalogKey::new(key).ok()?;
        self.tags.get(&key)
    }

    /// Number of entry descriptors registered so far (all kinds, tags
    /// excluded).
    pub fn entry_count(&self) -> usize {
        self.currencies.len()
            + self.items.len()
            + self.virtual_transactions.len()
            + self.store_transactions.len()
    }

    /// Number of tag descriptors registered so far.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Execute the two-phase build, consuming the compiler. Descriptors
    /// are discarded; only the immutable stores survive.
    ///
    /// # Errors
    ///
    /// [`BuildError::Compile`] with every descriptor failure if the
    /// compile phase collected any; otherwise [`BuildError::Link`] with
    /// every reference failure if the link phase collected any.
    pub fn build(self) -> Result<BuiltCatalog, BuildError> {
        debug!(
            tags = self.tags.len(),
            entries = self.entry_count(),
            "catalog build: compile phase"
        );

        // Tags compile first so that entry tag resolution can run inside
        // each entry's own isolated conversion. Tag keys were validated at
        // registration, so tag conversion itself cannot fail.
        let compiled_tags: BTreeMap<CatalogKey, Arc<Tag>> = self
            .tags
            .into_values()
            .map(|d| {
                let key = d.key().clone();
                (key.clone(), Arc::new(Tag::new(key)))
            })
            .collect();

        let mut errors = Vec::new();
        let mut compiled: BTreeMap<CatalogKey, Unlinked> = BTreeMap::new();
        let mut collect = |key: CatalogKey, result: Result<Unlinked, CompileError>| match result {
            Ok(entry) => {
                compiled.insert(key, entry);
            }
            Err(error) => {
                warn!(key = %key, %error, "descriptor failed to compile");
                errors.push(error);
            }
        };

        for (key, desc) in self.currencies {
            collect(key, compile_currency(desc, &compiled_tags));
        }
        for (key, desc) in self.items {
            collect(key, compile_item(desc, &compiled_tags));
        }
        for (key, desc) in self.virtual_transactions {
            collect(key, compile_virtual_transaction(desc, &compiled_tags));
        }
        for (key, desc) in self.store_transactions {
            collect(key, compile_store_transaction(desc, &compiled_tags));
        }

        if !errors.is_empty() {
            warn!(count = errors.len(), "catalog build failed in compile phase");
            return Err(BuildError::Compile(errors));
        }

        // Link phase: resolve every entry's cross-references against the
        // full compiled set, fail-slow.
        debug!(entries = compiled.len(), "catalog build: link phase");
        let mut link_errors = Vec::new();
        for (key, entry) in &compiled {
            link_entry(key, entry, &compiled, &mut link_errors);
        }
        if !link_errors.is_empty() {
            warn!(
                count = link_errors.len(),
                "catalog build failed in link phase"
            );
            return Err(BuildError::Link(link_errors));
        }

        let built = assemble(compiled, compiled_tags);
        debug!(
            entries = built.catalog.len(),
            tags = built.tags.len(),
            "catalog build succeeded"
        );
        Ok(built)
    }

    /// Execute the build and settle `completer` with the outcome. The
    /// pipeline itself never suspends; this exists so the owning
    /// initialization sequence can await the settlement at its boundary.
    pub fn build_deferred(self, completer: &mut Completer<BuiltCatalog, BuildError>) {
        let outcome = self.build();
        let settled = match outcome {
            Ok(built) => completer.resolve(built),
            Err(error) => completer.reject(error),
        };
        if let Err(error) = settled {
            warn!(%error, "catalog build result could not be delivered");
        }
    }

    /// Claim `key` in the shared namespace.
    fn claim(&mut self, key: &str) -> Result<CatalogKey, RegistryError> {
        let key = CatalogKey::new(key)?;
        if !self.keys.insert(key.clone()) {
            return Err(RegistryError::DuplicateKey {
                key: key.as_str().to_string(),
            });
        }
        Ok(key)
    }
}

// ---------------------------------------------------------------------------
// Compile phase
// ---------------------------------------------------------------------------

/// A compiled entry whose cross-references are still key-shaped. Private
/// to the build; becomes a [`CatalogEntry`] during assembly.
#[derive(Debug)]
struct Unlinked {
    display_name: String,
    tags: Vec<Arc<Tag>>,
    static_properties: BTreeMap<String, PropertyValue>,
    detail: UnlinkedDetail,
}

#[derive(Debug)]
enum UnlinkedDetail {
    Currency(CurrencyDetail),
    Item(ItemDetail),
    VirtualTransaction {
        costs: Vec<ExchangeSpec>,
        payouts: Vec<ExchangeSpec>,
    },
    StoreTransaction {
        product_id: String,
        payouts: Vec<ExchangeSpec>,
    },
}

impl Unlinked {
    fn kind(&self) -> EntryKind {
        match &self.detail {
            UnlinkedDetail::Currency(_) => EntryKind::Currency,
            UnlinkedDetail::Item(_) => EntryKind::Item,
            UnlinkedDetail::VirtualTransaction { .. } => EntryKind::VirtualTransaction,
            UnlinkedDetail::StoreTransaction { .. } => EntryKind::StoreTransaction,
        }
    }
}

/// Convert the common descriptor shape: validated display name plus
/// resolved tag references.
fn compile_base(
    base: &DescriptorBase,
    tags: &BTreeMap<CatalogKey, Arc<Tag>>,
) -> Result<(String, Vec<Arc<Tag>>), CompileError> {
    if base.display_name.trim().is_empty() {
        return Err(CompileError::EmptyDisplayName {
            key: base.key.as_str().to_string(),
        });
    }
    let mut resolved = Vec::with_capacity(base.tag_keys.len());
    for tag_key in &base.tag_keys {
        match tags.get(tag_key) {
            Some(tag) => resolved.push(Arc::clone(tag)),
            None => {
                return Err(CompileError::UnknownTag {
                    key: base.key.as_str().to_string(),
                    tag: tag_key.as_str().to_string(),
                })
            }
        }
    }
    Ok((base.display_name.clone(), resolved))
}

fn compile_currency(
    desc: CurrencyDescriptor,
    tags: &BTreeMap<CatalogKey, Arc<Tag>>,
) -> Result<Unlinked, CompileError> {
    let (display_name, resolved) = compile_base(&desc.base, tags)?;
    let key = desc.base.key.as_str();
    if desc.initial_balance < 0 {
        return Err(CompileError::NegativeInitialBalance {
            key: key.to_string(),
            initial: desc.initial_balance,
        });
    }
    if desc.maximum_balance < 0 {
        return Err(CompileError::NegativeMaximumBalance {
            key: key.to_string(),
            maximum: desc.maximum_balance,
        });
    }
    if desc.maximum_balance > 0 && desc.initial_balance > desc.maximum_balance {
        return Err(CompileError::InitialExceedsMaximum {
            key: key.to_string(),
            initial: desc.initial_balance,
            maximum: desc.maximum_balance,
        });
    }
    Ok(Unlinked {
        display_name,
        tags: resolved,
        static_properties: desc.base.static_properties,
        detail: UnlinkedDetail::Currency(CurrencyDetail {
            initial_balance: desc.initial_balance,
            maximum_balance: desc.maximum_balance,
        }),
    })
}

fn compile_item(
    desc: ItemDescriptor,
    tags: &BTreeMap<CatalogKey, Arc<Tag>>,
) -> Result<Unlinked, CompileError> {
    let (display_name, resolved) = compile_base(&desc.base, tags)?;
    Ok(Unlinked {
        display_name,
        tags: resolved,
        static_properties: desc.base.static_properties,
        detail: UnlinkedDetail::Item(ItemDetail {
            initial_allocation: desc.initial_allocation,
        }),
    })
}

fn compile_virtual_transaction(
    desc: VirtualTransactionDescriptor,
    tags: &BTreeMap<CatalogKey, Arc<Tag>>,
) -> Result<Unlinked, CompileError> {
    let (display_name, resolved) = compile_base(&desc.base, tags)?;
    let key = &desc.base.key;
    if desc.payouts.is_empty() {
        return Err(CompileError::EmptyPayout {
            key: key.as_str().to_string(),
        });
    }
    check_exchange_list(key, &desc.costs)?;
    check_exchange_list(key, &desc.payouts)?;
    Ok(Unlinked {
        display_name,
        tags: resolved,
        static_properties: desc.base.static_properties,
        detail: UnlinkedDetail::VirtualTransaction {
            costs: desc.costs,
            payouts: desc.payouts,
        },
    })
}

fn compile_store_transaction(
    desc: StoreTransactionDescriptor,
    tags: &BTreeMap<CatalogKey, Arc<Tag>>,
) -> Result<Unlinked, CompileError> {
    let (display_name, resolved) = compile_base(&desc.base, tags)?;
    let key = &desc.base.key;
    if desc.product_id.trim().is_empty() {
        return Err(CompileError::EmptyProductId {
            key: key.as_str().to_string(),
        });
    }
    if desc.payouts.is_empty() {
        return Err(CompileError::EmptyPayout {
            key: key.as_str().to_string(),
        });
    }
    check_exchange_list(key, &desc.payouts)?;
    Ok(Unlinked {
        display_name,
        tags: resolved,
        static_properties: desc.base.static_properties,
        detail: UnlinkedDetail::StoreTransaction {
            product_id: desc.product_id,
            payouts: desc.payouts,
        },
    })
}

/// Validate one exchange list: positive amounts, no duplicate targets.
fn check_exchange_list(key: &CatalogKey, specs: &[ExchangeSpec]) -> Result<(), CompileError> {
    let mut seen = BTreeSet::new();
    for spec in specs {
        if spec.amount <= 0 {
            return Err(CompileError::NonPositiveAmount {
                key: key.as_str().to_string(),
                target: spec.target.as_str().to_string(),
                amount: spec.amount,
            });
        }
        if !seen.insert(&spec.target) {
            return Err(CompileError::DuplicateExchangeTarget {
                key: key.as_str().to_string(),
                target: spec.target.as_str().to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Link phase
// ---------------------------------------------------------------------------

/// Resolve one entry's cross-references against the full compiled set,
/// appending every failure.
fn link_entry(
    key: &CatalogKey,
    entry: &Unlinked,
    all: &BTreeMap<CatalogKey, Unlinked>,
    errors: &mut Vec<LinkError>,
) {
    let specs: Vec<&ExchangeSpec> = match &entry.detail {
        UnlinkedDetail::VirtualTransaction { costs, payouts } => {
            costs.iter().chain(payouts.iter()).collect()
        }
        UnlinkedDetail::StoreTransaction { payouts, .. } => payouts.iter().collect(),
        // Currencies and items carry no cross-references and link trivially.
        UnlinkedDetail::Currency(_) | UnlinkedDetail::Item(_) => return,
    };
    for spec in specs {
        match all.get(&spec.target) {
            None => errors.push(LinkError::DanglingReference {
                key: key.as_str().to_string(),
                target: spec.target.as_str().to_string(),
            }),
            Some(target) => match target.kind() {
                EntryKind::Currency | EntryKind::Item => {}
                actual => errors.push(LinkError::NotTradable {
                    key: key.as_str().to_string(),
                    target: spec.target.as_str().to_string(),
                    actual,
                }),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Construct the final immutable graph. The reference graph is
/// kind-stratified (transactions reference only currencies and items), so
/// two passes suffice: leaves first, then transactions holding direct
/// `Arc` references into them.
fn assemble(
    compiled: BTreeMap<CatalogKey, Unlinked>,
    tags: BTreeMap<CatalogKey, Arc<Tag>>,
) -> BuiltCatalog {
    let mut entries: BTreeMap<CatalogKey, Arc<CatalogEntry>> = BTreeMap::new();
    let mut transactions: Vec<(CatalogKey, Unlinked)> = Vec::new();

    for (key, unlinked) in compiled {
        match unlinked.detail {
            UnlinkedDetail::Currency(detail) => {
                entries.insert(
                    key.clone(),
                    Arc::new(CatalogEntry::new(
                        key,
                        unlinked.display_name,
                        unlinked.tags,
                        unlinked.static_properties,
                        EntryDetail::Currency(detail),
                    )),
                );
            }
            UnlinkedDetail::Item(detail) => {
                entries.insert(
                    key.clone(),
                    Arc::new(CatalogEntry::new(
                        key,
                        unlinked.display_name,
                        unlinked.tags,
                        unlinked.static_properties,
                        EntryDetail::Item(detail),
                    )),
                );
            }
            _ => transactions.push((key, unlinked)),
        }
    }

    for (key, unlinked) in transactions {
        let detail = match unlinked.detail {
            UnlinkedDetail::VirtualTransaction { costs, payouts } => {
                EntryDetail::VirtualTransaction(VirtualTransactionDetail {
                    costs: resolve_exchanges(costs, &entries),
                    payouts: resolve_exchanges(payouts, &entries),
                })
            }
            UnlinkedDetail::StoreTransaction { product_id, payouts } => {
                EntryDetail::StoreTransaction(StoreTransactionDetail {
                    product_id,
                    payouts: resolve_exchanges(payouts, &entries),
                })
            }
            UnlinkedDetail::Currency(_) | UnlinkedDetail::Item(_) => unreachable!(),
        };
        entries.insert(
            key.clone(),
            Arc::new(CatalogEntry::new(
                key,
                unlinked.display_name,
                unlinked.tags,
                unlinked.static_properties,
                detail,
            )),
        );
    }

    BuiltCatalog {
        catalog: CatalogStore::new(entries),
        tags: TagStore::new(tags.into_values().collect()),
    }
}

fn resolve_exchanges(
    specs: Vec<ExchangeSpec>,
    entries: &BTreeMap<CatalogKey, Arc<CatalogEntry>>,
) -> Vec<Exchange> {
    specs
        .into_iter()
        .map(|spec| {
            let tradable = entries
                .get(&spec.target)
                .expect("link phase guarantees every exchange target exists");
            // Amount positivity was enforced at compile time.
            Exchange::new(Arc::clone(tradable), spec.amount as u64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    fn key(text: &str) -> CatalogKey {
        CatalogKey::new(text).unwrap()
    }

    /// A small, fully valid catalog used by several tests.
    fn valid_compiler() -> CatalogCompiler {
        let mut compiler = CatalogCompiler::new();
        compiler.get_or_create_tag("rare").unwrap();
        compiler
            .register_currency("gold")
            .unwrap()
            .set_display_name("Gold")
            .set_initial_balance(100);
        compiler
            .register_item("sword")
            .unwrap()
            .set_display_name("Sword")
            .add_tag(key("rare"));
        compiler
            .register_virtual_transaction("buy-sword")
            .unwrap()
            .add_cost(key("gold"), 50)
            .add_payout(key("sword"), 1);
        compiler
    }

    #[test]
    fn duplicate_key_fails_at_registration_across_kinds() {
        let mut compiler = CatalogCompiler::new();
        compiler.register_currency("gold").unwrap();
        let err = compiler.register_item("gold").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateKey {
                key: "gold".to_string()
            }
        );
    }

    #[test]
    fn tag_keys_share_the_entry_namespace() {
        let mut compiler = CatalogCompiler::new();
        compiler.register_currency("gold").unwrap();
        assert!(compiler.get_or_create_tag("gold").is_err());

        compiler.get_or_create_tag("rare").unwrap();
        assert!(compiler.register_item("rare").is_err());
    }

    #[test]
    fn get_or_create_tag_is_idempotent() {
        let mut compiler = CatalogCompiler::new();
        compiler.get_or_create_tag("rare").unwrap();
        compiler.get_or_create_tag("rare").unwrap();
        assert_eq!(compiler.tag_count(), 1);
        assert!(compiler.find_tag("rare").is_some());
        assert!(compiler.find_tag("epic").is_none());
    }

    #[test]
    fn invalid_key_fails_at_registration() {
        let mut compiler = CatalogCompiler::new();
        assert!(matches!(
            compiler.register_currency("not a key"),
            Err(RegistryError::InvalidKey(_))
        ));
    }

    #[test]
    fn valid_catalog_builds() {
        let built = valid_compiler().build().unwrap();
        assert_eq!(built.catalog.len(), 3);
        assert_eq!(built.tags.len(), 1);

        let sword = built.catalog.find(EntryKind::Item, "sword").unwrap();
        let rare = built.tags.find("rare").unwrap();
        assert!(sword.has_tag(rare));
    }

    #[test]
    fn transaction_references_resolve_to_direct_entries() {
        let built = valid_compiler().build().unwrap();
        let buy = built
            .catalog
            .find(EntryKind::VirtualTransaction, "buy-sword")
            .unwrap();
        let detail = buy.as_virtual_transaction().unwrap();
        assert_eq!(detail.costs().len(), 1);
        assert_eq!(detail.costs()[0].tradable().key().as_str(), "gold");
        assert_eq!(detail.costs()[0].amount(), 50);
        assert_eq!(detail.payouts()[0].tradable().key().as_str(), "sword");

        // The reference is the same allocation the store holds.
        let gold = built.catalog.find(EntryKind::Currency, "gold").unwrap();
        assert!(Arc::ptr_eq(detail.costs()[0].tradable(), gold));
    }

    #[test]
    fn single_compile_failure_yields_one_cause() {
        let mut compiler = valid_compiler();
        compiler
            .register_currency("gems")
            .unwrap()
            .set_initial_balance(50)
            .set_maximum_balance(10);
        let err = compiler.build().unwrap_err();
        let causes = err.compile_errors().unwrap();
        assert_eq!(causes.len(), 1);
        assert!(matches!(
            causes[0],
            CompileError::InitialExceedsMaximum { .. }
        ));
    }

    #[test]
    fn compile_is_fail_slow_across_descriptors() {
        let mut compiler = CatalogCompiler::new();
        // Three defective descriptors out of four.
        compiler
            .register_currency("gems")
            .unwrap()
            .set_initial_balance(-5);
        compiler
            .register_item("shield")
            .unwrap()
            .set_display_name("   ");
        compiler
            .register_store_transaction("bundle")
            .unwrap()
            .add_payout(key("gold"), 10); // product id missing
        compiler.register_currency("gold").unwrap();

        let err = compiler.build().unwrap_err();
        let causes = err.compile_errors().unwrap();
        assert_eq!(causes.len(), 3);
    }

    #[test]
    fn compile_failure_prevents_link_and_store() {
        let mut compiler = CatalogCompiler::new();
        compiler
            .register_currency("gems")
            .unwrap()
            .set_initial_balance(-5);
        // This transaction also dangles, but the compile gate must win and
        // the dangling reference must not be reported this attempt.
        compiler
            .register_virtual_transaction("buy")
            .unwrap()
            .add_payout(key("missing"), 1);
        let err = compiler.build().unwrap_err();
        assert!(matches!(err, BuildError::Compile(_)));
        assert_eq!(err.compile_errors().unwrap().len(), 1);
    }

    #[test]
    fn dangling_reference_fails_link_with_the_target_named() {
        let mut compiler = CatalogCompiler::new();
        compiler.register_currency("gold").unwrap();
        compiler
            .register_virtual_transaction("buy-sword")
            .unwrap()
            .add_cost(key("gold"), 50)
            .add_payout(key("sword"), 1);
        let err = compiler.build().unwrap_err();
        let causes = err.link_errors().unwrap();
        assert_eq!(causes.len(), 1);
        assert_eq!(
            causes[0],
            LinkError::DanglingReference {
                key: "buy-sword".to_string(),
                target: "sword".to_string(),
            }
        );
    }

    #[test]
    fn link_collects_every_failure() {
        let mut compiler = CatalogCompiler::new();
        compiler.register_currency("gold").unwrap();
        compiler
            .register_virtual_transaction("a")
            .unwrap()
            .add_payout(key("missing-one"), 1);
        compiler
            .register_virtual_transaction("b")
            .unwrap()
            .add_payout(key("missing-two"), 1);
        let err = compiler.build().unwrap_err();
        assert_eq!(err.link_errors().unwrap().len(), 2);
    }

    #[test]
    fn referencing_a_transaction_is_not_tradable() {
        let mut compiler = CatalogCompiler::new();
        compiler.register_currency("gold").unwrap();
        compiler
            .register_virtual_transaction("inner")
            .unwrap()
            .add_payout(key("gold"), 1);
        compiler
            .register_virtual_transaction("outer")
            .unwrap()
            .add_payout(key("inner"), 1);
        let err = compiler.build().unwrap_err();
        let causes = err.link_errors().unwrap();
        assert_eq!(causes.len(), 1);
        assert!(matches!(causes[0], LinkError::NotTradable { .. }));
    }

    #[test]
    fn unknown_tag_is_a_compile_error() {
        let mut compiler = CatalogCompiler::new();
        compiler
            .register_currency("gold")
            .unwrap()
            .add_tag(key("shiny"));
        let err = compiler.build().unwrap_err();
        let causes = err.compile_errors().unwrap();
        assert_eq!(causes.len(), 1);
        assert!(matches!(causes[0], CompileError::UnknownTag { .. }));
    }

    #[test]
    fn duplicate_exchange_target_is_a_compile_error() {
        let mut compiler = CatalogCompiler::new();
        compiler.register_currency("gold").unwrap();
        compiler.register_item("sword").unwrap();
        compiler
            .register_virtual_transaction("buy")
            .unwrap()
            .add_cost(key("gold"), 10)
            .add_cost(key("gold"), 20)
            .add_payout(key("sword"), 1);
        let err = compiler.build().unwrap_err();
        assert!(matches!(
            err.compile_errors().unwrap()[0],
            CompileError::DuplicateExchangeTarget { .. }
        ));
    }

    #[test]
    fn build_deferred_settles_the_completer() {
        let (mut tx, mut rx) = crate::settlement::channel();
        valid_compiler().build_deferred(&mut tx);
        assert_eq!(rx.poll(), Ok(true));
        let built = rx.take().unwrap().unwrap();
        assert_eq!(built.catalog.len(), 3);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Strategy for sets of pairwise-distinct keys split across kinds.
        fn distinct_keys() -> impl Strategy<Value = Vec<String>> {
            prop::collection::btree_set("[a-z]{1,8}", 1..20)
                .prop_map(|set| set.into_iter().collect())
        }

        proptest! {
            /// Pairwise-distinct keys with satisfiable references always
            /// build, and every key is found under its registered kind
            /// and no other.
            #[test]
            fn distinct_keys_always_build(keys in distinct_keys()) {
                let mut compiler = CatalogCompiler::new();
                // Alternate kinds; transactions reference the first
                // currency, so register it up front.
                let mut kinds: Vec<(String, EntryKind)> = Vec::new();
                let first = keys[0].clone();
                compiler.register_currency(&first).unwrap();
                kinds.push((first.clone(), EntryKind::Currency));
                for (index, text) in keys.iter().enumerate().skip(1) {
                    let kind = match index % 3 {
                        0 => {
                            compiler.register_currency(text).unwrap();
                            EntryKind::Currency
                        }
                        1 => {
                            compiler.register_item(text).unwrap();
                            EntryKind::Item
                        }
                        _ => {
                            compiler
                                .register_virtual_transaction(text)
                                .unwrap()
                                .add_payout(CatalogKey::new(first.as_str()).unwrap(), 1);
                            EntryKind::VirtualTransaction
                        }
                    };
                    kinds.push((text.clone(), kind));
                }

                let built = compiler.build().unwrap();
                prop_assert_eq!(built.catalog.len(), kinds.len());
                for (text, kind) in &kinds {
                    prop_assert!(built.catalog.find(*kind, text).is_some());
                    for other in [
                        EntryKind::Currency,
                        EntryKind::Item,
                        EntryKind::VirtualTransaction,
                        EntryKind::StoreTransaction,
                    ] {
                        if other != *kind {
                            prop_assert!(built.catalog.find(other, text).is_none());
                        }
                    }
                }
            }
        }
    }
}
