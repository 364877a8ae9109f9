//! # tally-catalog — Catalog Construction & Query Engine
//!
//! Turns a set of mutable, loosely-validated authoring-time descriptors
//! into an immutable, indexed, cross-referenced runtime store:
//!
//! - **Descriptors** ([`descriptor`]): mutable authoring-time records, one
//!   type per entry kind (currency, item, virtual transaction, store
//!   transaction) plus tags, accumulated under one shared key namespace.
//!
//! - **Compiler** ([`compiler`]): the two-phase build orchestrator.
//!   Compile converts every descriptor independently and collects every
//!   failure; Link resolves cross-references against the full compiled set
//!   with the same fail-slow discipline. A build either produces the store
//!   pair or fails with an aggregate error carrying every cause — a
//!   partially valid store is never observable.
//!
//! - **Stores** ([`store`], [`tag`]): the immutable query surface. Exact-key
//!   lookup is the only indexed path; everything else is an O(n) scan,
//!   an accepted tradeoff at catalog scale (tens to low hundreds of
//!   entries).
//!
//! - **Settlement** ([`settlement`]): the one-shot producer/consumer handle
//!   pair through which a build result is delivered to the owning
//!   initialization sequence.
//!
//! ## Identity Contract
//!
//! Entries and tags are value types over their key: equality, hashing, and
//! ordering are defined solely by key, and downstream consumers may hold
//! `Arc` references across calls for the life of the store.

pub mod compiler;
pub mod descriptor;
pub mod entry;
pub mod error;
pub mod settlement;
pub mod store;
pub mod tag;

// Re-export primary types.
pub use compiler::{BuiltCatalog, CatalogCompiler};
pub use descriptor::{
    CurrencyDescriptor, ExchangeSpec, ItemDescriptor, StoreTransactionDescriptor, TagDescriptor,
    VirtualTransactionDescriptor,
};
pub use entry::{
    CatalogEntry, CurrencyDetail, EntryDetail, EntryKind, Exchange, ItemDetail,
    StoreTransactionDetail, VirtualTransactionDetail,
};
pub use error::{BuildError, CompileError, LinkError, RegistryError};
pub use settlement::{channel, Completer, SettleError, Settlement};
pub use store::CatalogStore;
pub use tag::{Tag, TagStore};
