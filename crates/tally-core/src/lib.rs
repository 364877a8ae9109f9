//! # tally-core — Foundational Types
//!
//! Shared primitives for the tally economy stack:
//!
//! - **Catalog keys** ([`key`]): the validated identifier newtype under
//!   which every catalog object — entries of all kinds and tags — is
//!   registered. One shared namespace, value semantics.
//!
//! - **Property values** ([`property`]): the closed set of typed static
//!   property values attachable to catalog entries (integer, float, bool,
//!   text, and two string-encoded asset reference kinds).
//!
//! Everything downstream (catalog engine, wallet, inventory, transactions)
//! builds on these types; this crate has no knowledge of the catalog
//! itself.

pub mod error;
pub mod key;
pub mod property;

// Re-export primary types.
pub use error::KeyError;
pub use key::CatalogKey;
pub use property::{PropertyKind, PropertyValue};
