//! # Catalog Error Types
//!
//! The catalog draws a hard line between three failure families:
//!
//! - **Registration errors** ([`RegistryError`]): programmer errors raised
//!   synchronously at registration time. Never aggregated.
//! - **Compile / link errors** ([`CompileError`], [`LinkError`]): data
//!   errors in descriptors, collected fail-slow across one build attempt.
//! - **Aggregate build failure** ([`BuildError`]): the single error value a
//!   failed build settles with, carrying the full cause list so that every
//!   authoring defect can be fixed in one iteration.

use thiserror::Error;

use tally_core::KeyError;

use crate::entry::EntryKind;

/// Synchronous descriptor-registration failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The key already exists in the shared namespace — entries of all
    /// kinds and tags are checked together.
    #[error("duplicate catalog key '{key}'")]
    DuplicateKey {
        /// The key that was already registered.
        key: String,
    },

    /// The key text failed validation.
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
}

/// A single descriptor's conversion failure, collected during the compile
/// phase. One cause per failing descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The display name is empty or whitespace-only.
    #[error("entry '{key}': display name must not be empty")]
    EmptyDisplayName { key: String },

    /// A currency's initial balance is negative.
    #[error("currency '{key}': initial balance {initial} must not be negative")]
    NegativeInitialBalance { key: String, initial: i64 },

    /// A currency's maximum balance is negative.
    #[error("currency '{key}': maximum balance {maximum} must not be negative")]
    NegativeMaximumBalance { key: String, maximum: i64 },

    /// A capped currency's initial balance exceeds its maximum.
    #[error("currency '{key}': initial balance {initial} exceeds maximum balance {maximum}")]
    InitialExceedsMaximum {
        key: String,
        initial: i64,
        maximum: i64,
    },

    /// An entry references a tag key with no registered tag descriptor.
    #[error("entry '{key}': unknown tag '{tag}'")]
    UnknownTag { key: String, tag: String },

    /// An exchange line carries a non-positive amount.
    #[error("transaction '{key}': exchange amount {amount} for '{target}' must be positive")]
    NonPositiveAmount {
        key: String,
        target: String,
        amount: i64,
    },

    /// The same target appears twice within one exchange list.
    #[error("transaction '{key}': duplicate exchange target '{target}'")]
    DuplicateExchangeTarget { key: String, target: String },

    /// A transaction grants nothing.
    #[error("transaction '{key}': must grant at least one payout")]
    EmptyPayout { key: String },

    /// A store transaction has no external product identifier.
    #[error("store transaction '{key}': product id must not be empty")]
    EmptyProductId { key: String },
}

/// A single reference-resolution failure, collected during the link phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// An exchange line references a key absent from the compiled set.
    #[error("transaction '{key}': references unknown entry '{target}'")]
    DanglingReference { key: String, target: String },

    /// An exchange line references an entry that is neither a currency nor
    /// an item.
    #[error("transaction '{key}': '{target}' is a {actual} and cannot be traded")]
    NotTradable {
        key: String,
        target: String,
        actual: EntryKind,
    },
}

/// Aggregate failure of one build attempt. Either the compile phase or the
/// link phase failed; the full cause list is carried so callers can surface
/// every defect at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The compile phase collected one or more descriptor failures. The
    /// link phase never ran.
    #[error("catalog compile failed with {} error(s)", .0.len())]
    Compile(Vec<CompileError>),

    /// The link phase collected one or more reference failures. The
    /// compiled entries were discarded.
    #[error("catalog link failed with {} error(s)", .0.len())]
    Link(Vec<LinkError>),
}

impl BuildError {
    /// Every individual cause, rendered. Callers surfacing a failed build
    /// must report the full list, not just the first.
    pub fn causes(&self) -> Vec<String> {
        match self {
            BuildError::Compile(errors) => errors.iter().map(ToString::to_string).collect(),
            BuildError::Link(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// The compile-phase causes, if this is a compile failure.
    pub fn compile_errors(&self) -> Option<&[CompileError]> {
        match self {
            BuildError::Compile(errors) => Some(errors),
            BuildError::Link(_) => None,
        }
    }

    /// The link-phase causes, if this is a link failure.
    pub fn link_errors(&self) -> Option<&[LinkError]> {
        match self {
            BuildError::Link(errors) => Some(errors),
            BuildError::Compile(_) => None,
        }
    }
}
