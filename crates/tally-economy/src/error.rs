//! # Economy Error Types
//!
//! Structured errors for wallet, inventory, and transaction operations.
//! These are runtime data errors (insufficient funds, unknown products),
//! reported immediately — the aggregate-error discipline belongs to the
//! catalog build, not here.

use thiserror::Error;

use crate::inventory::ItemId;

/// Errors from wallet, inventory, and transaction operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// The entry passed to a wallet operation is not a currency.
    #[error("entry '{key}' is not a currency")]
    NotACurrency { key: String },

    /// The entry passed to an inventory operation is not an item
    /// definition.
    #[error("entry '{key}' is not an item definition")]
    NotAnItem { key: String },

    /// The entry passed to transaction processing is not a transaction of
    /// the expected kind.
    #[error("entry '{key}' is not a processable transaction")]
    NotATransaction { key: String },

    /// No transaction entry exists under the given key.
    #[error("unknown transaction '{key}'")]
    UnknownTransaction { key: String },

    /// No store transaction matches the given external product id.
    #[error("unknown product id '{product_id}'")]
    UnknownProduct { product_id: String },

    /// A wallet operation was given a negative amount.
    #[error("amount {amount} must not be negative")]
    NegativeAmount { amount: i64 },

    /// A balance write would go below zero.
    #[error("currency '{currency}': balance must not be negative (requested {requested})")]
    NegativeBalance { currency: String, requested: i64 },

    /// A balance write would exceed the currency's cap.
    #[error("currency '{currency}': balance {requested} exceeds maximum {maximum}")]
    BalanceAboveMaximum {
        currency: String,
        requested: i64,
        maximum: i64,
    },

    /// A withdrawal exceeds the available balance.
    #[error("currency '{currency}': insufficient balance (required {required}, available {available})")]
    InsufficientBalance {
        currency: String,
        required: i64,
        available: i64,
    },

    /// A transaction cost requires more item instances than the inventory
    /// holds.
    #[error("item '{item}': insufficient instances (required {required}, available {available})")]
    InsufficientItems {
        item: String,
        required: usize,
        available: usize,
    },

    /// No inventory item exists under the given instance id.
    #[error("inventory item '{id}' not found")]
    ItemNotFound { id: ItemId },
}
