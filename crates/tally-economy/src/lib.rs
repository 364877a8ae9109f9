//! # tally-economy — Wallet, Inventory & Transactions
//!
//! The economy subsystems that consume the catalog store. They interact
//! with it exclusively through its public query surface, never mutate
//! entries, and hold `Arc` references across calls relying on the
//! key-identity contract.
//!
//! - **Wallet** ([`wallet`]): per-currency balances with cap enforcement,
//!   seeded from each currency's initial balance.
//!
//! - **Inventory** ([`inventory`]): owned item instances created from item
//!   definitions, each with a unique id and creation timestamp.
//!
//! - **Transactions** ([`transaction`]): virtual transaction processing
//!   (validate every cost, then pay and grant atomically) and store
//!   transaction redemption, producing itemized receipts.
//!
//! - **Session** ([`session`]): the explicit context object owning the
//!   stores and the mutable consumer state — one session per player, no
//!   process-wide globals.

pub mod error;
pub mod inventory;
pub mod session;
pub mod transaction;
pub mod wallet;

// Re-export primary types.
pub use error::EconomyError;
pub use inventory::{InventoryItem, InventoryManager, ItemId};
pub use session::{EconomySession, SessionError};
pub use transaction::{
    process_virtual_transaction, redeem_store_transaction, CostPaid, PayoutGranted,
    TransactionReceipt,
};
pub use wallet::Wallet;
