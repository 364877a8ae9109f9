//! # Transaction Processing
//!
//! Applies compiled transaction entries to a session's wallet and
//! inventory. Every cost is validated before any state mutates, so a
//! failed transaction never leaves partial effects. Successful processing
//! produces an itemized [`TransactionReceipt`].
//!
//! Store transactions are *redeemed* here after the caller's platform
//! purchasing adapter (outside this crate's scope) has confirmed the
//! external purchase; only the payout side exists on this side of that
//! boundary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use tally_catalog::{CatalogEntry, EntryKind, Exchange};
use tally_core::CatalogKey;

use crate::error::EconomyError;
use crate::inventory::{InventoryManager, ItemId};
use crate::wallet::Wallet;

/// One cost line actually paid.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostPaid {
    /// Currency withdrawn from the wallet.
    Currency {
        currency: CatalogKey,
        amount: i64,
        new_balance: i64,
    },
    /// Item instances consumed from the inventory, oldest first.
    Items { item: CatalogKey, consumed: Vec<ItemId> },
}

/// One payout line actually granted.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayoutGranted {
    /// Currency deposited into the wallet (clamped at the currency's
    /// cap; the excess is forfeited).
    Currency {
        currency: CatalogKey,
        amount: i64,
        new_balance: i64,
    },
    /// Item instances created in the inventory.
    Items { item: CatalogKey, created: Vec<ItemId> },
}

/// Itemized record of one processed transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionReceipt {
    /// Unique receipt id.
    pub id: Uuid,
    /// Key of the transaction entry that was processed.
    pub transaction: CatalogKey,
    /// When processing completed.
    pub at: DateTime<Utc>,
    /// Costs paid, in the transaction's authoring order.
    pub costs_paid: Vec<CostPaid>,
    /// Payouts granted, in the transaction's authoring order.
    pub payouts_granted: Vec<PayoutGranted>,
}

/// Process a virtual transaction: validate every cost against the wallet
/// and inventory, then pay all costs and grant all payouts.
///
/// # Errors
///
/// [`EconomyError::NotATransaction`] if `entry` is not a virtual
/// transaction; [`EconomyError::InsufficientBalance`] /
/// [`EconomyError::InsufficientItems`] if any cost is unaffordable. On
/// error, no state has changed.
pub fn process_virtual_transaction(
    entry: &CatalogEntry,
    wallet: &mut Wallet,
    inventory: &mut InventoryManager,
) -> Result<TransactionReceipt, EconomyError> {
    let detail = entry
        .as_virtual_transaction()
        .ok_or_else(|| EconomyError::NotATransaction {
            key: entry.key().as_str().to_string(),
        })?;

    // Validate every cost before touching any state.
    for cost in detail.costs() {
        check_cost(cost, wallet, inventory)?;
    }

    let costs_paid = pay_costs(detail.costs(), wallet, inventory)?;
    let payouts_granted = grant_payouts(detail.payouts(), wallet, inventory)?;

    let receipt = TransactionReceipt {
        id: Uuid::new_v4(),
        transaction: entry.key().clone(),
        at: Utc::now(),
        costs_paid,
        payouts_granted,
    };
    debug!(transaction = %entry.key(), receipt = %receipt.id, "virtual transaction processed");
    Ok(receipt)
}

/// Redeem a store transaction's payouts. The external purchase itself must
/// already be confirmed by the platform adapter.
///
/// # Errors
///
/// [`EconomyError::NotATransaction`] if `entry` is not a store
/// transaction.
pub fn redeem_store_transaction(
    entry: &CatalogEntry,
    wallet: &mut Wallet,
    inventory: &mut InventoryManager,
) -> Result<TransactionReceipt, EconomyError> {
    let detail = entry
        .as_store_transaction()
        .ok_or_else(|| EconomyError::NotATransaction {
            key: entry.key().as_str().to_string(),
        })?;

    let payouts_granted = grant_payouts(detail.payouts(), wallet, inventory)?;

    let receipt = TransactionReceipt {
        id: Uuid::new_v4(),
        transaction: entry.key().clone(),
        at: Utc::now(),
        costs_paid: Vec::new(),
        payouts_granted,
    };
    debug!(
        transaction = %entry.key(),
        product_id = detail.product_id(),
        receipt = %receipt.id,
        "store transaction redeemed"
    );
    Ok(receipt)
}

/// Check a single cost line without mutating anything.
fn check_cost(
    cost: &Exchange,
    wallet: &Wallet,
    inventory: &InventoryManager,
) -> Result<(), EconomyError> {
    let tradable = cost.tradable();
    let amount = cost.amount() as i64;
    match tradable.kind() {
        EntryKind::Currency => {
            let available = wallet.balance(tradable)?;
            if available < amount {
                return Err(EconomyError::InsufficientBalance {
                    currency: tradable.key().as_str().to_string(),
                    required: amount,
                    available,
                });
            }
        }
        EntryKind::Item => {
            let available = inventory.count_by_definition(tradable);
            if available < cost.amount() as usize {
                return Err(EconomyError::InsufficientItems {
                    item: tradable.key().as_str().to_string(),
                    required: cost.amount() as usize,
                    available,
                });
            }
        }
        // The link phase only admits currencies and items as tradables.
        EntryKind::VirtualTransaction | EntryKind::StoreTransaction => unreachable!(),
    }
    Ok(())
}

/// Pay every cost line. Costs were validated, so failures here would be
/// logic errors and are still propagated rather than masked.
fn pay_costs(
    costs: &[Exchange],
    wallet: &mut Wallet,
    inventory: &mut InventoryManager,
) -> Result<Vec<CostPaid>, EconomyError> {
    let mut paid = Vec::with_capacity(costs.len());
    for cost in costs {
        let tradable = cost.tradable();
        match tradable.kind() {
            EntryKind::Currency => {
                let amount = cost.amount() as i64;
                let new_balance = wallet.withdraw(tradable, amount)?;
                paid.push(CostPaid::Currency {
                    currency: tradable.key().clone(),
                    amount,
                    new_balance,
                });
            }
            EntryKind::Item => {
                let consumed =
                    inventory.take_oldest_by_definition(tradable, cost.amount() as usize)?;
                paid.push(CostPaid::Items {
                    item: tradable.key().clone(),
                    consumed,
                });
            }
            EntryKind::VirtualTransaction | EntryKind::StoreTransaction => unreachable!(),
        }
    }
    Ok(paid)
}

/// Grant every payout line.
fn grant_payouts(
    payouts: &[Exchange],
    wallet: &mut Wallet,
    inventory: &mut InventoryManager,
) -> Result<Vec<PayoutGranted>, EconomyError> {
    let mut granted = Vec::with_capacity(payouts.len());
    for payout in payouts {
        let tradable = payout.tradable();
        match tradable.kind() {
            EntryKind::Currency => {
                let amount = payout.amount() as i64;
                let new_balance = wallet.deposit_clamped(tradable, amount)?;
                granted.push(PayoutGranted::Currency {
                    currency: tradable.key().clone(),
                    amount,
                    new_balance,
                });
            }
            EntryKind::Item => {
                let mut created = Vec::with_capacity(payout.amount() as usize);
                for _ in 0..payout.amount() {
                    created.push(inventory.create_item(tradable)?.id());
                }
                granted.push(PayoutGranted::Items {
                    item: tradable.key().clone(),
                    created,
                });
            }
            EntryKind::VirtualTransaction | EntryKind::StoreTransaction => unreachable!(),
        }
    }
    Ok(granted)
}
