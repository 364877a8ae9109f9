//! # Economy Session
//!
//! The explicit context object owning one session's economy state: the
//! immutable store pair published as shared read-only state, and the
//! wallet/inventory behind reader-writer locks. Subsystems receive this
//! handle instead of reaching for process-wide globals, preserving
//! one-store-per-session semantics without hidden mutable state.
//!
//! ## Initialization
//!
//! [`EconomySession::initialize`] drives the whole intake flow: the
//! configuration callback populates a fresh compiler, the build runs, and
//! the one-shot settlement is awaited at the boundary. On failure the
//! session is never constructed — no partial store escapes.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::info;

use tally_catalog::{
    channel, BuildError, CatalogCompiler, CatalogStore, RegistryError, SettleError, TagStore,
};

use crate::error::EconomyError;
use crate::inventory::InventoryManager;
use crate::transaction::{
    process_virtual_transaction, redeem_store_transaction, TransactionReceipt,
};
use crate::wallet::Wallet;

/// Errors aborting session initialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The configuration callback failed to register its descriptors.
    #[error("catalog configuration failed: {0}")]
    Registry(#[from] RegistryError),

    /// The build failed; the full cause list is inside.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The build settlement was violated (dropped producer or consumer).
    #[error("catalog build settlement failed: {0}")]
    Settlement(#[from] SettleError),
}

/// One session's economy state.
#[derive(Debug)]
pub struct EconomySession {
    catalog: Arc<CatalogStore>,
    tags: Arc<TagStore>,
    wallet: RwLock<Wallet>,
    inventory: RwLock<InventoryManager>,
}

impl EconomySession {
    /// Build a session from scratch: hand a fresh compiler to `configure`,
    /// run the two-phase build, await its settlement, and seed the wallet
    /// and inventory from the resulting catalog.
    ///
    /// # Errors
    ///
    /// [`SessionError::Registry`] if configuration fails,
    /// [`SessionError::Build`] with every aggregate cause if the build
    /// fails. Nothing of a failed session is observable.
    pub async fn initialize<F>(configure: F) -> Result<Self, SessionError>
    where
        F: FnOnce(&mut CatalogCompiler) -> Result<(), RegistryError>,
    {
        let mut compiler = CatalogCompiler::new();
        configure(&mut compiler)?;

        let (mut completer, settlement) = channel();
        compiler.build_deferred(&mut completer);
        let built = settlement.wait().await??;

        let wallet = Wallet::from_catalog(&built.catalog);
        let mut inventory = InventoryManager::new();
        let granted = inventory.grant_initial_allocations(&built.catalog);

        info!(
            entries = built.catalog.len(),
            tags = built.tags.len(),
            currencies = wallet.len(),
            initial_items = granted,
            "economy session initialized"
        );

        Ok(Self {
            catalog: Arc::new(built.catalog),
            tags: Arc::new(built.tags),
            wallet: RwLock::new(wallet),
            inventory: RwLock::new(inventory),
        })
    }

    /// The shared catalog store. Read-only for the life of the session.
    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// The shared tag store. Read-only for the life of the session.
    pub fn tags(&self) -> &Arc<TagStore> {
        &self.tags
    }

    /// Read access to the wallet.
    pub fn wallet(&self) -> RwLockReadGuard<'_, Wallet> {
        self.wallet.read()
    }

    /// Write access to the wallet.
    pub fn wallet_mut(&self) -> RwLockWriteGuard<'_, Wallet> {
        self.wallet.write()
    }

    /// Read access to the inventory.
    pub fn inventory(&self) -> RwLockReadGuard<'_, InventoryManager> {
        self.inventory.read()
    }

    /// Write access to the inventory.
    pub fn inventory_mut(&self) -> RwLockWriteGuard<'_, InventoryManager> {
        self.inventory.write()
    }

    /// Process the virtual transaction registered under `key` against this
    /// session's wallet and inventory.
    ///
    /// # Errors
    ///
    /// [`EconomyError::UnknownTransaction`] if no virtual transaction
    /// exists under `key`; otherwise any transaction-processing error.
    pub fn process_virtual_transaction(
        &self,
        key: &str,
    ) -> Result<TransactionReceipt, EconomyError> {
        let entry = self
            .catalog
            .find(tally_catalog::EntryKind::VirtualTransaction, key)
            .ok_or_else(|| EconomyError::UnknownTransaction {
                key: key.to_string(),
            })?
            .clone();
        let mut wallet = self.wallet.write();
        let mut inventory = self.inventory.write();
        process_virtual_transaction(&entry, &mut wallet, &mut inventory)
    }

    /// Redeem the store transaction matching `product_id`, after the
    /// platform adapter confirmed the purchase.
    ///
    /// # Errors
    ///
    /// [`EconomyError::UnknownProduct`] if no store transaction matches.
    pub fn redeem_store_purchase(
        &self,
        product_id: &str,
    ) -> Result<TransactionReceipt, EconomyError> {
        let entry = self
            .catalog
            .find_first_by_product_id(product_id)
            .ok_or_else(|| EconomyError::UnknownProduct {
                product_id: product_id.to_string(),
            })?
            .clone();
        let mut wallet = self.wallet.write();
        let mut inventory = self.inventory.write();
        redeem_store_transaction(&entry, &mut wallet, &mut inventory)
    }
}
