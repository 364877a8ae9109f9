//! # Wallet
//!
//! Per-currency balances for one session, seeded from each currency
//! entry's initial balance. All operations validate that their argument
//! entry is a currency and that writes stay within `[0, maximum_balance]`
//! (zero maximum means uncapped).

use std::collections::BTreeMap;

use tally_catalog::{CatalogEntry, CatalogStore, CurrencyDetail};
use tally_core::CatalogKey;

use crate::error::EconomyError;

/// Balance table for one session's currencies.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    balances: BTreeMap<CatalogKey, i64>,
}

impl Wallet {
    /// Create an empty wallet with no seeded balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a wallet holding every currency in `store` at its initial
    /// balance.
    pub fn from_catalog(store: &CatalogStore) -> Self {
        let mut balances = BTreeMap::new();
        for entry in store.iter() {
            if let Some(detail) = entry.as_currency() {
                balances.insert(entry.key().clone(), detail.initial_balance);
            }
        }
        Self { balances }
    }

    /// The current balance of `currency`. A currency the wallet has never
    /// touched reads as zero.
    ///
    /// # Errors
    ///
    /// [`EconomyError::NotACurrency`] if the entry is not a currency.
    pub fn balance(&self, currency: &CatalogEntry) -> Result<i64, EconomyError> {
        currency_detail(currency)?;
        Ok(self.balances.get(currency.key()).copied().unwrap_or(0))
    }

    /// Overwrite the balance of `currency`.
    ///
    /// # Errors
    ///
    /// [`EconomyError::NegativeBalance`] or
    /// [`EconomyError::BalanceAboveMaximum`] if `amount` is out of range;
    /// [`EconomyError::NotACurrency`] if the entry is not a currency.
    pub fn set_balance(&mut self, currency: &CatalogEntry, amount: i64) -> Result<(), EconomyError> {
        let detail = currency_detail(currency)?;
        if amount < 0 {
            return Err(EconomyError::NegativeBalance {
                currency: currency.key().as_str().to_string(),
                requested: amount,
            });
        }
        if detail.is_capped() && amount > detail.maximum_balance {
            return Err(EconomyError::BalanceAboveMaximum {
                currency: currency.key().as_str().to_string(),
                requested: amount,
                maximum: detail.maximum_balance,
            });
        }
        self.balances.insert(currency.key().clone(), amount);
        Ok(())
    }

    /// Add `amount` to the balance of `currency`, rejecting a result above
    /// the cap. Returns the new balance.
    ///
    /// # Errors
    ///
    /// [`EconomyError::NegativeAmount`],
    /// [`EconomyError::BalanceAboveMaximum`], or
    /// [`EconomyError::NotACurrency`].
    pub fn deposit(&mut self, currency: &CatalogEntry, amount: i64) -> Result<i64, EconomyError> {
        let detail = currency_detail(currency)?;
        if amount < 0 {
            return Err(EconomyError::NegativeAmount { amount });
        }
        let current = self.balances.get(currency.key()).copied().unwrap_or(0);
        let requested = current.saturating_add(amount);
        if detail.is_capped() && requested > detail.maximum_balance {
            return Err(EconomyError::BalanceAboveMaximum {
                currency: currency.key().as_str().to_string(),
                requested,
                maximum: detail.maximum_balance,
            });
        }
        self.balances.insert(currency.key().clone(), requested);
        Ok(requested)
    }

    /// Add `amount` to the balance of `currency`, clamping at the cap
    /// instead of rejecting. Used for transaction payouts, where excess
    /// over the cap is forfeited rather than failing the grant. Returns
    /// the new balance.
    ///
    /// # Errors
    ///
    /// [`EconomyError::NegativeAmount`] or [`EconomyError::NotACurrency`].
    pub fn deposit_clamped(
        &mut self,
        currency: &CatalogEntry,
        amount: i64,
    ) -> Result<i64, EconomyError> {
        let detail = currency_detail(currency)?;
        if amount < 0 {
            return Err(EconomyError::NegativeAmount { amount });
        }
        let current = self.balances.get(currency.key()).copied().unwrap_or(0);
        let mut next = current.saturating_add(amount);
        if detail.is_capped() {
            next = next.min(detail.maximum_balance);
        }
        self.balances.insert(currency.key().clone(), next);
        Ok(next)
    }

    /// Remove `amount` from the balance of `currency`. Returns the new
    /// balance.
    ///
    /// # Errors
    ///
    /// [`EconomyError::InsufficientBalance`] if the balance is smaller
    /// than `amount`; [`EconomyError::NegativeAmount`] or
    /// [`EconomyError::NotACurrency`].
    pub fn withdraw(&mut self, currency: &CatalogEntry, amount: i64) -> Result<i64, EconomyError> {
        currency_detail(currency)?;
        if amount < 0 {
            return Err(EconomyError::NegativeAmount { amount });
        }
        let current = self.balances.get(currency.key()).copied().unwrap_or(0);
        if current < amount {
            return Err(EconomyError::InsufficientBalance {
                currency: currency.key().as_str().to_string(),
                required: amount,
                available: current,
            });
        }
        let next = current - amount;
        self.balances.insert(currency.key().clone(), next);
        Ok(next)
    }

    /// Number of currencies the wallet tracks.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether the wallet tracks no currencies.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Guard: the entry must be a currency.
fn currency_detail(entry: &CatalogEntry) -> Result<&CurrencyDetail, EconomyError> {
    entry.as_currency().ok_or_else(|| EconomyError::NotACurrency {
        key: entry.key().as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_catalog::{CatalogCompiler, EntryKind};

    fn sample_store() -> CatalogStore {
        let mut compiler = CatalogCompiler::new();
        compiler
            .register_currency("gold")
            .unwrap()
            .set_initial_balance(100);
        compiler
            .register_currency("gems")
            .unwrap()
            .set_initial_balance(5)
            .set_maximum_balance(50);
        compiler.register_item("sword").unwrap();
        compiler.build().unwrap().catalog
    }

    #[test]
    fn seeds_initial_balances() {
        let store = sample_store();
        let wallet = Wallet::from_catalog(&store);
        assert_eq!(wallet.len(), 2);
        let gold = store.find(EntryKind::Currency, "gold").unwrap();
        assert_eq!(wallet.balance(gold).unwrap(), 100);
    }

    #[test]
    fn rejects_non_currency_entries() {
        let store = sample_store();
        let mut wallet = Wallet::from_catalog(&store);
        let sword = store.find(EntryKind::Item, "sword").unwrap();
        assert_eq!(
            wallet.balance(sword),
            Err(EconomyError::NotACurrency {
                key: "sword".to_string()
            })
        );
        assert!(wallet.deposit(sword, 1).is_err());
    }

    #[test]
    fn deposit_and_withdraw() {
        let store = sample_store();
        let mut wallet = Wallet::from_catalog(&store);
        let gold = store.find(EntryKind::Currency, "gold").unwrap();
        assert_eq!(wallet.deposit(gold, 25).unwrap(), 125);
        assert_eq!(wallet.withdraw(gold, 125).unwrap(), 0);
        assert_eq!(
            wallet.withdraw(gold, 1),
            Err(EconomyError::InsufficientBalance {
                currency: "gold".to_string(),
                required: 1,
                available: 0,
            })
        );
    }

    #[test]
    fn deposit_respects_the_cap() {
        let store = sample_store();
        let mut wallet = Wallet::from_catalog(&store);
        let gems = store.find(EntryKind::Currency, "gems").unwrap();
        assert_eq!(
            wallet.deposit(gems, 100),
            Err(EconomyError::BalanceAboveMaximum {
                currency: "gems".to_string(),
                requested: 105,
                maximum: 50,
            })
        );
        // Clamped deposits forfeit the excess instead.
        assert_eq!(wallet.deposit_clamped(gems, 100).unwrap(), 50);
    }

    #[test]
    fn set_balance_bounds() {
        let store = sample_store();
        let mut wallet = Wallet::from_catalog(&store);
        let gems = store.find(EntryKind::Currency, "gems").unwrap();
        wallet.set_balance(gems, 50).unwrap();
        assert!(wallet.set_balance(gems, 51).is_err());
        assert!(wallet.set_balance(gems, -1).is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let store = sample_store();
        let mut wallet = Wallet::from_catalog(&store);
        let gold = store.find(EntryKind::Currency, "gold").unwrap();
        assert_eq!(
            wallet.deposit(gold, -5),
            Err(EconomyError::NegativeAmount { amount: -5 })
        );
        assert!(wallet.withdraw(gold, -5).is_err());
    }
}
