//! # Catalog Config Files
//!
//! Serde model for catalog config files (`.yaml`/`.yml`/`.json`). The
//! model mirrors the descriptor shapes and is applied to a compiler
//! through the public registration API, so a config file can express
//! exactly what configuration code can — nothing more.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use tally_catalog::{CatalogCompiler, RegistryError};
use tally_core::{CatalogKey, PropertyValue};

/// Top-level config file shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Tag keys to register up front. Tags referenced by entries must be
    /// listed here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<CatalogKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub currencies: Vec<CurrencyConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_transactions: Vec<VirtualTransactionConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub store_transactions: Vec<StoreTransactionConfig>,
}

/// Fields shared by every entry config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryConfigBase {
    /// Display name; defaults to the key text when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<CatalogKey>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub static_properties: BTreeMap<String, PropertyValue>,
}

/// One currency entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    pub key: CatalogKey,
    #[serde(flatten)]
    pub base: EntryConfigBase,
    #[serde(default)]
    pub initial_balance: i64,
    /// Zero means uncapped.
    #[serde(default)]
    pub maximum_balance: i64,
}

/// One inventory item definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    pub key: CatalogKey,
    #[serde(flatten)]
    pub base: EntryConfigBase,
    #[serde(default)]
    pub initial_allocation: u32,
}

/// One exchange line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub target: CatalogKey,
    pub amount: i64,
}

/// One virtual transaction entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualTransactionConfig {
    pub key: CatalogKey,
    #[serde(flatten)]
    pub base: EntryConfigBase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub costs: Vec<ExchangeConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payouts: Vec<ExchangeConfig>,
}

/// One store transaction entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreTransactionConfig {
    pub key: CatalogKey,
    #[serde(flatten)]
    pub base: EntryConfigBase,
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payouts: Vec<ExchangeConfig>,
}

impl CatalogConfig {
    /// Load a config file, selecting the format by file extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&text)
                .with_context(|| format!("parse YAML config {}", path.display())),
            "json" => serde_json::from_str(&text)
                .with_context(|| format!("parse JSON config {}", path.display())),
            other => bail!("unsupported config extension '{other}' (expected yaml, yml, or json)"),
        }
    }

    /// Register everything in this config into `compiler`, via the public
    /// registration API.
    ///
    /// # Errors
    ///
    /// Any [`RegistryError`] from registration — duplicate keys fail here,
    /// before the build runs.
    pub fn register_into(&self, compiler: &mut CatalogCompiler) -> Result<(), RegistryError> {
        for tag in &self.tags {
            compiler.get_or_create_tag(tag.as_str())?;
        }
        for currency in &self.currencies {
            let descriptor = compiler.register_currency(currency.key.as_str())?;
            descriptor
                .set_initial_balance(currency.initial_balance)
                .set_maximum_balance(currency.maximum_balance);
            if let Some(name) = &currency.base.display_name {
                descriptor.set_display_name(name.clone());
            }
            for tag in &currency.base.tags {
                descriptor.add_tag(tag.clone());
            }
            for (name, value) in &currency.base.static_properties {
                descriptor.set_static_property(name.clone(), value.clone());
            }
        }
        for item in &self.items {
            let descriptor = compiler.register_item(item.key.as_str())?;
            descriptor.set_initial_allocation(item.initial_allocation);
            if let Some(name) = &item.base.display_name {
                descriptor.set_display_name(name.clone());
            }
            for tag in &item.base.tags {
                descriptor.add_tag(tag.clone());
            }
            for (name, value) in &item.base.static_properties {
                descriptor.set_static_property(name.clone(), value.clone());
            }
        }
        for transaction in &self.virtual_transactions {
            let descriptor = compiler.register_virtual_transaction(transaction.key.as_str())?;
            if let Some(name) = &transaction.base.display_name {
                descriptor.set_display_name(name.clone());
            }
            for tag in &transaction.base.tags {
                descriptor.add_tag(tag.clone());
            }
            for (name, value) in &transaction.base.static_properties {
                descriptor.set_static_property(name.clone(), value.clone());
            }
            for cost in &transaction.costs {
                descriptor.add_cost(cost.target.clone(), cost.amount);
            }
            for payout in &transaction.payouts {
                descriptor.add_payout(payout.target.clone(), payout.amount);
            }
        }
        for transaction in &self.store_transactions {
            let descriptor = compiler.register_store_transaction(transaction.key.as_str())?;
            descriptor.set_product_id(transaction.product_id.clone());
            if let Some(name) = &transaction.base.display_name {
                descriptor.set_display_name(name.clone());
            }
            for tag in &transaction.base.tags {
                descriptor.add_tag(tag.clone());
            }
            for (name, value) in &transaction.base.static_properties {
                descriptor.set_static_property(name.clone(), value.clone());
            }
            for payout in &transaction.payouts {
                descriptor.add_payout(payout.target.clone(), payout.amount);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tally_catalog::EntryKind;

    const SAMPLE_YAML: &str = r#"
tags:
  - premium
currencies:
  - key: gold
    display_name: Gold
    initial_balance: 100
  - key: gems
    tags: [premium]
    maximum_balance: 500
items:
  - key: sword
    initial_allocation: 1
    static_properties:
      damage:
        type: long
        value: 12
virtual_transactions:
  - key: buy-sword
    costs:
      - target: gold
        amount: 50
    payouts:
      - target: sword
        amount: 1
store_transactions:
  - key: gem-pack
    product_id: com.example.gems.small
    payouts:
      - target: gems
        amount: 100
"#;

    #[test]
    fn yaml_round_trips_through_the_compiler() {
        let config: CatalogConfig = serde_yaml::from_str(SAMPLE_YAML).unwrap();
        let mut compiler = CatalogCompiler::new();
        config.register_into(&mut compiler).unwrap();
        let built = compiler.build().unwrap();

        assert_eq!(built.catalog.len(), 5);
        assert_eq!(built.tags.len(), 1);

        let gold = built.catalog.find(EntryKind::Currency, "gold").unwrap();
        assert_eq!(gold.display_name(), "Gold");
        assert_eq!(gold.as_currency().unwrap().initial_balance, 100);

        let sword = built.catalog.find(EntryKind::Item, "sword").unwrap();
        assert_eq!(
            sword.static_property("damage").and_then(|p| p.as_long()),
            Some(12)
        );

        let premium = built.tags.find("premium").unwrap();
        let gems = built.catalog.find(EntryKind::Currency, "gems").unwrap();
        assert!(gems.has_tag(premium));
    }

    #[test]
    fn load_selects_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("catalog.yaml");
        fs::write(&yaml_path, SAMPLE_YAML).unwrap();
        let config = CatalogConfig::load(&yaml_path).unwrap();
        assert_eq!(config.currencies.len(), 2);

        let json_path = dir.path().join("catalog.json");
        let mut file = fs::File::create(&json_path).unwrap();
        write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();
        let config = CatalogConfig::load(&json_path).unwrap();
        assert_eq!(config.items.len(), 1);

        let txt_path = dir.path().join("catalog.txt");
        fs::write(&txt_path, "x").unwrap();
        assert!(CatalogConfig::load(&txt_path).is_err());
    }

    #[test]
    fn duplicate_keys_fail_at_registration() {
        let config = CatalogConfig {
            currencies: vec![
                CurrencyConfig {
                    key: CatalogKey::new("gold").unwrap(),
                    base: EntryConfigBase::default(),
                    initial_balance: 0,
                    maximum_balance: 0,
                },
            ],
            items: vec![ItemConfig {
                key: CatalogKey::new("gold").unwrap(),
                base: EntryConfigBase::default(),
                initial_allocation: 0,
            }],
            ..CatalogConfig::default()
        };
        let mut compiler = CatalogCompiler::new();
        assert!(config.register_into(&mut compiler).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<CatalogConfig, _> =
            serde_yaml::from_str("unknown_section:\n  - x\n");
        assert!(result.is_err());
    }
}
