//! Engine configuration loaded from TOML, with built-in defaults

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::data::ColumnMapping;
use crate::miner::MiningOptions;
use crate::rules::RuleOptions;

/// Settings for one analysis run. Every field is optional; the `effective_*`
/// accessors supply the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum support fraction. Default: 0.05.
    pub min_support: Option<f64>,
    /// Minimum confidence fraction. Default: 0.5.
    pub min_confidence: Option<f64>,
    /// Largest `|antecedent| + |consequent|`. Default: 4.
    pub max_rule_size: Option<usize>,
    /// Longest itemset to mine. Default: unbounded.
    pub max_itemset_len: Option<usize>,
    /// Mine on the rayon pool. Default: true.
    pub parallel: Option<bool>,
    /// Column holding the transaction key. Default: "date".
    pub transaction_column: Option<String>,
    /// Column holding the item name. Default: "menu__name".
    pub item_column: Option<String>,
    /// Column holding the ordered quantity. Default: "menu__quantity".
    pub quantity_column: Option<String>,
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> crate::Result<Self> {
        toml::from_str(source).context("Invalid engine configuration")
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source)
    }

    /// Fill every unset field of `self` from `other`
    pub fn or(self, other: EngineConfig) -> Self {
        Self {
            min_support: self.min_support.or(other.min_support),
            min_confidence: self.min_confidence.or(other.min_confidence),
            max_rule_size: self.max_rule_size.or(other.max_rule_size),
            max_itemset_len: self.max_itemset_len.or(other.max_itemset_len),
            parallel: self.parallel.or(other.parallel),
            transaction_column: self.transaction_column.or(other.transaction_column),
            item_column: self.item_column.or(other.item_column),
            quantity_column: self.quantity_column.or(other.quantity_column),
        }
    }

    pub fn effective_min_support(&self) -> f64 {
        self.min_support.unwrap_or(0.05)
    }

    pub fn effective_min_confidence(&self) -> f64 {
        self.min_confidence.unwrap_or(0.5)
    }

    pub fn effective_max_rule_size(&self) -> usize {
        self.max_rule_size.unwrap_or(4)
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    pub fn mining_options(&self) -> MiningOptions {
        MiningOptions {
            min_support: self.effective_min_support(),
            max_len: self.max_itemset_len,
            parallel: self.effective_parallel(),
        }
    }

    pub fn rule_options(&self) -> RuleOptions {
        RuleOptions::new(self.effective_min_confidence()).with_max_rule_size(self.effective_max_rule_size())
    }

    pub fn column_mapping(&self) -> ColumnMapping {
        let defaults = ColumnMapping::default();
        ColumnMapping {
            transaction: self.transaction_column.clone().unwrap_or(defaults.transaction),
            item: self.item_column.clone().unwrap_or(defaults.item),
            quantity: self.quantity_column.clone().unwrap_or(defaults.quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.effective_min_support(), 0.05);
        assert_eq!(config.effective_min_confidence(), 0.5);
        assert_eq!(config.effective_max_rule_size(), 4);
        assert!(config.effective_parallel());
        assert_eq!(config.column_mapping(), ColumnMapping::default());
        assert_eq!(config.rule_options().max_rule_size, Some(4));
        assert_eq!(config.mining_options().max_len, None);
    }

    #[test]
    fn test_from_toml_str() {
        let config = EngineConfig::from_toml_str(
            r#"
            min_support = 0.1
            max_rule_size = 3
            item_column = "product"
            "#,
        )
        .unwrap();

        assert_eq!(config.effective_min_support(), 0.1);
        assert_eq!(config.effective_min_confidence(), 0.5);
        assert_eq!(config.effective_max_rule_size(), 3);
        assert_eq!(config.column_mapping().item, "product");
        assert_eq!(config.column_mapping().transaction, "date");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(EngineConfig::from_toml_str("min_support = \"high\"").is_err());
    }

    #[test]
    fn test_or_prefers_self() {
        let cli = EngineConfig {
            min_support: Some(0.2),
            ..Default::default()
        };
        let file = EngineConfig {
            min_support: Some(0.1),
            min_confidence: Some(0.8),
            ..Default::default()
        };

        let merged = cli.or(file);
        assert_eq!(merged.min_support, Some(0.2));
        assert_eq!(merged.min_confidence, Some(0.8));
    }

    #[test]
    fn test_from_missing_file() {
        assert!(EngineConfig::from_toml_file("/nonexistent/ruleforge.toml").is_err());
    }
}
