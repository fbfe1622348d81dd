//! YAML configuration for the generate and ingest commands.
//!
//! Both sections are optional; anything left out falls back to the
//! built-in defaults. Command-line flags are applied on top of the
//! loaded file by the command handlers.

use crate::error::GenerateError;
use crate::model::Table;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default destination store file
pub const DEFAULT_DATABASE: &str = "ecom.duckdb";

/// Row counts and sampling bounds for one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    pub user_count: usize,
    pub product_count: usize,
    pub order_count: usize,
    /// Lower bound of the per-order item count. Zero makes empty orders
    /// possible.
    pub min_items_per_order: usize,
    pub max_items_per_order: usize,
    pub review_count: usize,
    /// RNG seed; a random one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            user_count: 50,
            product_count: 50,
            order_count: 200,
            min_items_per_order: 1,
            max_items_per_order: 5,
            review_count: 150,
            seed: None,
        }
    }
}

impl GenerateConfig {
    /// Check that the counts can produce a dataset without dangling
    /// foreign keys.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.max_items_per_order == 0 {
            return Err(GenerateError::InvalidConfig(
                "max_items_per_order must be at least 1".to_string(),
            ));
        }
        if self.min_items_per_order > self.max_items_per_order {
            return Err(GenerateError::InvalidConfig(format!(
                "min_items_per_order ({}) is greater than max_items_per_order ({})",
                self.min_items_per_order, self.max_items_per_order
            )));
        }

        let max_id = u32::MAX as usize;
        for (name, count) in [
            ("user_count", self.user_count),
            ("product_count", self.product_count),
            ("order_count", self.order_count),
            ("review_count", self.review_count),
        ] {
            if count > max_id {
                return Err(GenerateError::InvalidConfig(format!(
                    "{} ({}) exceeds the id range",
                    name, count
                )));
            }
        }
        if self.order_count.saturating_mul(self.max_items_per_order) > max_id {
            return Err(GenerateError::InvalidConfig(
                "order_count * max_items_per_order exceeds the id range".to_string(),
            ));
        }

        if self.order_count > 0 && self.user_count == 0 {
            return Err(GenerateError::InvalidConfig(
                "orders need at least one user to reference".to_string(),
            ));
        }
        if self.order_count > 0 && self.product_count == 0 {
            return Err(GenerateError::InvalidConfig(
                "order items need at least one product to reference".to_string(),
            ));
        }
        if self.review_count > 0 && (self.user_count == 0 || self.product_count == 0) {
            return Err(GenerateError::InvalidConfig(
                "reviews need at least one user and one product to reference".to_string(),
            ));
        }
        Ok(())
    }
}

/// Destination store and table selection for the ingest command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub database: PathBuf,
    /// Restrict the load to these tables (all five when absent)
    pub tables: Option<Vec<Table>>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            tables: None,
        }
    }
}

impl IngestConfig {
    /// The tables to load, always in dependency order
    pub fn selected_tables(&self) -> Vec<Table> {
        match &self.tables {
            Some(selected) => Table::ALL
                .into_iter()
                .filter(|t| selected.contains(t))
                .collect(),
            None => Table::ALL.to_vec(),
        }
    }
}

/// Complete YAML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub generate: GenerateConfig,
    pub ingest: IngestConfig,
}

impl ConfigFile {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        let config: ConfigFile = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if one was given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
generate:
  user_count: 10
  order_count: 20
  max_items_per_order: 3
  seed: 42

ingest:
  database: shop.duckdb
  tables:
    - orders
    - users
"#;

        let config: ConfigFile = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.generate.user_count, 10);
        assert_eq!(config.generate.order_count, 20);
        assert_eq!(config.generate.max_items_per_order, 3);
        assert_eq!(config.generate.seed, Some(42));
        // Unset fields keep their defaults
        assert_eq!(config.generate.product_count, 50);
        assert_eq!(config.generate.review_count, 150);
        assert_eq!(config.generate.min_items_per_order, 1);

        assert_eq!(config.ingest.database, PathBuf::from("shop.duckdb"));
        // Selection is reordered into dependency order
        assert_eq!(
            config.ingest.selected_tables(),
            vec![Table::Users, Table::Orders]
        );
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: ConfigFile = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.ingest.selected_tables().len(), 5);
        assert_eq!(config.ingest.database, PathBuf::from(DEFAULT_DATABASE));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let yaml = "generate:\n  users: 10\n";
        assert!(serde_yaml_ng::from_str::<ConfigFile>(yaml).is_err());
    }

    #[test]
    fn test_validate_defaults() {
        assert!(GenerateConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_item_bounds() {
        let config = GenerateConfig {
            min_items_per_order: 4,
            max_items_per_order: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenerateError::InvalidConfig(_))
        ));

        let config = GenerateConfig {
            min_items_per_order: 0,
            max_items_per_order: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GenerateConfig {
            min_items_per_order: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_references() {
        let config = GenerateConfig {
            user_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GenerateConfig {
            user_count: 0,
            order_count: 0,
            review_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = GenerateConfig {
            product_count: 0,
            order_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err()); // reviews still need products
    }
}
