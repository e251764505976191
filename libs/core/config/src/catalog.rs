use crate::{env_parse, ConfigError, FromEnv};

/// Tunables for the product catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Low-stock threshold assigned when a create command omits one
    pub default_qty_alert: i32,
    /// Largest page size a list query may request
    pub max_page_size: u64,
    /// Largest CSV payload accepted by the importer, in bytes
    pub max_import_bytes: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_qty_alert: 10,
            max_page_size: 100,
            max_import_bytes: 5 * 1024 * 1024,
        }
    }
}

impl FromEnv for CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            default_qty_alert: env_parse("CATALOG_DEFAULT_QTY_ALERT", defaults.default_qty_alert)?,
            max_page_size: env_parse("CATALOG_MAX_PAGE_SIZE", defaults.max_page_size)?,
            max_import_bytes: env_parse("CATALOG_MAX_IMPORT_BYTES", defaults.max_import_bytes)?,
        };

        if config.default_qty_alert < 0 {
            return Err(ConfigError::Invalid {
                key: "CATALOG_DEFAULT_QTY_ALERT".to_string(),
                details: "must not be negative".to_string(),
            });
        }
        if config.max_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "CATALOG_MAX_PAGE_SIZE".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_config_defaults() {
        temp_env::with_vars_unset(
            [
                "CATALOG_DEFAULT_QTY_ALERT",
                "CATALOG_MAX_PAGE_SIZE",
                "CATALOG_MAX_IMPORT_BYTES",
            ],
            || {
                assert_eq!(CatalogConfig::from_env().unwrap(), CatalogConfig::default());
            },
        );
    }

    #[test]
    fn test_catalog_config_overrides() {
        temp_env::with_vars(
            [
                ("CATALOG_DEFAULT_QTY_ALERT", Some("3")),
                ("CATALOG_MAX_PAGE_SIZE", Some("25")),
            ],
            || {
                let config = CatalogConfig::from_env().unwrap();
                assert_eq!(config.default_qty_alert, 3);
                assert_eq!(config.max_page_size, 25);
            },
        );
    }

    #[test]
    fn test_catalog_config_rejects_zero_page_size() {
        temp_env::with_var("CATALOG_MAX_PAGE_SIZE", Some("0"), || {
            assert!(CatalogConfig::from_env().is_err());
        });
    }
}
