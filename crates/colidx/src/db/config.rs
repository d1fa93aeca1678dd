use crate::error::InternalError;
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// StoreConfig
///
/// Names of the four logical stores the index is spread over, plus the
/// history read bound. Passed explicitly to `Collections`; there is no
/// process-wide default registry.
///
/// Every field may be omitted from TOML and falls back to its default.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Current attribute values, one row per item.
    pub item_store: String,

    /// Container membership rows.
    pub membership_store: String,

    /// Index rows, one per `(container, attribute)`.
    pub index_store: String,

    /// Per-item history rows of still-live indexed versions.
    pub history_store: String,

    /// Maximum history entries one write reads for a single attribute.
    pub history_scan_limit: usize,
}

impl StoreConfig {
    pub const DEFAULT_ITEM_STORE: &'static str = "Item";
    pub const DEFAULT_MEMBERSHIP_STORE: &'static str = "Collection";
    pub const DEFAULT_INDEX_STORE: &'static str = "Collection_Index";
    pub const DEFAULT_HISTORY_STORE: &'static str = "Item_Index_Entries";
    pub const DEFAULT_HISTORY_SCAN_LIMIT: usize = 1_000;

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let stores = [
            ("item_store", &self.item_store),
            ("membership_store", &self.membership_store),
            ("index_store", &self.index_store),
            ("history_store", &self.history_store),
        ];

        for (i, &(field, name)) in stores.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyStoreName { field });
            }

            if let Some(&(first, _)) = stores[..i].iter().find(|(_, prior)| *prior == name) {
                return Err(ConfigError::DuplicateStoreName {
                    name: name.clone(),
                    first,
                    second: field,
                });
            }
        }

        if self.history_scan_limit == 0 {
            return Err(ConfigError::ZeroScanLimit);
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            item_store: Self::DEFAULT_ITEM_STORE.to_string(),
            membership_store: Self::DEFAULT_MEMBERSHIP_STORE.to_string(),
            index_store: Self::DEFAULT_INDEX_STORE.to_string(),
            history_store: Self::DEFAULT_HISTORY_STORE.to_string(),
            history_scan_limit: Self::DEFAULT_HISTORY_SCAN_LIMIT,
        }
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to parse store config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("store name for '{field}' must not be empty")]
    EmptyStoreName { field: &'static str },

    #[error("store name '{name}' used for both '{first}' and '{second}'")]
    DuplicateStoreName {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("history_scan_limit must be > 0")]
    ZeroScanLimit,
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::config_unsupported(err.to_string())
    }
}

///
/// TESTS
///
