//! Manager configuration.
//!
//! ```
//! use helios_entity_manager::config::ManagerOptions;
//!
//! let options: ManagerOptions = serde_json::from_str(r#"{
//!     "default_page_size": 20,
//!     "max_page_size": 100,
//!     "code_prefix": "ORD-"
//! }"#).unwrap();
//!
//! assert_eq!(options.code_prefix, "ORD-");
//! assert_eq!(options.slug_separator, "-");
//! assert!(options.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ManagerError, ManagerResult};

/// Tunables for an [`EntityManager`](crate::EntityManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerOptions {
    /// Page size used when a search request has none. `None` means unbounded.
    pub default_page_size: Option<u32>,
    /// Upper bound applied to every page size.
    pub max_page_size: Option<u32>,
    /// Prefix for incremental codes.
    pub code_prefix: String,
    /// Separator for URL-friendly codes.
    pub slug_separator: String,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            default_page_size: None,
            max_page_size: None,
            code_prefix: String::new(),
            slug_separator: "-".to_string(),
        }
    }
}

impl ManagerOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = Some(size);
        self
    }

    /// Sets the maximum page size.
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = Some(size);
        self
    }

    /// Sets the incremental code prefix.
    pub fn with_code_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.code_prefix = prefix.into();
        self
    }

    /// Sets the URL-friendly code separator.
    pub fn with_slug_separator(mut self, separator: impl Into<String>) -> Self {
        self.slug_separator = separator.into();
        self
    }

    /// Parses options from JSON.
    pub fn from_json(json: &str) -> ManagerResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| ManagerError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Checks that the options are consistent.
    pub fn validate(&self) -> ManagerResult<()> {
        if self.max_page_size == Some(0) {
            return Err(ManagerError::InvalidConfiguration {
                message: "max_page_size must be greater than zero".to_string(),
            });
        }
        if let (Some(default), Some(max)) = (self.default_page_size, self.max_page_size)
            && default > max
        {
            return Err(ManagerError::InvalidConfiguration {
                message: format!(
                    "default_page_size {} exceeds max_page_size {}",
                    default, max
                ),
            });
        }
        if self.slug_separator.chars().any(char::is_alphanumeric) {
            return Err(ManagerError::InvalidConfiguration {
                message: format!(
                    "slug_separator '{}' must not contain alphanumeric characters",
                    self.slug_separator
                ),
            });
        }
        Ok(())
    }
}
