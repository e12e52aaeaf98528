//! Catalog configuration.

use serde::Deserialize;
use thiserror::Error;

/// Environment variable for [`CatalogConfig::strict`].
pub const STRICT_VAR: &str = "FABULA_STRICT";

/// Environment variable for [`CatalogConfig::enforce_acyclic`].
pub const ENFORCE_ACYCLIC_VAR: &str = "FABULA_ENFORCE_ACYCLIC";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A flag variable held something other than a boolean.
    #[error("{name} must be one of true/false/1/0, got `{value}`")]
    InvalidFlag {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// How a catalog is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Fail the whole load when any story fails to initialize. When off,
    /// failed stories are reported and left out of the catalog.
    pub strict: bool,
    /// Reject prerequisite graphs that contain a cycle.
    pub enforce_acyclic: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            strict: false,
            enforce_acyclic: true,
        }
    }
}

impl CatalogConfig {
    /// Reads the configuration from the process environment. Unset variables
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFlag` if a variable is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFlag` if a variable is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            strict: flag(STRICT_VAR, lookup(STRICT_VAR), defaults.strict)?,
            enforce_acyclic: flag(
                ENFORCE_ACYCLIC_VAR,
                lookup(ENFORCE_ACYCLIC_VAR),
                defaults.enforce_acyclic,
            )?,
        })
    }
}

fn flag(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}
