//! Main configuration types.
//!
//! This module provides the top-level [`PorticoConfig`] struct.

use portico_core::RouteDefinition;
use serde::{Deserialize, Serialize};

use crate::{CacheSection, ConfigError, RouteEntry, RouterSection};

/// Complete Portico configuration.
///
/// This is the root configuration type that contains all configuration
/// sections. Use [`ConfigLoader`](crate::ConfigLoader) to load configuration
/// from files and environment variables.
///
/// # Example
///
/// ```
/// use portico_config::PorticoConfig;
///
/// let config = PorticoConfig::default();
/// assert!(config.cache.enabled);
/// assert_eq!(config.cache.ttl_secs, 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PorticoConfig {
    /// Router configuration.
    #[serde(default)]
    pub router: RouterSection,

    /// Match-result cache configuration.
    #[serde(default)]
    pub cache: CacheSection,

    /// Declared routes.
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteEntry>,
}

impl PorticoConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - A declared route has an empty pattern, controller, or action
    /// - A declared route names an unknown HTTP verb
    /// - The cache is enabled with a zero time-to-live
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.enabled && self.cache.ttl_secs == 0 {
            return Err(ConfigError::invalid_value(
                "cache.ttl_secs",
                "must be positive when the cache is enabled",
            ));
        }
        for entry in &self.routes {
            entry.to_definition()?;
        }
        Ok(())
    }

    /// Convert the `[[route]]` entries into route definitions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when an entry is malformed; see
    /// [`RouteEntry::to_definition`].
    pub fn declared_routes(&self) -> Result<Vec<RouteDefinition>, ConfigError> {
        self.routes.iter().map(RouteEntry::to_definition).collect()
    }
}
