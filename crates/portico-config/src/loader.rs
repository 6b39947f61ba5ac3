//! Layered configuration loading.
//!
//! Configuration is assembled in precedence order: built-in defaults, then an
//! optional TOML or JSON file, then `PREFIX__SECTION__KEY` environment
//! variable overrides.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, PorticoConfig};

/// Loads [`PorticoConfig`] from files and environment variables.
///
/// # Example
///
/// ```
/// use portico_config::ConfigLoader;
///
/// # fn main() -> Result<(), portico_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_env_prefix("PORTICO")
///     .load()?;
/// assert!(config.cache.enabled);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: PorticoConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader seeded with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file. Fails if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] for a missing file, a read error
    /// when the file cannot be read, or a parse error for invalid content.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists; otherwise keep the
    /// current configuration unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error only when an existing file cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid content or an unsupported format.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Enable `PREFIX__SECTION__KEY` environment variable overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Finish loading: apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment override cannot be parsed or the
    /// resulting configuration fails validation.
    pub fn load(mut self) -> Result<PorticoConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }
        self.config.validate()?;
        Ok(self.config)
    }

    // Parse configuration file based on extension
    fn parse_file(content: &str, path: &Path) -> Result<PorticoConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    // Apply environment variable overrides
    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    // Apply a single environment variable
    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["ROUTER", "STRICT_ACTIONS"] => {
                self.config.router.strict_actions = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ROUTER", "NAMESPACE_BLACKLIST"] => {
                self.config.router.namespace_blacklist = parse_list(value);
            }
            ["ROUTER", "NAMESPACE_WHITELIST"] => {
                self.config.router.namespace_whitelist = parse_list(value);
            }
            ["ROUTER", "STRIP_SUFFIXES"] => {
                self.config.router.strip_suffixes = parse_list(value);
            }
            ["ROUTER", "CONTROLLER_SUFFIX"] => {
                self.config.router.controller_suffix = value.to_string();
            }
            ["CACHE", "ENABLED"] => {
                self.config.cache.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["CACHE", "TTL_SECS"] => {
                self.config.cache.ttl_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["CACHE", "MAX_ENTRIES"] => {
                self.config.cache.max_entries = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a comma-separated list, dropping empty items.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.router.controller_suffix, "Controller");
    }

    #[test]
    fn loader_with_string_toml() {
        let config = ConfigLoader::new()
            .with_string(
                r#"
                [cache]
                max_entries = 64
                "#,
                "toml",
            )
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.cache.max_entries, 64);
    }

    #[test]
    fn loader_with_string_json() {
        let config = ConfigLoader::new()
            .with_string(r#"{"router": {"strict_actions": true}}"#, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(config.router.strict_actions);
    }

    #[test]
    fn loader_rejects_unknown_format() {
        assert!(ConfigLoader::new().with_string("{}", "yaml").is_err());
    }

    #[test]
    fn loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/portico.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/portico.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, PorticoConfig::default());
    }

    #[test]
    fn env_override_parses_lists_and_booleans() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var(
                "PORTICO__ROUTER__NAMESPACE_BLACKLIST",
                "app.internal, app.secret",
                "PORTICO",
            )
            .unwrap();
        loader
            .apply_env_var("PORTICO__CACHE__ENABLED", "off", "PORTICO")
            .unwrap();

        assert_eq!(
            loader.config.router.namespace_blacklist,
            vec!["app.internal".to_string(), "app.secret".to_string()]
        );
        assert!(!loader.config.cache.enabled);
    }

    #[test]
    fn env_override_rejects_bad_integer() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("PORTICO__CACHE__TTL_SECS", "soon", "PORTICO");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }

    #[test]
    fn unknown_env_keys_are_ignored() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("PORTICO__SERVER__HTTP_ADDR", "0.0.0.0:1", "PORTICO")
            .unwrap();
        assert_eq!(loader.config, PorticoConfig::default());
    }
}
