//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use std::collections::HashMap;
use std::time::Duration;

use http::Method;
use portico_core::{AuthRequirement, HandlerId, RouteDefinition};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Router configuration section.
///
/// Controls suffix normalization and the convention-inference guard.
///
/// # Example
///
/// ```
/// use portico_config::RouterSection;
///
/// let section = RouterSection::default();
/// assert_eq!(section.strip_suffixes, vec![".html".to_string()]);
/// assert_eq!(section.controller_suffix, "Controller");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    /// Cosmetic path suffixes stripped before matching.
    #[serde(default = "default_strip_suffixes")]
    pub strip_suffixes: Vec<String>,

    /// Namespace prefixes from which controllers may never be inferred.
    #[serde(default)]
    pub namespace_blacklist: Vec<String>,

    /// When non-empty, only namespaces under these prefixes are inferable.
    #[serde(default)]
    pub namespace_whitelist: Vec<String>,

    /// Only expose actions explicitly marked routable.
    #[serde(default)]
    pub strict_actions: bool,

    /// Suffix appended when probing controller name candidates.
    #[serde(default = "default_controller_suffix")]
    pub controller_suffix: String,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            strip_suffixes: default_strip_suffixes(),
            namespace_blacklist: Vec::new(),
            namespace_whitelist: Vec::new(),
            strict_actions: false,
            controller_suffix: default_controller_suffix(),
        }
    }
}

fn default_strip_suffixes() -> Vec<String> {
    vec![".html".to_string()]
}

fn default_controller_suffix() -> String {
    "Controller".to_string()
}

/// Match-result cache configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Enable the match-result cache.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Time-to-live for cached match results, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of cached entries before eviction.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl CacheSection {
    /// Entry time-to-live as a [`Duration`].
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ttl_secs: default_cache_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_max_entries() -> usize {
    10_000
}

/// A declared route entry from a `[[route]]` table.
///
/// # Example
///
/// ```
/// let toml = r#"
///     pattern = "/users/{id}"
///     verbs = ["GET"]
///     controller = "Users"
///     action = "show"
///     name = "users.show"
///
///     [constraints]
///     id = "\\d+"
/// "#;
/// let entry: portico_config::RouteEntry = toml::from_str(toml).unwrap();
/// let definition = entry.to_definition().unwrap();
/// assert_eq!(definition.pattern, "/users/{id}");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    /// Route pattern, e.g. `/users/{id}`.
    pub pattern: String,

    /// HTTP verbs this route answers. Empty means GET.
    #[serde(default)]
    pub verbs: Vec<String>,

    /// Target controller name.
    pub controller: String,

    /// Target action name.
    pub action: String,

    /// Middleware names attached to the route.
    #[serde(default)]
    pub middleware: Vec<String>,

    /// Authentication requirement.
    #[serde(default)]
    pub auth: AuthRequirement,

    /// Role overrides.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Per-parameter regex constraints.
    #[serde(default)]
    pub constraints: HashMap<String, String>,

    /// Optional route name for reverse lookup.
    #[serde(default)]
    pub name: Option<String>,
}

impl RouteEntry {
    /// Convert this entry into a [`RouteDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a verb is not a valid
    /// HTTP method or a required field is empty.
    pub fn to_definition(&self) -> Result<RouteDefinition, ConfigError> {
        if self.pattern.is_empty() {
            return Err(ConfigError::invalid_value("route.pattern", "must not be empty"));
        }
        if self.controller.is_empty() || self.action.is_empty() {
            return Err(ConfigError::invalid_value(
                "route.controller",
                "controller and action must not be empty",
            ));
        }

        let mut verbs = Vec::with_capacity(self.verbs.len());
        for verb in &self.verbs {
            let method = verb
                .parse::<Method>()
                .map_err(|_| ConfigError::invalid_value("route.verbs", format!("unknown verb: {verb}")))?;
            verbs.push(method);
        }

        let mut definition =
            RouteDefinition::new(&self.pattern, HandlerId::new(&self.controller, &self.action))
                .verbs(verbs)
                .middleware(self.middleware.iter().cloned())
                .auth(self.auth)
                .roles(self.roles.iter().cloned());
        for (param, regex) in &self.constraints {
            definition = definition.constraint(param, regex);
        }
        if let Some(name) = &self.name {
            definition = definition.named(name);
        }
        Ok(definition)
    }
}
