//! Route definition model.
//!
//! A [`RouteDefinition`] is the normalized representation of one routable
//! endpoint, whether it was declared explicitly or discovered from the
//! controller registry. The [`RouteCollection`] holds definitions in
//! insertion order, which is also matching precedence, and is immutable
//! once the loader hands it to the router.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use http::Method;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Identity of the business handler serving a route: a controller/action pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId {
    /// Controller name (e.g. `"Users"`).
    pub controller: String,
    /// Action name (e.g. `"show"`).
    pub action: String,
}

impl HandlerId {
    /// Creates a handler identity.
    #[must_use]
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.controller, self.action)
    }
}

/// Whether a route requires authentication.
///
/// `Inherit` defers to handler-level metadata; the matching engine resolves
/// it to a concrete flag when building the match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthRequirement {
    /// Authentication is required.
    Required,
    /// Authentication is explicitly not required.
    NotRequired,
    /// Unspecified; defer to handler-level metadata.
    #[default]
    Inherit,
}

impl AuthRequirement {
    /// Resolves this requirement against a fallback, returning the
    /// effective boolean flag. `Inherit` all the way down means no auth.
    #[must_use]
    pub fn resolve_with(self, fallback: Self) -> bool {
        match self {
            Self::Required => true,
            Self::NotRequired => false,
            Self::Inherit => matches!(fallback, Self::Required),
        }
    }
}

/// Where a route definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    /// Registered explicitly (configuration table or builder call).
    Declared,
    /// Discovered from controller registration metadata.
    Discovered,
}

/// Normalized representation of one routable endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Path template with named parameters (e.g. `"/users/{id}"`).
    pub pattern: String,
    /// Allowed HTTP verbs. Never empty after loading; the loader defaults
    /// a verbless route to GET.
    #[serde(with = "verb_names")]
    pub verbs: Vec<Method>,
    /// The business handler serving this route.
    pub target: HandlerId,
    /// Middleware names attached to this route. Flat and deduplicated:
    /// the loader normalizes shape so match time never flattens.
    pub middleware: Vec<String>,
    /// Authentication requirement for this route.
    pub auth: AuthRequirement,
    /// Roles required by this route.
    pub roles: Vec<String>,
    /// Per-parameter regex constraints (parameter name to pattern).
    pub constraints: HashMap<String, String>,
    /// Stable route name for reverse lookup.
    pub name: Option<String>,
    /// Whether the route was declared or discovered.
    pub source: RouteSource,
}

impl RouteDefinition {
    /// Creates a declared route with the given pattern and target.
    #[must_use]
    pub fn new(pattern: impl Into<String>, target: HandlerId) -> Self {
        Self {
            pattern: pattern.into(),
            verbs: Vec::new(),
            target,
            middleware: Vec::new(),
            auth: AuthRequirement::Inherit,
            roles: Vec::new(),
            constraints: HashMap::new(),
            name: None,
            source: RouteSource::Declared,
        }
    }

    /// Adds an allowed verb.
    #[must_use]
    pub fn verb(mut self, verb: Method) -> Self {
        if !self.verbs.contains(&verb) {
            self.verbs.push(verb);
        }
        self
    }

    /// Replaces the allowed verb set.
    #[must_use]
    pub fn verbs(mut self, verbs: impl IntoIterator<Item = Method>) -> Self {
        self.verbs = Vec::new();
        for verb in verbs {
            if !self.verbs.contains(&verb) {
                self.verbs.push(verb);
            }
        }
        self
    }

    /// Appends middleware names, deduplicating as it goes.
    #[must_use]
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.middleware.contains(&name) {
                self.middleware.push(name);
            }
        }
        self
    }

    /// Sets the authentication requirement.
    #[must_use]
    pub fn auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }

    /// Appends required roles.
    #[must_use]
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for role in roles {
            let role = role.into();
            if !self.roles.contains(&role) {
                self.roles.push(role);
            }
        }
        self
    }

    /// Adds a regex constraint for a named parameter.
    #[must_use]
    pub fn constraint(mut self, param: impl Into<String>, regex: impl Into<String>) -> Self {
        self.constraints.insert(param.into(), regex.into());
        self
    }

    /// Sets the stable route name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks this route as discovered from controller metadata.
    #[must_use]
    pub fn discovered(mut self) -> Self {
        self.source = RouteSource::Discovered;
        self
    }

    /// Returns `true` if the route accepts the given verb.
    #[must_use]
    pub fn allows(&self, verb: &Method) -> bool {
        self.verbs.contains(verb)
    }

    /// Returns the pattern normalized for duplicate detection: slashes
    /// trimmed, empty segments dropped, parameter names preserved.
    /// `"/users/{id}"` and `"users/{id}/"` normalize identically;
    /// `"/users/{slug}"` is a different route from `"/users/{id}"`.
    #[must_use]
    pub fn normalized_pattern(&self) -> String {
        self.pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Ordered, immutable-after-load sequence of route definitions.
///
/// Insertion order is matching precedence: for overlapping declared
/// patterns the first structural match wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteCollection {
    routes: Vec<RouteDefinition>,
}

impl RouteCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route, rejecting a declared route whose pattern and verb
    /// set collide with an earlier declared route. Same-shape patterns
    /// with different parameter names (typically disambiguated by
    /// constraints) overlap rather than collide; insertion order decides
    /// between them at match time.
    ///
    /// Discovered routes never conflict fatally; the loader skips
    /// colliding discoveries before reaching this point.
    pub fn push(&mut self, route: RouteDefinition) -> Result<(), LoadError> {
        if route.source == RouteSource::Declared {
            let pattern = route.normalized_pattern();
            for existing in self
                .routes
                .iter()
                .filter(|r| r.source == RouteSource::Declared && r.normalized_pattern() == pattern)
            {
                if let Some(verb) = route.verbs.iter().find(|v| existing.allows(v)) {
                    return Err(LoadError::DuplicateRoute {
                        pattern: route.pattern.clone(),
                        verb: verb.clone(),
                    });
                }
            }
        }
        self.routes.push(route);
        Ok(())
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the collection holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over routes in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    /// Looks up a route by its stable name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&RouteDefinition> {
        self.routes.iter().find(|r| r.name.as_deref() == Some(name))
    }

    /// Persists the compiled route table as JSON.
    ///
    /// Failure here is fatal at startup: a partially written table cannot
    /// be trusted on the next boot.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self).map_err(|e| LoadError::Persist {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, json).map_err(|e| LoadError::Persist {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

impl IntoIterator for RouteCollection {
    type Item = RouteDefinition;
    type IntoIter = std::vec::IntoIter<RouteDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

/// Serde adapter storing verbs as their standard names.
mod verb_names {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(verbs: &[Method], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(verbs.iter().map(Method::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Method>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .into_iter()
            .map(|n| n.parse::<Method>().map_err(serde::de::Error::custom))
            .collect()
    }
}
