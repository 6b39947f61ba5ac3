//! Route source loader.
//!
//! Runs once at startup and merges two sources into one ordered
//! [`RouteCollection`]: explicitly declared routes, then routes discovered
//! from controller registrations that carry a method-level path. Declared
//! routes come first, so they always win precedence over discoveries.
//!
//! Discovery normalizes everything up front: verbless routes default to
//! GET, the pattern is `trim(prefix) + '/' + trim(suffix)`, and the
//! class/method middleware, auth, and role values are merged into the
//! definition so match time never re-derives them. A registration that
//! fails to compile is logged and skipped; a duplicate declared route or a
//! failed persist is fatal.

use std::path::PathBuf;

use http::Method;
use tracing::{debug, warn};

use portico_core::{
    ControllerRegistry, HandlerId, HandlerMetadata, LoadError, RouteCollection, RouteDefinition,
};

use crate::pattern::CompiledRoute;

/// Builds the route collection from declared routes and the registry.
#[derive(Debug, Default)]
pub struct RouteLoader {
    declared: Vec<RouteDefinition>,
    persist_path: Option<PathBuf>,
}

impl RouteLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an explicitly declared route.
    #[must_use]
    pub fn declare(mut self, route: RouteDefinition) -> Self {
        self.declared.push(route);
        self
    }

    /// Adds a batch of declared routes.
    #[must_use]
    pub fn declare_all(mut self, routes: impl IntoIterator<Item = RouteDefinition>) -> Self {
        self.declared.extend(routes);
        self
    }

    /// Persists the compiled route table to the given path after loading.
    #[must_use]
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }

    /// Merges declared routes with registry discoveries.
    ///
    /// # Errors
    ///
    /// Duplicate declared routes and persist failures are fatal; a
    /// malformed discovery is skipped with a warning.
    pub fn load(self, registry: &ControllerRegistry) -> Result<RouteCollection, LoadError> {
        let mut collection = RouteCollection::new();

        for route in self.declared {
            let route = default_verb(route);
            collection.push(route)?;
        }

        for controller in registry.iter() {
            if controller.is_abstract() {
                debug!(controller = controller.name(), "skipping abstract base");
                continue;
            }
            for action in controller.actions() {
                let Some(suffix) = action.path_suffix() else {
                    continue;
                };

                let pattern = join_path(controller.path_prefix(), suffix);
                let metadata = HandlerMetadata::resolve(controller, action);

                let mut route = RouteDefinition::new(
                    pattern,
                    HandlerId::new(controller.name(), action.name()),
                )
                .verbs(action.verbs().iter().cloned())
                .middleware(metadata.middleware)
                .auth(metadata.auth)
                .roles(metadata.roles)
                .discovered();
                for (param, regex) in action.constraints() {
                    route = route.constraint(param, regex);
                }
                if let Some(name) = action.route_name() {
                    route = route.named(name);
                }
                let route = default_verb(route);

                // Validate now so the router never sees a malformed
                // discovery; the registration is skipped, not fatal.
                match CompiledRoute::compile(route) {
                    Ok(compiled) => collection.push(compiled.definition)?,
                    Err(error) => {
                        warn!(
                            controller = controller.name(),
                            action = action.name(),
                            %error,
                            "skipping malformed route registration"
                        );
                    }
                }
            }
        }

        if let Some(path) = &self.persist_path {
            collection.persist(path)?;
        }

        Ok(collection)
    }
}

fn default_verb(route: RouteDefinition) -> RouteDefinition {
    if route.verbs.is_empty() {
        route.verb(Method::GET)
    } else {
        route
    }
}

/// Computes a discovered pattern as `trim(prefix) + '/' + trim(suffix)`.
fn join_path(prefix: Option<&str>, suffix: &str) -> String {
    let prefix = prefix.unwrap_or("").trim_matches('/');
    let suffix = suffix.trim_matches('/');
    match (prefix.is_empty(), suffix.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{suffix}"),
        (false, true) => format!("/{prefix}"),
        (false, false) => format!("/{prefix}/{suffix}"),
    }
}
