//! The matching engine.
//!
//! [`Router`] resolves an incoming (verb, path) pair to a [`MatchResult`]
//! in three stages, cheapest first:
//!
//! 1. **Cache** - a hit reconstructs the result with no pattern or
//!    registry work at all.
//! 2. **Declared routes** - the compiled collection is scanned in
//!    precedence order; first pattern + verb + constraint match wins.
//! 3. **Convention inference** - URL segments are mapped to a registered
//!    controller and action, longest join first, gated by the namespace
//!    rules in [`GuardConfig`].
//!
//! Handler metadata is resolved exactly once per (controller, action) key
//! and cached for the process lifetime; the pipeline assembler receives it
//! through the match result and never re-derives it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use http::Method;
use tracing::{debug, trace};

use portico_core::{
    AuthRequirement, CacheStore, ControllerEntry, ControllerRegistry, HandlerId, HandlerMetadata,
    LoadError, MatchResult, MatchSource, Params, RouteCollection, RouteDefinition,
};

use crate::cache::MatchCache;
use crate::convention::{camel_join, pascal_join, rest_fallback};
use crate::guard::{ConventionGuard, GuardConfig};
use crate::pattern::CompiledRoute;

/// Router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Cosmetic suffixes stripped from the path before matching.
    pub strip_suffixes: Vec<String>,
    /// Time-to-live for match cache entries.
    pub cache_ttl: Duration,
    /// Convention-inference gate settings.
    pub guard: GuardConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strip_suffixes: vec![".html".to_string()],
            cache_ttl: Duration::from_secs(60),
            guard: GuardConfig::default(),
        }
    }
}

/// Resolves requests to handlers.
///
/// Constructed once at startup and shared by reference across all
/// request-handling tasks; all interior state is concurrency-safe.
pub struct Router {
    routes: Vec<CompiledRoute>,
    registry: Arc<ControllerRegistry>,
    guard: ConventionGuard,
    cache: MatchCache,
    metadata: DashMap<HandlerId, Arc<HandlerMetadata>>,
    metadata_resolutions: AtomicU64,
    strip_suffixes: Vec<String>,
}

impl Router {
    /// Compiles the route collection and builds the engine.
    ///
    /// # Errors
    ///
    /// A declared route with an invalid pattern or constraint is fatal.
    pub fn new(
        collection: RouteCollection,
        registry: Arc<ControllerRegistry>,
        config: RouterConfig,
        store: Option<Arc<dyn CacheStore>>,
    ) -> Result<Self, LoadError> {
        let mut routes = Vec::with_capacity(collection.len());
        for definition in collection {
            routes.push(CompiledRoute::compile(definition)?);
        }
        Ok(Self {
            routes,
            registry,
            guard: ConventionGuard::new(config.guard),
            cache: MatchCache::new(store, config.cache_ttl),
            metadata: DashMap::new(),
            metadata_resolutions: AtomicU64::new(0),
            strip_suffixes: config.strip_suffixes,
        })
    }

    /// Resolves a request to a match result.
    ///
    /// `None` means no route matched; the caller produces the 404.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<MatchResult> {
        let normalized = self.normalize(path);

        if let Some(hit) = self.cache.get(method, &normalized) {
            trace!(%method, path = %normalized, handler = %hit.handler, "route cache hit");
            return Some(hit);
        }

        let result = self
            .match_declared(method, &normalized)
            .or_else(|| self.match_convention(method, &normalized))?;
        self.cache.put(method, &normalized, &result);
        Some(result)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Total registry introspections performed so far (metadata
    /// resolutions plus eligible-action roster computations).
    ///
    /// Cached resolutions do not count, which makes cache idempotence
    /// observable in tests.
    #[must_use]
    pub fn introspections(&self) -> u64 {
        self.guard.introspections() + self.metadata_resolutions.load(Ordering::Relaxed)
    }

    /// Strips the first configured cosmetic suffix, if any.
    fn normalize(&self, path: &str) -> String {
        for suffix in &self.strip_suffixes {
            if let Some(stripped) = path.strip_suffix(suffix.as_str()) {
                return if stripped.is_empty() {
                    "/".to_string()
                } else {
                    stripped.to_string()
                };
            }
        }
        path.to_string()
    }

    fn match_declared(&self, method: &Method, path: &str) -> Option<MatchResult> {
        let mut pattern_hit = false;
        for route in &self.routes {
            let Some(params) = route.path_params(path) else {
                continue;
            };
            if !route.definition.allows(method) {
                pattern_hit = true;
                debug!(
                    pattern = %route.definition.pattern,
                    %method,
                    "declared pattern matched but verb did not"
                );
                continue;
            }
            return Some(self.declared_result(&route.definition, params));
        }
        if !pattern_hit {
            debug!(%method, path, "no declared pattern matched");
        }
        None
    }

    fn declared_result(&self, definition: &RouteDefinition, params: Params) -> MatchResult {
        let metadata = self.metadata_for(&definition.target);

        let mut middleware = metadata.middleware.clone();
        for name in &definition.middleware {
            if !middleware.contains(name) {
                middleware.push(name.clone());
            }
        }
        let roles = if definition.roles.is_empty() {
            metadata.roles.clone()
        } else {
            definition.roles.clone()
        };

        MatchResult {
            handler: definition.target.clone(),
            params,
            middleware,
            auth_required: definition.auth.resolve_with(metadata.auth),
            roles,
            route_name: definition.name.clone(),
            source: MatchSource::Declared,
        }
    }

    fn match_convention(&self, method: &Method, path: &str) -> Option<MatchResult> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return None;
        }

        let suffix = self.guard.config().controller_suffix.clone();
        for i in (1..=segments.len()).rev() {
            let base = pascal_join(&segments[..i]);
            for name in [base.clone(), format!("{base}{suffix}")] {
                let Some(controller) = self.registry.get(&name) else {
                    continue;
                };
                if controller.is_abstract() {
                    continue;
                }
                if !self.guard.namespace_permitted(controller.namespace_str()) {
                    debug!(
                        controller = controller.name(),
                        namespace = controller.namespace_str(),
                        "convention candidate rejected by namespace gate"
                    );
                    continue;
                }
                // Class accepted: action resolution does not backtrack to
                // shorter controller joins.
                return self.resolve_action(method, controller, &segments[i..]);
            }
        }
        None
    }

    fn resolve_action(
        &self,
        method: &Method,
        controller: &ControllerEntry,
        rest: &[&str],
    ) -> Option<MatchResult> {
        let eligible = self.guard.eligible_actions(controller);

        // Longest camel join wins.
        for j in (1..=rest.len()).rev() {
            let action = camel_join(&rest[..j]);
            if eligible.iter().any(|a| *a == action) {
                return Some(self.convention_result(controller, &action, &rest[j..]));
            }
        }

        let fallback = rest_fallback(method)?;
        if !eligible.iter().any(|a| a == fallback) {
            return None;
        }
        Some(self.convention_result(controller, fallback, rest))
    }

    fn convention_result(
        &self,
        controller: &ControllerEntry,
        action: &str,
        leftovers: &[&str],
    ) -> MatchResult {
        let handler = HandlerId::new(controller.name(), action);
        let metadata = self.metadata_for(&handler);
        let route_name = controller
            .find_action(action)
            .and_then(|a| a.route_name())
            .map(ToString::to_string);

        MatchResult {
            handler,
            params: bind_leftovers(leftovers),
            middleware: metadata.middleware.clone(),
            auth_required: metadata.auth.resolve_with(AuthRequirement::Inherit),
            roles: metadata.roles.clone(),
            route_name,
            source: MatchSource::Convention,
        }
    }

    /// Resolves handler metadata, computing it on first use per key.
    fn metadata_for(&self, handler: &HandlerId) -> Arc<HandlerMetadata> {
        self.metadata
            .entry(handler.clone())
            .or_insert_with(|| {
                self.metadata_resolutions.fetch_add(1, Ordering::Relaxed);
                let resolved = self
                    .registry
                    .get(&handler.controller)
                    .and_then(|c| c.find_action(&handler.action).map(|a| (c, a)))
                    .map(|(c, a)| HandlerMetadata::resolve(c, a))
                    .unwrap_or_default();
                Arc::new(resolved)
            })
            .clone()
    }
}

/// Binds segments left over after action resolution as parameters.
///
/// One leftover binds to the canonical `id` name; several bind to
/// indexed names.
fn bind_leftovers(segments: &[&str]) -> Params {
    let mut params = Params::new();
    match segments {
        [] => {}
        [only] => params.push("id", *only),
        many => {
            for (i, segment) in many.iter().enumerate() {
                params.push(format!("arg{i}"), *segment);
            }
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_configured_suffixes() {
        let router = Router::new(
            RouteCollection::new(),
            Arc::new(ControllerRegistry::new()),
            RouterConfig::default(),
            None,
        )
        .expect("builds");

        assert_eq!(router.normalize("/about.html"), "/about");
        assert_eq!(router.normalize("/about"), "/about");
        assert_eq!(router.normalize(".html"), "/");
    }

    #[test]
    fn bind_leftovers_uses_canonical_names() {
        assert!(bind_leftovers(&[]).is_empty());

        let one = bind_leftovers(&["42"]);
        assert_eq!(one.get("id"), Some("42"));

        let many = bind_leftovers(&["42", "7"]);
        assert_eq!(many.get("arg0"), Some("42"));
        assert_eq!(many.get("arg1"), Some("7"));
        assert!(many.get("id").is_none());
    }

    #[test]
    fn invalid_declared_pattern_is_fatal() {
        let mut collection = RouteCollection::new();
        collection
            .push(RouteDefinition::new("/users/{", HandlerId::new("Users", "show")).verb(Method::GET))
            .expect("pushes");

        let err = Router::new(
            collection,
            Arc::new(ControllerRegistry::new()),
            RouterConfig::default(),
            None,
        )
        .err()
        .expect("fatal");
        assert!(matches!(err, LoadError::InvalidPattern { .. }));
    }
}
