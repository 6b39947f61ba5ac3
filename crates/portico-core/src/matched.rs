//! Match results and their cacheable form.
//!
//! A [`MatchResult`] is produced per request and discarded after dispatch.
//! Its serializable subset, [`CachedMatch`], is what the match cache
//! stores; raw registration handles never enter the cache.

use serde::{Deserialize, Serialize};

use crate::context::RouteAttributes;
use crate::params::Params;
use crate::route::HandlerId;

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// Matched an explicitly declared route.
    Declared,
    /// Inferred from URL segments by naming convention.
    Convention,
    /// Reconstructed from a cache entry; no introspection was performed.
    Cache,
}

/// The outcome of resolving a request to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The resolved business handler.
    pub handler: HandlerId,
    /// Extracted path parameters.
    pub params: Params,
    /// Merged middleware names in execution order (route-level metadata
    /// first, then route-inline additions, deduplicated).
    pub middleware: Vec<String>,
    /// Effective authentication flag after tri-state resolution.
    pub auth_required: bool,
    /// Roles required to reach the handler.
    pub roles: Vec<String>,
    /// Stable route name, absent for convention-inferred matches.
    pub route_name: Option<String>,
    /// Which strategy produced this match.
    pub source: MatchSource,
}

impl MatchResult {
    /// Converts this result into the serializable cache payload.
    #[must_use]
    pub fn to_cached(&self) -> CachedMatch {
        CachedMatch {
            handler: self.handler.clone(),
            params: self.params.to_pairs(),
            middleware: self.middleware.clone(),
            auth_required: self.auth_required,
            roles: self.roles.clone(),
            route_name: self.route_name.clone(),
        }
    }

    /// Reconstructs a result from a cache payload.
    ///
    /// The source is marked [`MatchSource::Cache`] so the router knows not
    /// to write the entry back.
    #[must_use]
    pub fn from_cached(cached: CachedMatch) -> Self {
        Self {
            handler: cached.handler,
            params: Params::from_pairs(cached.params),
            middleware: cached.middleware,
            auth_required: cached.auth_required,
            roles: cached.roles,
            route_name: cached.route_name,
            source: MatchSource::Cache,
        }
    }

    /// Builds the attribute bag published onto the request context.
    #[must_use]
    pub fn attributes(&self) -> RouteAttributes {
        RouteAttributes {
            handler: self.handler.clone(),
            route_name: self.route_name.clone(),
            middleware: self.middleware.clone(),
            auth_required: self.auth_required,
            roles: self.roles.clone(),
            params: self.params.clone(),
        }
    }
}

/// Serializable subset of a [`MatchResult`] stored in the match cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMatch {
    /// The resolved business handler.
    pub handler: HandlerId,
    /// Path parameters as (name, value) pairs.
    pub params: Vec<(String, String)>,
    /// Merged middleware names.
    pub middleware: Vec<String>,
    /// Effective authentication flag.
    pub auth_required: bool,
    /// Required roles.
    pub roles: Vec<String>,
    /// Stable route name.
    pub route_name: Option<String>,
}
