//! Pipeline context.
//!
//! [`MiddlewareContext`] is the mutable state flowing through the chain.
//! Middleware can read the published route attributes and stash typed
//! extension data for later stages; at the innermost point the dispatcher
//! freezes it into the immutable [`RequestContext`] handed to the action.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

use portico_core::{Params, RequestContext, RequestId, RouteAttributes};

/// Mutable context carried through the middleware chain.
pub struct MiddlewareContext {
    request_id: RequestId,
    route: Option<RouteAttributes>,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("request_id", &self.request_id)
            .field("route", &self.route)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewareContext {
    /// Creates a context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            route: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a context with a request ID supplied upstream.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            ..Self::new()
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Publishes route resolution data for downstream stages.
    pub fn publish_route(&mut self, attributes: RouteAttributes) {
        self.route = Some(attributes);
    }

    /// Returns the published route attributes, if a match occurred.
    #[must_use]
    pub fn route(&self) -> Option<&RouteAttributes> {
        self.route.as_ref()
    }

    /// Returns the extracted path parameters, empty before a match.
    #[must_use]
    pub fn params(&self) -> Params {
        self.route
            .as_ref()
            .map(|r| r.params.clone())
            .unwrap_or_default()
    }

    /// Stores typed extension data, replacing any previous value of the
    /// same type.
    pub fn set_extension<T: Any + Send + Sync>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Reads typed extension data stored by an earlier stage.
    #[must_use]
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Freezes this context into the immutable view handed to the action.
    #[must_use]
    pub fn to_request_context(&self) -> RequestContext {
        let mut ctx = RequestContext::with_request_id(self.request_id);
        if let Some(route) = &self.route {
            ctx.publish_route(route.clone());
        }
        ctx
    }
}
