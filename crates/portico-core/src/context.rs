//! Request context and the published route attribute bag.
//!
//! After a successful match the framework publishes a [`RouteAttributes`]
//! onto the context so downstream middleware and the business action can
//! read the resolved handler identity, route name, middleware list, and
//! authorization data without touching the router again.

use std::time::Instant;

use uuid::Uuid;

use crate::params::Params;
use crate::route::HandlerId;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request IDs sortable in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID, e.g. one parsed from
    /// an upstream header.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Route resolution data published onto the request after a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAttributes {
    /// The resolved business handler.
    pub handler: HandlerId,
    /// Stable route name, if the route carries one.
    pub route_name: Option<String>,
    /// Merged middleware names in execution order.
    pub middleware: Vec<String>,
    /// Whether the route requires authentication.
    pub auth_required: bool,
    /// Roles required by the route.
    pub roles: Vec<String>,
    /// Extracted path parameters.
    pub params: Params,
}

/// Per-request context handed to the business action.
///
/// Created once per request; immutable from the action's point of view.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    route: Option<RouteAttributes>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            route: None,
            started_at: Instant::now(),
        }
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            route: None,
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Publishes the resolved route attributes onto this context.
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

    /// Returns elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Creates a mock context for tests.
    #[must_use]
    pub fn mock() -> Self {
        Self::new()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
