//! # Portico
//!
//! **Request resolution for monolithic web applications**
//!
//! Portico turns an incoming method and path into a concrete controller
//! action, then runs it through an assembled middleware pipeline:
//!
//! - **Declared routes** – explicit patterns with verbs, constraints, and names
//! - **Convention inference** – `/admin/users/show/42` finds `AdminUsers::show`
//!   without any declaration, gated by a namespace guard
//! - **Match caching** – resolved matches are cached with a TTL and replayed
//!   without re-running inference
//! - **Middleware pipelines** – global and per-route middleware assembled
//!   around the action, deduplicated by name
//!
//! ## Quick Start
//!
//! ```
//! use portico::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ControllerRegistry::new();
//! registry.register(
//!     ControllerEntry::new("Users")
//!         .action(ActionEntry::noop("index").path("/").get().routable())
//!         .action(ActionEntry::noop("show").path("/{id}").get().routable()),
//! )?;
//!
//! let collection = RouteLoader::new().load(&registry)?;
//! let router = Router::new(collection, registry.into(), RouterConfig::default(), None)?;
//!
//! let matched = router.resolve(&http::Method::GET, "/users/42");
//! assert!(matched.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → normalize → cache → declared routes → convention inference
//!                                                        ↓
//! Response ← action ← middleware pipeline ← match result
//! ```

#![doc(html_root_url = "https://docs.rs/portico/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use portico_core as core;

// Re-export router types
pub use portico_router as router;

// Re-export middleware types
pub use portico_middleware as middleware;

// Re-export configuration types
pub use portico_config as config;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use portico_core::{
        erase, Action, ActionEntry, AuthRequirement, ControllerEntry, ControllerRegistry,
        HandlerId, MatchResult, MatchSource, MemoryStore, Params, PorticoError, PorticoResult,
        RequestContext, RequestId, RouteDefinition, StoreConfig,
    };

    // Re-export the matching engine
    pub use portico_router::{GuardConfig, RouteLoader, Router, RouterConfig};

    // Re-export pipeline types
    pub use portico_middleware::{
        Dispatcher, FnMiddleware, Middleware, MiddlewareContext, Next, Request, Response,
        ResponseExt,
    };

    // Re-export configuration types
    pub use portico_config::{ConfigLoader, PorticoConfig};
}
