//! # Portico Router
//!
//! Route loading and dual-strategy request resolution for Portico.
//!
//! The [`RouteLoader`] runs once at startup, merging explicitly declared
//! routes with routes discovered from the controller registry into one
//! ordered collection. The [`Router`] then resolves each request against
//! that collection: result cache first, declared routes next, convention
//! inference last.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use http::Method;
//! use portico_core::{ActionEntry, ControllerEntry, ControllerRegistry};
//! use portico_router::{RouteLoader, Router, RouterConfig};
//!
//! let mut registry = ControllerRegistry::new();
//! registry.register(
//!     ControllerEntry::new("Users")
//!         .prefix("/users")
//!         .action(ActionEntry::noop("index").path("/").get())
//!         .action(ActionEntry::noop("show").path("/{id}").get()),
//! ).unwrap();
//! let registry = Arc::new(registry);
//!
//! let collection = RouteLoader::new().load(&registry).unwrap();
//! let router = Router::new(collection, registry, RouterConfig::default(), None).unwrap();
//!
//! let result = router.resolve(&Method::GET, "/users/42").unwrap();
//! assert_eq!(result.handler.to_string(), "Users::show");
//! assert_eq!(result.params.get("id"), Some("42"));
//! ```

#![doc(html_root_url = "https://docs.rs/portico-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod convention;
mod guard;
mod loader;
mod pattern;
mod router;

pub use guard::GuardConfig;
pub use loader::RouteLoader;
pub use router::{Router, RouterConfig};
