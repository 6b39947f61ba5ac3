//! # Portico Core
//!
//! Core types and traits for the Portico web framework.
//!
//! This crate provides the foundational types used throughout Portico:
//!
//! - [`RequestContext`] - Per-request context carrying the request id and resolved route
//! - [`RouteDefinition`] / [`RouteCollection`] - The declared route table
//! - [`ControllerRegistry`] - Controllers and actions addressable by route resolution
//! - [`MatchResult`] - Outcome of resolving a request against the route table
//! - [`Action`] - Core action trait, type-erased for dispatch via [`ErasedAction`]
//! - [`PorticoError`] - Standard error types
//! - [`CacheStore`] - Byte-oriented cache port used by the match cache

#![doc(html_root_url = "https://docs.rs/portico-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod context;
mod error;
mod matched;
mod metadata;
mod params;
mod registry;
mod route;
mod store;

pub use action::{erase, Action, BoxFuture, Empty, ErasedAction, FnAction, NoContent};
pub use context::{RequestContext, RequestId, RouteAttributes};
pub use error::{
    ErrorCategory, ErrorDetail, ErrorEnvelope, LoadError, PorticoError, PorticoResult,
    RegistryError,
};
pub use matched::{CachedMatch, MatchResult, MatchSource};
pub use metadata::HandlerMetadata;
pub use params::Params;
pub use registry::{ActionEntry, ActionVisibility, ControllerEntry, ControllerRegistry};
pub use route::{AuthRequirement, HandlerId, RouteCollection, RouteDefinition, RouteSource};
pub use store::{CacheStore, MemoryStore, StoreConfig, StoreStats};
