//! # Portico Middleware
//!
//! Cross-cutting handler contract and pipeline assembly for Portico.
//!
//! A [`Middleware`] wraps request handling with a `handle(ctx, request,
//! next)` method; the [`Dispatcher`] assembles the effective chain for a
//! resolved route (global middleware first, then the route's own) and
//! folds it right-to-left around the business action, so execution order
//! equals list order.

#![doc(html_root_url = "https://docs.rs/portico-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod dispatcher;
mod middleware;
mod types;

pub use context::MiddlewareContext;
pub use dispatcher::Dispatcher;
pub use middleware::{FnMiddleware, Middleware, Next};
pub use types::{Request, Response, ResponseExt};
