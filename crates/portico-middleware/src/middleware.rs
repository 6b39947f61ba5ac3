//! The cross-cutting handler contract.
//!
//! Every middleware implements one method: receive the request and a
//! [`Next`], and either call `next.run(..)` once to continue or return a
//! response directly to short-circuit. `Next::run` takes `self` by value,
//! so calling the continuation twice is unrepresentable rather than
//! undefined.
//!
//! # Example
//!
//! ```rust
//! use portico_core::BoxFuture;
//! use portico_middleware::{Middleware, MiddlewareContext, Next, Request, Response};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let response = next.run(ctx, request).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
//!             response
//!         })
//!     }
//! }
//! ```

use std::future::Future;

use portico_core::BoxFuture;

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};

/// A cross-cutting request/response wrapper.
///
/// Implementations must call `next.run()` at most once; skipping it
/// short-circuits the chain with the middleware's own response.
pub trait Middleware: Send + Sync + 'static {
    /// Stable name used for route attachment, deduplication, and logs.
    fn name(&self) -> &'static str;

    /// Processes the request, continuing downstream via `next`.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// The continuation handed to each middleware.
///
/// Consuming `run` enforces the call-at-most-once contract.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Terminal(
        Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a>,
    ),
}

impl<'a> Next<'a> {
    /// Wraps a middleware around an existing continuation.
    pub(crate) fn chain(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the innermost continuation, which invokes the business
    /// action.
    pub(crate) fn terminal<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Terminal(Box::new(f)),
        }
    }

    /// Runs the rest of the chain.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.handle(ctx, request, *next).await,
            NextInner::Terminal(terminal) => terminal(ctx, request).await,
        }
    }
}

/// A middleware built from an async closure, mostly for tests and small
/// one-off wrappers.
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Wraps a closure under the given name.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(&mut MiddlewareContext, Request, Next<'_>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin((self.func)(ctx, request, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    use crate::types::ResponseExt;

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    struct Tag(&'static str);

    impl Middleware for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn handle<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                ctx.set_extension(self.0);
                next.run(ctx, request).await
            })
        }
    }

    #[tokio::test]
    async fn terminal_continuation_runs_the_handler() {
        let mut ctx = MiddlewareContext::new();
        let next = Next::terminal(|_ctx, _req| {
            Box::pin(async { Response::json(StatusCode::OK, Bytes::from_static(b"{}")) })
        });

        let response = next.run(&mut ctx, request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chained_middleware_runs_before_the_terminal() {
        let tag = Tag("outer");
        let mut ctx = MiddlewareContext::new();

        let terminal = Next::terminal(|_ctx, _req| {
            Box::pin(async { Response::json(StatusCode::OK, Bytes::from_static(b"{}")) })
        });
        let next = Next::chain(&tag, terminal);

        next.run(&mut ctx, request()).await;
        assert_eq!(ctx.extension::<&'static str>(), Some(&"outer"));
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let deny = FnMiddleware::new(
            "deny",
            |_ctx: &mut MiddlewareContext, _req: Request, _next: Next<'_>| async {
                Response::error(StatusCode::FORBIDDEN, "denied")
            },
        );
        let mut ctx = MiddlewareContext::new();

        let terminal = Next::terminal(|_ctx, _req| {
            Box::pin(async { Response::json(StatusCode::OK, Bytes::from_static(b"{}")) })
        });
        let next = Next::chain(&deny, terminal);

        let response = next.run(&mut ctx, request()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
