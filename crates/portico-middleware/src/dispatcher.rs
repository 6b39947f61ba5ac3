//! Pipeline assembly and dispatch.
//!
//! The [`Dispatcher`] owns the fixed global middleware list and a registry
//! of named route middleware. For each resolved match it assembles the
//! effective chain (globals first, then the route's names deduplicated
//! against them), folds it right-to-left around the business action, and
//! runs the request through it.
//!
//! Authentication and role data arrive fully resolved on the
//! [`MatchResult`]; the assembler publishes them to the context and never
//! re-derives them from the registry.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::BodyExt;
use tracing::{debug, warn};

use portico_core::{ControllerRegistry, ErasedAction, MatchResult, PorticoError};

use crate::context::MiddlewareContext;
use crate::middleware::{Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Assembles middleware chains and dispatches matched requests.
pub struct Dispatcher {
    registry: Arc<ControllerRegistry>,
    global: Vec<Arc<dyn Middleware>>,
    named: HashMap<String, Arc<dyn Middleware>>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ControllerRegistry>) -> Self {
        Self {
            registry,
            global: Vec::new(),
            named: HashMap::new(),
        }
    }

    /// Appends a global middleware, applied to every request in order.
    #[must_use]
    pub fn global(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.global.push(middleware);
        self
    }

    /// Registers a route-attachable middleware under its name.
    #[must_use]
    pub fn register(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.named
            .insert(middleware.name().to_string(), middleware);
        self
    }

    /// Builds the effective chain for a route's middleware names.
    ///
    /// Globals always come first. Route names already covered by a global
    /// (or listed twice) are dropped; unknown names are logged and
    /// skipped.
    fn assemble(&self, route_middleware: &[String]) -> Vec<Arc<dyn Middleware>> {
        let mut chain = self.global.clone();
        for name in route_middleware {
            if chain.iter().any(|m| m.name() == name) {
                continue;
            }
            match self.named.get(name) {
                Some(middleware) => chain.push(Arc::clone(middleware)),
                None => warn!(middleware = %name, "unknown route middleware, skipping"),
            }
        }
        chain
    }

    /// Middleware names in the order they would run for a route.
    #[must_use]
    pub fn chain_names(&self, route_middleware: &[String]) -> Vec<&'static str> {
        self.assemble(route_middleware)
            .iter()
            .map(|m| m.name())
            .collect()
    }

    /// Dispatches a matched request through the assembled pipeline.
    pub async fn dispatch(&self, request: Request, matched: &MatchResult) -> Response {
        let mut ctx = MiddlewareContext::new();
        ctx.publish_route(matched.attributes());

        let Some(action) = self.find_action(matched) else {
            warn!(handler = %matched.handler, "matched handler is not registered");
            return Self::not_found(&ctx);
        };

        let chain = self.assemble(&matched.middleware);
        debug!(
            handler = %matched.handler,
            request_id = %ctx.request_id(),
            stages = chain.len(),
            "dispatching"
        );

        let mut next = Next::terminal(move |ctx: &mut MiddlewareContext, request: Request| {
            // Freeze the context before entering the 'static future.
            let frozen = ctx.to_request_context();
            Box::pin(async move {
                let body = match request.into_body().collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(never) => match never {},
                };
                match action.call_raw(&frozen, body).await {
                    Ok(bytes) => Response::json(StatusCode::OK, bytes),
                    Err(error) => error_response(&error, &frozen.request_id().to_string()),
                }
            })
        });
        for middleware in chain.iter().rev() {
            next = Next::chain(middleware.as_ref(), next);
        }

        next.run(&mut ctx, request).await
    }

    /// The uniform 404 for unmatched requests.
    #[must_use]
    pub fn not_found(ctx: &MiddlewareContext) -> Response {
        let error = PorticoError::not_found("route not found");
        error_response(&error, &ctx.request_id().to_string())
    }

    fn find_action(&self, matched: &MatchResult) -> Option<Arc<dyn ErasedAction>> {
        self.registry
            .get(&matched.handler.controller)
            .and_then(|c| c.find_action(&matched.handler.action))
            .map(portico_core::ActionEntry::handler)
    }
}

fn error_response(error: &PorticoError, request_id: &str) -> Response {
    Response::envelope(error.status_code(), &error.to_envelope(Some(request_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{ActionEntry, ControllerEntry, HandlerId, MatchSource, Params};

    fn matched(middleware: Vec<String>) -> MatchResult {
        MatchResult {
            handler: HandlerId::new("Users", "index"),
            params: Params::new(),
            middleware,
            auth_required: false,
            roles: vec![],
            route_name: None,
            source: MatchSource::Declared,
        }
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = ControllerRegistry::new();
        registry
            .register(ControllerEntry::new("Users").action(ActionEntry::noop("index")))
            .expect("registers");
        Dispatcher::new(Arc::new(registry))
    }

    #[test]
    fn unknown_route_middleware_is_skipped() {
        let dispatcher = dispatcher();
        let names = dispatcher.chain_names(&["ghost".to_string()]);
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn unregistered_handler_produces_not_found() {
        let dispatcher = dispatcher();
        let mut missing = matched(vec![]);
        missing.handler = HandlerId::new("Ghosts", "index");

        let request = http::Request::builder()
            .uri("/ghosts")
            .body(http_body_util::Full::new(Bytes::new()))
            .unwrap();
        let response = dispatcher.dispatch(request, &missing).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
