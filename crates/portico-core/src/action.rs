//! The business-action contract.
//!
//! An [`Action`] is the typed unit of business logic identified by a
//! (controller, action) pair. The registry stores actions type-erased as
//! [`ErasedAction`] so handlers with different request/response types can
//! live in one table; the dispatcher invokes them with raw bytes at the
//! innermost point of the middleware chain.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::context::RequestContext;
use crate::error::{PorticoError, PorticoResult};

/// A boxed future, the return shape of type-erased calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A typed business action.
///
/// # Example
///
/// ```rust,ignore
/// use portico_core::{Action, RequestContext, PorticoResult};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct ShowUser { }
///
/// #[derive(Serialize)]
/// struct User { id: String }
///
/// struct ShowUserAction;
///
/// impl Action<ShowUser, User> for ShowUserAction {
///     async fn call(&self, ctx: &RequestContext, _req: ShowUser) -> PorticoResult<User> {
///         let id = ctx.params().get("id").unwrap_or("0").to_string();
///         Ok(User { id })
///     }
/// }
/// ```
pub trait Action<Req, Res>: Send + Sync + 'static
where
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    /// Handles a request and returns a response.
    ///
    /// Path parameters and route metadata arrive through the context's
    /// published route attributes.
    fn call(
        &self,
        ctx: &RequestContext,
        request: Req,
    ) -> impl Future<Output = PorticoResult<Res>> + Send;
}

/// A type-erased action storable in the registry.
///
/// The dispatcher deserializes the request body, invokes the typed action,
/// and serializes the response. An empty body is treated as an empty JSON
/// object so bodyless verbs work with unit-like request types.
pub trait ErasedAction: Send + Sync + 'static {
    /// Invokes the action with a raw JSON body.
    fn call_raw<'a>(
        &'a self,
        ctx: &'a RequestContext,
        body: Bytes,
    ) -> BoxFuture<'a, PorticoResult<Bytes>>;
}

struct Erased<A, Req, Res> {
    action: A,
    _marker: PhantomData<fn(Req) -> Res>,
}

impl<A, Req, Res> ErasedAction for Erased<A, Req, Res>
where
    A: Action<Req, Res>,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    fn call_raw<'a>(
        &'a self,
        ctx: &'a RequestContext,
        body: Bytes,
    ) -> BoxFuture<'a, PorticoResult<Bytes>> {
        Box::pin(async move {
            let slice: &[u8] = if body.is_empty() { b"{}" } else { &body };
            let request: Req = serde_json::from_slice(slice)
                .map_err(|e| PorticoError::validation(format!("invalid request body: {e}")))?;
            let response = self.action.call(ctx, request).await?;
            let bytes = serde_json::to_vec(&response).map_err(|e| {
                PorticoError::internal_with_source("failed to serialize response", e)
            })?;
            Ok(Bytes::from(bytes))
        })
    }
}

/// Erases a typed action for storage in the registry.
pub fn erase<A, Req, Res>(action: A) -> Arc<dyn ErasedAction>
where
    A: Action<Req, Res>,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    Arc::new(Erased {
        action,
        _marker: PhantomData,
    })
}

/// A function-based action, so plain async functions can serve routes.
///
/// # Example
///
/// ```rust,ignore
/// let action = FnAction::new(|ctx: &RequestContext, req: ShowUser| async move {
///     Ok(User { id: "1".into() })
/// });
/// ```
pub struct FnAction<F, Req, Res, Fut>
where
    F: Fn(&RequestContext, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PorticoResult<Res>> + Send,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    func: F,
    _marker: PhantomData<fn(Req) -> (Res, Fut)>,
}

impl<F, Req, Res, Fut> FnAction<F, Req, Res, Fut>
where
    F: Fn(&RequestContext, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PorticoResult<Res>> + Send,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    /// Wraps a function as an action.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<F, Req, Res, Fut> Action<Req, Res> for FnAction<F, Req, Res, Fut>
where
    F: Fn(&RequestContext, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = PorticoResult<Res>> + Send + 'static,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    async fn call(&self, ctx: &RequestContext, request: Req) -> PorticoResult<Res> {
        (self.func)(ctx, request).await
    }
}

/// Unit request type for actions that take no body.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct Empty {}

/// Unit response type for actions that return only a status.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct NoContent {}
