//! Handler chain: the gateway link and its fallbacks.

use crate::error::{BoxError, GatewayError};
use crate::http::{text_response, ReplyEnvelope};
use crate::routing::{RouteMatch, Router};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;

/// Request body type flowing through the handler chain.
pub type GatewayBody = UnsyncBoxBody<Bytes, BoxError>;

/// Wrap in-memory bytes as a [`GatewayBody`].
pub fn full_body(bytes: impl Into<Bytes>) -> GatewayBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// One link in the request handling chain.
#[async_trait]
pub trait NextHandler: Send + Sync {
    /// Handle a request, producing a response or an error.
    async fn handle(
        &self,
        req: Request<GatewayBody>,
    ) -> Result<Response<Full<Bytes>>, GatewayError>;
}

/// End of the chain: answers every request with 404.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

#[async_trait]
impl NextHandler for NotFound {
    async fn handle(
        &self,
        req: Request<GatewayBody>,
    ) -> Result<Response<Full<Bytes>>, GatewayError> {
        Ok(text_response(
            StatusCode::NOT_FOUND,
            format!("No function route for {}", req.uri().path()),
        ))
    }
}

/// Chain link that forwards matching requests to remote functions.
///
/// Requests that no route accepts are passed to `next` unmodified and its
/// result is returned verbatim.
pub struct Gateway {
    router: Arc<Router>,
    next: Arc<dyn NextHandler>,
}

impl Gateway {
    /// Create a gateway in front of `next`.
    pub fn new(router: Arc<Router>, next: Arc<dyn NextHandler>) -> Self {
        Self { router, next }
    }

    /// Create a gateway that answers unmatched requests with 404.
    pub fn with_not_found(router: Arc<Router>) -> Self {
        Self::new(router, Arc::new(NotFound))
    }

    /// Get the router.
    pub fn router(&self) -> &Router {
        &self.router
    }
}

#[async_trait]
impl NextHandler for Gateway {
    async fn handle(
        &self,
        req: Request<GatewayBody>,
    ) -> Result<Response<Full<Bytes>>, GatewayError> {
        let (route, invocation) = match self.router.select_route(req).await? {
            RouteMatch::Matched { route, invocation } => (route, invocation),
            RouteMatch::NoMatch(req) => return self.next.handle(req).await,
        };

        let function_name = invocation.function_name.clone();
        let result = route.invoke(invocation).await?;
        debug!(
            "Function {} replied with {} bytes (version {})",
            function_name,
            result.payload.len(),
            result.executed_version.as_deref().unwrap_or("unknown")
        );

        ReplyEnvelope::decode(&result.payload)?.into_response()
    }
}
