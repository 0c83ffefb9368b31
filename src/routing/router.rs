//! Route selection across overlapping path prefixes.

use crate::error::{BoxError, GatewayError};
use crate::function::{InvocationRequest, InvocationResult, Invoker};
use crate::routing::RouteConfig;
use bytes::Bytes;
use hyper::body::Body;
use hyper::Request;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A configured route together with the invoker that serves it.
#[derive(Clone)]
pub struct Route {
    /// Route settings.
    pub config: RouteConfig,
    invoker: Arc<dyn Invoker>,
}

impl Route {
    /// Create a route.
    pub fn new(config: RouteConfig, invoker: Arc<dyn Invoker>) -> Self {
        Self { config, invoker }
    }

    /// Call the remote function through this route's invoker.
    pub async fn invoke(
        &self,
        invocation: InvocationRequest,
    ) -> Result<InvocationResult, GatewayError> {
        self.invoker.invoke(invocation).await
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Outcome of route selection.
pub enum RouteMatch<'a, B> {
    /// A route accepted the request and the request was encoded.
    Matched {
        route: &'a Route,
        invocation: InvocationRequest,
    },
    /// No route applies; the untouched request is handed back so it can
    /// go to the next handler.
    NoMatch(Request<B>),
}

impl<B> fmt::Debug for RouteMatch<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMatch::Matched { route, invocation } => f
                .debug_struct("Matched")
                .field("path", &route.config.path)
                .field("invocation", invocation)
                .finish(),
            RouteMatch::NoMatch(req) => f.debug_tuple("NoMatch").field(req.uri()).finish(),
        }
    }
}

/// Ordered, read-only set of routes.
///
/// Built once at startup and shared between connections behind an `Arc`.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create a router. Registration order breaks ties between routes
    /// with prefixes of equal length.
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Registered routes in order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the route with the longest prefix that also accepts the
    /// function name derived from `path`.
    ///
    /// A longer prefix whose name filter rejects the request never beats
    /// a shorter prefix that accepts it.
    pub fn best_route(&self, path: &str) -> Option<(&Route, String)> {
        let mut best: Option<(&Route, String)> = None;

        for route in &self.routes {
            let config = &route.config;
            if !config.path_matches(path) {
                continue;
            }
            if let Some((current, _)) = &best {
                if config.path.len() <= current.config.path.len() {
                    continue;
                }
            }
            match config.accepted_function(path) {
                Some(name) => best = Some((route, name)),
                None => debug!("Route {} rejects function name for {}", config.path, path),
            }
        }

        best
    }

    /// Select the route for `req` and encode the request for it.
    ///
    /// The body is read only once, for the winning route. Encoding errors
    /// are returned as-is.
    pub async fn select_route<B>(
        &self,
        req: Request<B>,
    ) -> Result<RouteMatch<'_, B>, GatewayError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let Some((route, function_name)) = self.best_route(req.uri().path()) else {
            debug!("No route for {}", req.uri().path());
            return Ok(RouteMatch::NoMatch(req));
        };

        debug!(
            "Route {} selected for {} -> {}",
            route.config.path,
            req.uri().path(),
            function_name
        );

        let invocation = route.config.build_invocation(function_name, req).await?;
        Ok(RouteMatch::Matched { route, invocation })
    }
}
