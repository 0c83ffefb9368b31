//! Gateway HTTP server.

use crate::error::GatewayError;
use crate::function::LambdaHttpInvoker;
use crate::http::text_response;
use crate::routing::{Route, Router};
use crate::runtime::{Gateway, GatewayConfig, NextHandler};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Gateway server.
///
/// Accepts HTTP/1 connections and passes every request through the
/// [`Gateway`] link. Routes are fixed for the lifetime of the server.
pub struct GatewayServer {
    /// Server configuration.
    config: Arc<GatewayConfig>,
    /// First link of the handler chain.
    gateway: Arc<Gateway>,
}

impl GatewayServer {
    /// Create a server around an existing gateway.
    pub fn new(config: GatewayConfig, gateway: Gateway) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        }
    }

    /// Build the routes described by `config`, each backed by a
    /// [`LambdaHttpInvoker`], with a 404 fallback.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let routes = config
            .routes
            .iter()
            .map(|route| {
                if route.path.is_empty() {
                    warn!("Route with an empty path never matches; use \"/\" to match every path");
                }
                let invoker = LambdaHttpInvoker::from_backend(&route.backend, config.timeout())?;
                Ok(Route::new(route.clone(), Arc::new(invoker)))
            })
            .collect::<Result<Vec<_>, GatewayError>>()?;

        let gateway = Gateway::with_not_found(Arc::new(Router::new(routes)));
        Ok(Self::new(config, gateway))
    }

    /// Get the gateway.
    pub fn gateway(&self) -> Arc<Gateway> {
        self.gateway.clone()
    }

    /// Start the HTTP server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("Gateway listening on {}", addr);
        for route in self.gateway.router().routes() {
            info!(
                "Route {} (qualifier {:?}, {} include, {} exclude)",
                route.config.path,
                route.config.qualifier,
                route.config.include.len(),
                route.config.exclude.len()
            );
        }

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let gateway = self.gateway.clone();
            let config = self.config.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let gateway = gateway.clone();
                    let config = config.clone();
                    async move { handle_request(req, gateway, config, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    gateway: Arc<Gateway>,
    config: Arc<GatewayConfig>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let request_id = generate_request_id();

    debug!(
        "Handling request: {} {} from {} [{}]",
        req.method(),
        req.uri().path(),
        remote_addr,
        request_id
    );

    if config.enable_health && req.uri().path() == "/_health" {
        return Ok(text_response(StatusCode::OK, "OK"));
    }

    let path = req.uri().path().to_string();
    let max_body_size = config.max_body_size;
    let req = req.map(|body| Limited::new(body, max_body_size).boxed_unsync());

    match gateway.handle(req).await {
        Ok(response) => Ok(response),
        Err(e) => {
            error!("Request {} failed: {} [{}]", path, e, request_id);
            Ok(e.into())
        }
    }
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{:x}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteConfig;

    #[tokio::test]
    async fn test_from_config_builds_routes() {
        let config = GatewayConfig::new()
            .route(RouteConfig::new("/a/"))
            .route(RouteConfig::new("/b/"));
        let server = GatewayServer::from_config(config).unwrap();

        let paths: Vec<_> = server
            .gateway()
            .router()
            .routes()
            .iter()
            .map(|r| r.config.path.clone())
            .collect();
        assert_eq!(paths, vec!["/a/", "/b/"]);
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_endpoint() {
        let mut route = RouteConfig::new("/a/");
        route.backend.endpoint = "not a url".into();
        let config = GatewayConfig::new().route(route);
        assert!(matches!(
            GatewayServer::from_config(config),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_generate_request_id() {
        let id = generate_request_id();
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
