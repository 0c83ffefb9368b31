//! Invoker speaking the Lambda `Invoke` REST API over plain HTTP.
//!
//! Requests go to `{endpoint}/2015-03-31/functions/{name}/invocations`,
//! which is served by local Lambda emulators. Requests are not signed.

use crate::error::GatewayError;
use crate::function::{InvocationRequest, InvocationResult, Invoker};
use crate::routing::BackendParams;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Endpoint used when a route does not configure one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9001";

const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";
const EXECUTED_VERSION_HEADER: &str = "x-amz-executed-version";

/// HTTP client for a Lambda-compatible invoke endpoint.
#[derive(Clone)]
pub struct LambdaHttpInvoker {
    client: Client<HttpConnector, Full<Bytes>>,
    endpoint: Url,
    timeout: Duration,
}

impl LambdaHttpInvoker {
    /// Create an invoker for the given endpoint.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| GatewayError::Config(format!("invalid endpoint {:?}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "endpoint {} cannot carry a path",
                endpoint
            )));
        }

        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// Create an invoker from a route's backend parameters.
    pub fn from_backend(backend: &BackendParams, timeout: Duration) -> Result<Self, GatewayError> {
        if !backend.aws_access.is_empty() {
            warn!(
                "Static credentials are configured for {} but invoke requests are not signed",
                backend.aws_region
            );
        }
        let endpoint = if backend.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            backend.endpoint.as_str()
        };
        Self::new(endpoint, timeout)
    }

    /// Build the URL for an invocation.
    pub fn invocation_url(&self, request: &InvocationRequest) -> Result<Url, GatewayError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::Invocation(format!("endpoint {} has no path", self.endpoint))
            })?
            .pop_if_empty()
            .extend([
                "2015-03-31",
                "functions",
                request.function_name.as_str(),
                "invocations",
            ]);
        if !request.qualifier.is_empty() {
            url.query_pairs_mut()
                .append_pair("Qualifier", &request.qualifier);
        }
        Ok(url)
    }

    async fn send(&self, request: InvocationRequest) -> Result<InvocationResult, GatewayError> {
        let url = self.invocation_url(&request)?;
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| GatewayError::Invocation(format!("invalid invocation uri: {}", e)))?;

        debug!("Invoking {} via {}", request.function_name, uri);

        let http_request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(request.payload))
            .map_err(|e| GatewayError::Invocation(e.to_string()))?;

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| GatewayError::Invocation(e.to_string()))?;

        let status = response.status();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let executed_version = response
            .headers()
            .get(EXECUTED_VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let payload = response
            .into_body()
            .collect()
            .await
            .map_err(|e| GatewayError::Invocation(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(GatewayError::Invocation(format!(
                "function {} returned {}: {}",
                request.function_name,
                status,
                String::from_utf8_lossy(&payload)
            )));
        }

        if let Some(kind) = function_error {
            return Err(GatewayError::Invocation(format!(
                "function {} raised {}: {}",
                request.function_name,
                kind,
                String::from_utf8_lossy(&payload)
            )));
        }

        Ok(InvocationResult {
            payload,
            executed_version,
        })
    }
}

#[async_trait]
impl Invoker for LambdaHttpInvoker {
    async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResult, GatewayError> {
        let function_name = request.function_name.clone();
        tokio::time::timeout(self.timeout, self.send(request))
            .await
            .map_err(|_| {
                GatewayError::Invocation(format!(
                    "function {} timed out after {:?}",
                    function_name, self.timeout
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Incoming;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    fn invocation(name: &str, qualifier: &str) -> InvocationRequest {
        InvocationRequest {
            function_name: name.to_string(),
            qualifier: qualifier.to_string(),
            payload: Bytes::from_static(b"{}"),
        }
    }

    /// Serve every connection with `respond` until the test ends.
    async fn spawn_backend<F>(respond: F) -> SocketAddr
    where
        F: Fn(Request<Incoming>) -> Response<Full<Bytes>> + Clone + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let respond = respond.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let respond = respond.clone();
                        async move { Ok::<_, Infallible>(respond(req)) }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_invocation_url() {
        let invoker = LambdaHttpInvoker::new("http://localhost:9001", Duration::from_secs(1)).unwrap();

        let url = invoker.invocation_url(&invocation("users", "")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9001/2015-03-31/functions/users/invocations"
        );

        let url = invoker.invocation_url(&invocation("users", "prod")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9001/2015-03-31/functions/users/invocations?Qualifier=prod"
        );
    }

    #[tokio::test]
    async fn test_invocation_url_keeps_endpoint_path() {
        let invoker = LambdaHttpInvoker::new("http://emulator/base/", Duration::from_secs(1)).unwrap();
        let url = invoker.invocation_url(&invocation("fn", "")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://emulator/base/2015-03-31/functions/fn/invocations"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            LambdaHttpInvoker::new("not a url", Duration::from_secs(1)),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            LambdaHttpInvoker::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(GatewayError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_from_backend_default_endpoint() {
        let invoker =
            LambdaHttpInvoker::from_backend(&BackendParams::default(), Duration::from_secs(1))
                .unwrap();
        assert_eq!(invoker.endpoint.as_str(), "http://127.0.0.1:9001/");
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let addr = spawn_backend(|req| {
            assert_eq!(*req.method(), Method::POST);
            assert_eq!(
                req.uri().path(),
                "/2015-03-31/functions/users/invocations"
            );
            assert_eq!(req.uri().query(), Some("Qualifier=prod"));
            Response::builder()
                .header(EXECUTED_VERSION_HEADER, "7")
                .body(Full::new(Bytes::from_static(br#"{"body":"hi"}"#)))
                .unwrap()
        })
        .await;

        let invoker =
            LambdaHttpInvoker::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let result = invoker.invoke(invocation("users", "prod")).await.unwrap();

        assert_eq!(result.payload, Bytes::from_static(br#"{"body":"hi"}"#));
        assert_eq!(result.executed_version.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_invoke_function_error() {
        let addr = spawn_backend(|_| {
            Response::builder()
                .header(FUNCTION_ERROR_HEADER, "Unhandled")
                .body(Full::new(Bytes::from_static(br#"{"errorMessage":"boom"}"#)))
                .unwrap()
        })
        .await;

        let invoker =
            LambdaHttpInvoker::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = invoker.invoke(invocation("users", "")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Invocation(_)));
    }

    #[tokio::test]
    async fn test_invoke_non_success_status() {
        let addr = spawn_backend(|_| {
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Full::new(Bytes::from_static(b"function not found")))
                .unwrap()
        })
        .await;

        let invoker =
            LambdaHttpInvoker::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = invoker.invoke(invocation("missing", "")).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
