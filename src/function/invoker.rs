//! Invoker capability used to call remote functions.

use crate::error::GatewayError;
use async_trait::async_trait;
use bytes::Bytes;

/// A single call to a remote function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Resolved function name.
    pub function_name: String,
    /// Version or alias; empty means the unqualified function.
    pub qualifier: String,
    /// JSON-encoded [`RequestEnvelope`](crate::http::RequestEnvelope).
    pub payload: Bytes,
}

/// Raw outcome of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// Payload returned by the function, expected to be a reply envelope.
    pub payload: Bytes,
    /// Version that actually ran, when the backend reports it.
    pub executed_version: Option<String>,
}

impl InvocationResult {
    /// Create a result from a payload.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            executed_version: None,
        }
    }
}

/// Performs remote function invocations.
///
/// Implementations own transport concerns such as timeouts and
/// credentials. The gateway calls [`Invoker::invoke`] exactly once per
/// matched request and never retries.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Invoke a function and return its raw reply.
    async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResult, GatewayError>;
}
