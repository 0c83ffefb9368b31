//! # Fezz Gateway - HTTP to serverless function routing
//!
//! Fezz Gateway maps incoming HTTP requests onto remote function
//! invocations. Each configured route owns a path prefix; a request is sent
//! to the route with the longest matching prefix whose include/exclude
//! lists accept the function name derived from the request path.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────────────────────────┐
//! │ HTTP request │ ──▶ │ Router                                   │
//! └──────────────┘     │  longest prefix ∧ name accepted          │
//!                      └──────────────────────────────────────────┘
//!                          │ matched                │ no match
//!                          ▼                        ▼
//!                ┌───────────────────┐     ┌─────────────────┐
//!                │ RequestEnvelope   │     │ next handler    │
//!                │ → Invoker.invoke  │     └─────────────────┘
//!                │ → ReplyEnvelope   │
//!                └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fezz_gateway::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = GatewayConfig::new()
//!         .port(8080)
//!         .route(
//!             RouteConfig::new("/api/")
//!                 .include(["user*", "orders"])
//!                 .exclude(["*internal*"])
//!                 .name_prepend("shop-")
//!                 .qualifier("prod"),
//!         );
//!
//!     GatewayServer::from_config(config)?.run().await
//! }
//! ```
//!
//! A request to `/api/users` invokes `shop-users:prod` with a JSON payload
//! of the form:
//!
//! ```json
//! {"method": "GET", "path": "/api/users", "query": "", "headers": {}, "body": ""}
//! ```
//!
//! The function answers with:
//!
//! ```json
//! {"body": "...", "meta": {"status": 200, "headers": {"content-type": ["text/plain"]}}}
//! ```
//!
//! A missing or non-positive status becomes `200` and a missing
//! `content-type` becomes `application/json`.

pub mod error;
pub mod function;
pub mod http;
pub mod routing;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::{BoxError, GatewayError};
    pub use crate::function::{InvocationRequest, InvocationResult, Invoker, LambdaHttpInvoker};
    pub use crate::http::{ReplyEnvelope, RequestEnvelope};
    pub use crate::routing::{BackendParams, NamePattern, Route, RouteConfig, RouteMatch, Router};
    pub use crate::runtime::{
        full_body, Gateway, GatewayBody, GatewayConfig, GatewayServer, NextHandler, NotFound,
    };
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use error::GatewayError;
pub use routing::{RouteConfig, Router};
pub use runtime::{Gateway, GatewayConfig, GatewayServer};
