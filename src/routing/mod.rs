//! Path-prefix routing of HTTP requests to remote functions.
//!
//! A [`Router`] holds the configured [`Route`]s. For each request it picks
//! the route with the longest matching path prefix whose include/exclude
//! lists accept the derived function name, then encodes the request into
//! an [`InvocationRequest`](crate::function::InvocationRequest).

mod pattern;
mod route;
mod router;

pub use pattern::{matches_glob, NamePattern};
pub use route::{BackendParams, RouteConfig};
pub use router::{Route, RouteMatch, Router};
