//! Per-route configuration and the request-to-invocation mapping.

use crate::error::{BoxError, GatewayError};
use crate::function::InvocationRequest;
use crate::http::RequestEnvelope;
use crate::routing::NamePattern;
use bytes::Bytes;
use hyper::body::Body;
use hyper::Request;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend connection parameters for a route.
///
/// Empty strings mean "use the ambient configuration". The values are
/// handed to the invoker untouched.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendParams {
    /// Access key id.
    #[serde(default)]
    pub aws_access: String,
    /// Secret access key.
    #[serde(default)]
    pub aws_secret: String,
    /// Backend region.
    #[serde(default)]
    pub aws_region: String,
    /// Base URL of the invoke endpoint.
    #[serde(default)]
    pub endpoint: String,
}

impl fmt::Debug for BackendParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("BackendParams")
            .field("aws_access", &redact(&self.aws_access))
            .field("aws_secret", &redact(&self.aws_secret))
            .field("aws_region", &self.aws_region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Settings for one path-prefix rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Path prefix this route answers for.
    pub path: String,
    /// Function names to accept; empty accepts every name.
    #[serde(default)]
    pub include: Vec<NamePattern>,
    /// Function names to reject; checked even when `include` is empty.
    #[serde(default)]
    pub exclude: Vec<NamePattern>,
    /// Text prepended to the derived function name.
    #[serde(default)]
    pub name_prepend: String,
    /// Text appended to the derived function name.
    #[serde(default)]
    pub name_append: String,
    /// Version or alias passed with every invocation.
    #[serde(default)]
    pub qualifier: String,
    /// Backend parameters for the invoker.
    #[serde(flatten)]
    pub backend: BackendParams,
}

impl RouteConfig {
    /// Create a route for the given path prefix.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add include patterns.
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include
            .extend(patterns.into_iter().map(|p| NamePattern::compile(p.as_ref())));
        self
    }

    /// Add exclude patterns.
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude
            .extend(patterns.into_iter().map(|p| NamePattern::compile(p.as_ref())));
        self
    }

    /// Set the name prefix decoration.
    pub fn name_prepend(mut self, prepend: impl Into<String>) -> Self {
        self.name_prepend = prepend.into();
        self
    }

    /// Set the name suffix decoration.
    pub fn name_append(mut self, append: impl Into<String>) -> Self {
        self.name_append = append.into();
        self
    }

    /// Set the invocation qualifier.
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    /// Set the backend parameters.
    pub fn backend(mut self, backend: BackendParams) -> Self {
        self.backend = backend;
        self
    }

    /// Check whether `path` falls under this route's prefix.
    ///
    /// The prefix must end on a segment boundary: `/api` covers `/api`
    /// and `/api/users` but not `/apis`. `/` covers every path. An empty
    /// prefix covers nothing.
    pub fn path_matches(&self, path: &str) -> bool {
        let prefix = self.path.as_str();
        if prefix.is_empty() {
            return false;
        }
        match path.strip_prefix(prefix) {
            Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Derive the function name for a request path.
    ///
    /// The base name is the last non-empty segment left after removing
    /// the route prefix, e.g. `/api/user` gives `user`. It is then wrapped
    /// in `name_prepend` and `name_append`.
    pub fn resolve_function_name(&self, path: &str) -> String {
        let rest = path.strip_prefix(self.path.as_str()).unwrap_or(path);
        let base = rest
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        format!("{}{}{}", self.name_prepend, base, self.name_append)
    }

    /// Check a function name against the include and exclude lists.
    ///
    /// Exclusions win over inclusions.
    pub fn accepts_function(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(name));
        included && !self.exclude.iter().any(|p| p.matches(name))
    }

    /// Resolve and filter the function name for `path` without touching
    /// any request body. `None` means this route does not apply.
    pub fn accepted_function(&self, path: &str) -> Option<String> {
        let name = self.resolve_function_name(path);
        self.accepts_function(&name).then_some(name)
    }

    /// Encode `req` into an invocation of `function_name`, consuming the body.
    pub async fn build_invocation<B>(
        &self,
        function_name: String,
        req: Request<B>,
    ) -> Result<InvocationRequest, GatewayError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let envelope = RequestEnvelope::encode(req).await?;
        Ok(InvocationRequest {
            function_name,
            qualifier: self.qualifier.clone(),
            payload: envelope.to_payload()?,
        })
    }

    /// Map a request to an invocation if this route accepts it.
    ///
    /// Returns `Ok(None)` when the derived name is filtered out; the
    /// request is dropped unread in that case.
    pub async fn maybe_build_invocation<B>(
        &self,
        req: Request<B>,
    ) -> Result<Option<InvocationRequest>, GatewayError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        match self.accepted_function(req.uri().path()) {
            Some(name) => self.build_invocation(name, req).await.map(Some),
            None => Ok(None),
        }
    }
}
