//! Request envelope sent to remote functions.

use crate::error::{BoxError, GatewayError};
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::Request;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized form of an inbound HTTP request.
///
/// This is the JSON payload a remote function receives. Header names are
/// kept in sorted order so the same request always encodes to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// HTTP method, e.g. `PUT`.
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// Raw query string, empty when the request has none.
    #[serde(default)]
    pub query: String,
    /// Header values grouped by lowercase header name.
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,
    /// Request body as text.
    #[serde(default)]
    pub body: String,
}

impl RequestEnvelope {
    /// Encode a request, consuming its body.
    ///
    /// Multiple values of the same header keep their order. Bytes that are
    /// not valid UTF-8 are replaced with U+FFFD.
    pub async fn encode<B>(req: Request<B>) -> Result<Self, GatewayError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in parts.headers.iter() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = body
            .collect()
            .await
            .map_err(GatewayError::from_body_error)?
            .to_bytes();

        Ok(Self {
            method: parts.method.as_str().to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().unwrap_or_default().to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Serialize the envelope into an invocation payload.
    pub fn to_payload(&self) -> Result<Bytes, GatewayError> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| GatewayError::encoding(e.to_string()))
    }
}
