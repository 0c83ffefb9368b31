//! Reply envelope returned by remote functions.

use crate::error::GatewayError;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Content type applied when a reply does not set one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// HTTP metadata carried by a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMeta {
    /// Response status; zero or negative means "use the default".
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: i64,
    /// Response headers, each name with one or more values.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, Vec<String>>,
}

/// Parsed invocation reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    /// Response body as text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Status and headers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: ReplyMeta,
}

/// Read an explicit `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReplyEnvelope {
    /// Parse a raw invocation payload.
    pub fn decode(payload: &[u8]) -> Result<Self, GatewayError> {
        serde_json::from_slice(payload).map_err(|e| GatewayError::MalformedReply(e.to_string()))
    }

    /// Resolve the status code, substituting 200 when unset.
    pub fn status(&self) -> Result<StatusCode, GatewayError> {
        if self.meta.status <= 0 {
            return Ok(StatusCode::OK);
        }
        u16::try_from(self.meta.status)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| {
                GatewayError::MalformedReply(format!("invalid status {}", self.meta.status))
            })
    }

    /// Convert into an HTTP response, applying the response defaults.
    ///
    /// Reply headers are appended so multi-valued headers survive, then
    /// `content-type` falls back to [`DEFAULT_CONTENT_TYPE`]. Nothing is
    /// produced if any header or the status is invalid.
    pub fn into_response(self) -> Result<Response<Full<Bytes>>, GatewayError> {
        let status = self.status()?;
        let mut response = Response::new(Full::new(Bytes::from(self.body)));

        let headers = response.headers_mut();
        for (name, values) in &self.meta.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GatewayError::MalformedReply(format!("header {:?}: {}", name, e)))?;
            for value in values {
                let value = HeaderValue::from_str(value).map_err(|e| {
                    GatewayError::MalformedReply(format!("header {:?}: {}", name, e))
                })?;
                headers.append(name.clone(), value);
            }
        }

        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }

        *response.status_mut() = status;
        Ok(response)
    }
}

/// Build a plain-text response with the given status.
pub fn text_response(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(message.into())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}
