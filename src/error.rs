//! Gateway error type.

use crate::http::text_response;
use bytes::Bytes;
use http_body_util::{Full, LengthLimitError};
use hyper::{Response, StatusCode};
use thiserror::Error;

/// Boxed error carried by request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while routing a request to a remote function.
///
/// "No route matched" is not an error: it is reported as
/// [`RouteMatch::NoMatch`](crate::routing::RouteMatch::NoMatch).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The inbound request body could not be read to completion.
    #[error("failed to encode request: {message}")]
    Encoding {
        message: String,
        /// The body exceeded the configured size limit.
        body_too_large: bool,
    },

    /// The remote invocation failed.
    #[error("invocation failed: {0}")]
    Invocation(String),

    /// The invocation returned a payload that is not a valid reply envelope.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// The gateway configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    /// Encoding error with a plain message.
    pub fn encoding(message: impl Into<String>) -> Self {
        GatewayError::Encoding {
            message: message.into(),
            body_too_large: false,
        }
    }

    /// Encoding error from a body read failure.
    pub fn from_body_error(err: impl Into<BoxError>) -> Self {
        let err = err.into();
        GatewayError::Encoding {
            message: err.to_string(),
            body_too_large: err.is::<LengthLimitError>(),
        }
    }

    /// HTTP status used when this error reaches the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Encoding {
                body_too_large: true,
                ..
            } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Encoding { .. } | GatewayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Invocation(_) | GatewayError::MalformedReply(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl From<GatewayError> for Response<Full<Bytes>> {
    fn from(err: GatewayError) -> Self {
        text_response(err.status_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Limited};
    use hyper::header::CONTENT_TYPE;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            GatewayError::encoding("eof").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::Invocation("boom".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::MalformedReply("bad".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_body_limit_maps_to_payload_too_large() {
        let limited = Limited::new(Full::new(Bytes::from_static(b"too long")), 4);
        let err = GatewayError::from_body_error(limited.collect().await.unwrap_err());
        assert!(matches!(
            err,
            GatewayError::Encoding {
                body_too_large: true,
                ..
            }
        ));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = GatewayError::from_body_error(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_into_response() {
        let response: Response<Full<Bytes>> = GatewayError::Invocation("timed out".into()).into();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }
}
