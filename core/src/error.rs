//! Error taxonomy for request resolution and dispatch.
//!
//! # Design
//! Every failure is produced directly at its site as one `NetworkError`
//! variant: resolution produces `InvalidRequest`, the transport produces
//! `TransportFailure`, a non-2xx response goes through `from_status`, and
//! caller-side decoding produces `DecodingError`. Nothing downstream inspects
//! error types to reclassify them.
//!
//! Each variant carries a human-readable diagnostic body. For status-derived
//! variants that is the response text (strict UTF-8, empty when the payload
//! is not text).

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Classified outcome of a failed resolution or dispatch.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The descriptor could not be resolved into a transport request. The
    /// network was never contacted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// 400.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// 402 or 405–499 without a dedicated variant.
    #[error("client error {status}: {body}")]
    ClientError4xx { status: u16, body: String },

    /// 500.
    #[error("server error: {0}")]
    ServerError(String),

    /// 501–599.
    #[error("server error {status}: {body}")]
    ServerError5xx { status: u16, body: String },

    /// A successful payload could not be decoded into the caller's type.
    #[error("decoding failed: {0}")]
    DecodingError(String),

    /// The exchange never produced a complete response.
    #[error("transport failure: {source}")]
    TransportFailure {
        #[source]
        source: TransportError,
        body: String,
    },

    /// Any status code with no other mapping.
    #[error("unknown error: {0}")]
    UnknownError(String),
}

impl NetworkError {
    /// Map a non-success status code to its variant.
    ///
    /// Total over `u16`: single-code cases win over the surrounding range,
    /// and anything unmapped (1xx, 2xx, 3xx, 418, 600+) is `UnknownError`.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400 => NetworkError::BadRequest(body),
            401 => NetworkError::Unauthorized(body),
            403 => NetworkError::Forbidden(body),
            404 => NetworkError::NotFound(body),
            // Unrecognized, not part of the client-error bucket below.
            418 => NetworkError::UnknownError(body),
            402 | 405..=499 => NetworkError::ClientError4xx { status, body },
            500 => NetworkError::ServerError(body),
            501..=599 => NetworkError::ServerError5xx { status, body },
            _ => NetworkError::UnknownError(body),
        }
    }

    /// Wrap a transport failure with no response body.
    pub fn transport(source: TransportError) -> Self {
        NetworkError::TransportFailure {
            source,
            body: String::new(),
        }
    }

    /// Build a `DecodingError` from any decoder error plus the payload that
    /// failed to decode. The payload is truncated to keep diagnostics small.
    pub fn decoding(err: impl fmt::Display, payload: &[u8]) -> Self {
        let snippet = String::from_utf8_lossy(&payload[..payload.len().min(400)]);
        NetworkError::DecodingError(format!("{err}: {snippet}"))
    }

    /// The status code this error was derived from, when it is known
    /// exactly from the variant.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::BadRequest(_) => Some(400),
            NetworkError::Unauthorized(_) => Some(401),
            NetworkError::Forbidden(_) => Some(403),
            NetworkError::NotFound(_) => Some(404),
            NetworkError::ServerError(_) => Some(500),
            NetworkError::ClientError4xx { status, .. }
            | NetworkError::ServerError5xx { status, .. } => Some(*status),
            NetworkError::InvalidRequest(_)
            | NetworkError::DecodingError(_)
            | NetworkError::TransportFailure { .. }
            | NetworkError::UnknownError(_) => None,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            NetworkError::InvalidRequest(body)
            | NetworkError::BadRequest(body)
            | NetworkError::Unauthorized(body)
            | NetworkError::Forbidden(body)
            | NetworkError::NotFound(body)
            | NetworkError::ServerError(body)
            | NetworkError::DecodingError(body)
            | NetworkError::UnknownError(body)
            | NetworkError::ClientError4xx { body, .. }
            | NetworkError::ServerError5xx { body, .. }
            | NetworkError::TransportFailure { body, .. } => body,
        }
    }
}

/// Coarse category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS, TCP or TLS setup failed.
    Connect,
    Timeout,
    /// The in-flight exchange was cancelled before it completed.
    Canceled,
    /// The response body could not be read.
    Body,
    /// The request could not be built or sent.
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Canceled => "canceled",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A low-level failure reported by a `Transport`, carrying the underlying
/// error.
#[derive(Debug, Error)]
#[error("{kind} error: {source}")]
pub struct TransportError {
    kind: TransportErrorKind,
    #[source]
    source: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(
        kind: TransportErrorKind,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// The error reported by the underlying transport library.
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.source
    }
}
