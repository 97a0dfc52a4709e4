//! Declarative HTTP requests dispatched to raw bytes or a classified error.
//!
//! # Overview
//! Callers describe a request (method, path, headers, query, body) with a
//! `Request` implementation, usually `RequestDescriptor`. `ApiClient`
//! resolves it against a base URL and default headers, a `Dispatcher` runs
//! it through a `Transport`, and the caller receives either the response
//! bytes or exactly one `NetworkError`.
//!
//! # Design
//! - Response decoding is left to callers; `ApiClient::dispatch_json` is the
//!   only opt-in helper that decodes.
//! - Status classification is a pure function (`NetworkError::from_status`).
//! - No retries, no request queueing, no shared mutable state. The
//!   transport's connection pool is the only shared resource.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod request;
#[doc(hidden)]
pub mod test_support;
pub mod transport;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use dispatcher::Dispatcher;
pub use error::{NetworkError, TransportError, TransportErrorKind};
pub use http::{HttpMethod, TransportRequest, TransportResponse};
pub use request::{resolve, Request, RequestDescriptor};
pub use transport::{ReqwestTransport, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
