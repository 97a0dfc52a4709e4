//! Transport-level request and response types.
//!
//! # Design
//! A `TransportRequest` is what a descriptor becomes once it has been
//! resolved against a base URL and the client's default headers: an absolute
//! URL, a validated header map and an optional body. A `TransportResponse`
//! is what a `Transport` hands back before any status classification.
//!
//! Both are plain data with owned fields so any transport implementation can
//! consume or produce them without borrowing from the client.

use std::fmt;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// A fully resolved request, ready to be executed by a `Transport`.
///
/// Built by `Request::to_transport_request` (or `ApiClient::resolve`) and
/// consumed by exactly one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// A response as returned by the transport, before classification.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Strict UTF-8 view of the body; empty when the payload is not valid text.
    pub fn body_text(&self) -> String {
        std::str::from_utf8(&self.body).map(str::to_owned).unwrap_or_default()
    }
}
