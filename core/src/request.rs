//! Request descriptors and their resolution into transport requests.
//!
//! # Design
//! A descriptor says *what* to send relative to some API: method, path,
//! headers, query and body. It knows nothing about hosts or default headers.
//! `resolve` combines it with a base URL and the client's default headers
//! into a `TransportRequest`, failing with `NetworkError::InvalidRequest`
//! when that is impossible. Resolution is pure: no I/O, no logging.
//!
//! Header precedence: default headers are applied first and a descriptor
//! header with the same name (compared case-insensitively) replaces them.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::Serialize;

use crate::error::NetworkError;
use crate::http::{HttpMethod, TransportRequest};

/// Anything that can describe an HTTP request relative to a base URL.
///
/// Only `method` and `path` are required; the rest default to empty.
pub trait Request {
    fn method(&self) -> HttpMethod;

    /// Path relative to the client's base URL, e.g. `/users/1`.
    fn path(&self) -> &str;

    fn headers(&self) -> &[(String, String)] {
        &[]
    }

    fn query(&self) -> &[(String, String)] {
        &[]
    }

    fn body(&self) -> Option<Bytes> {
        None
    }

    fn to_transport_request(
        &self,
        base_url: &str,
        default_headers: &[(String, String)],
    ) -> Result<TransportRequest, NetworkError> {
        resolve(self, base_url, default_headers)
    }
}

/// Plain-data `Request` implementation with a consuming builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    path: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Set a header, replacing any existing header with the same name
    /// regardless of case.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Append a query parameter. Repeated keys are kept in order.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and set `content-type` accordingly.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, NetworkError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| NetworkError::InvalidRequest(format!("failed to serialize body: {e}")))?;
        Ok(self.with_header("content-type", "application/json").with_body(body))
    }
}

impl Request for RequestDescriptor {
    fn method(&self) -> HttpMethod {
        self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    fn query(&self) -> &[(String, String)] {
        &self.query
    }

    fn body(&self) -> Option<Bytes> {
        self.body.clone()
    }
}

/// Resolve `request` against `base_url` and `default_headers`.
pub fn resolve<R: Request + ?Sized>(
    request: &R,
    base_url: &str,
    default_headers: &[(String, String)],
) -> Result<TransportRequest, NetworkError> {
    let url = resolve_url(base_url, request.path(), request.query())?;

    let mut headers = HeaderMap::new();
    for (name, value) in default_headers.iter().chain(request.headers()) {
        let (name, value) = parse_header(name, value)?;
        headers.insert(name, value);
    }

    Ok(TransportRequest {
        method: request.method(),
        url,
        headers,
        body: request.body(),
    })
}

/// Validate the base on its own, before any path is appended to it.
fn parse_base(base_url: &str) -> Result<Url, NetworkError> {
    let base = Url::parse(base_url)
        .map_err(|e| NetworkError::InvalidRequest(format!("invalid base URL `{base_url}`: {e}")))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(NetworkError::InvalidRequest(format!(
            "unsupported URL scheme `{}` in `{base_url}`",
            base.scheme()
        )));
    }
    if base.host_str().unwrap_or_default().is_empty() {
        return Err(NetworkError::InvalidRequest(format!(
            "base URL `{base_url}` has no host"
        )));
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(NetworkError::InvalidRequest(format!(
            "base URL `{base_url}` must not carry a query or fragment"
        )));
    }
    Ok(base)
}

fn resolve_url(base_url: &str, path: &str, query: &[(String, String)]) -> Result<Url, NetworkError> {
    let base = parse_base(base_url.trim())?;

    // `base` has a host and no query, so trimming only touches its path.
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)
        .map_err(|e| NetworkError::InvalidRequest(format!("invalid URL `{joined}`: {e}")))?;

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), NetworkError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| NetworkError::InvalidRequest(format!("invalid header name `{name}`")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| NetworkError::InvalidRequest(format!("invalid value for header `{name}`")))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "https://api.example.com";

    fn defaults() -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("X-Client".to_string(), "default".to_string()),
        ]
    }

    #[test]
    fn resolves_absolute_url_from_base_and_path() {
        let req = resolve(&RequestDescriptor::get("/users/1"), BASE_URL, &[]).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url.as_str(), "https://api.example.com/users/1");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn slashes_between_base_and_path_are_normalized() {
        for (base, path) in [
            ("https://api.example.com/", "/users/1"),
            ("https://api.example.com", "users/1"),
            ("https://api.example.com//", "//users/1"),
        ] {
            let req = resolve(&RequestDescriptor::get(path), base, &[]).unwrap();
            assert_eq!(req.url.as_str(), "https://api.example.com/users/1", "{base} + {path}");
        }
    }

    #[test]
    fn base_path_prefix_is_preserved() {
        let req = resolve(&RequestDescriptor::get("/users"), "http://localhost:3000/api/v1", &[]).unwrap();
        assert_eq!(req.url.as_str(), "http://localhost:3000/api/v1/users");
    }

    #[test]
    fn query_pairs_are_percent_encoded() {
        let descriptor = RequestDescriptor::get("/search")
            .with_query("q", "rust lang")
            .with_query("tag", "a&b");
        let req = resolve(&descriptor, BASE_URL, &[]).unwrap();
        assert_eq!(req.url.as_str(), "https://api.example.com/search?q=rust+lang&tag=a%26b");
    }

    #[test]
    fn query_pairs_extend_existing_query() {
        let descriptor = RequestDescriptor::get("/search?page=2").with_query("q", "x");
        let req = resolve(&descriptor, BASE_URL, &[]).unwrap();
        assert_eq!(req.url.query(), Some("page=2&q=x"));
    }

    #[test]
    fn unparseable_base_url_is_invalid_request() {
        for base in ["", "not a url", "api.example.com", "http://bad host"] {
            let err = resolve(&RequestDescriptor::get("/users/1"), base, &[]).unwrap_err();
            assert!(matches!(err, NetworkError::InvalidRequest(_)), "{base:?}: {err:?}");
        }
    }

    #[test]
    fn base_without_host_is_invalid_request() {
        for base in ["http://", "https:///", "http:", "  https://  "] {
            let err = resolve(&RequestDescriptor::get("/users/1"), base, &[]).unwrap_err();
            assert!(matches!(err, NetworkError::InvalidRequest(_)), "{base:?}: {err:?}");
        }
    }

    #[test]
    fn base_with_query_is_invalid_request() {
        let err = resolve(&RequestDescriptor::get("/users/1"), "https://api.example.com?key=1", &[]).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidRequest(msg) if msg.contains("query")));
    }

    #[test]
    fn base_with_fragment_is_invalid_request() {
        let err = resolve(&RequestDescriptor::get("/users/1"), "https://api.example.com/v1#frag", &[]).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidRequest(msg) if msg.contains("fragment")));
    }

    #[test]
    fn base_with_port_and_credentials_keeps_its_authority() {
        let req = resolve(&RequestDescriptor::get("/users"), "http://user:pw@localhost:8080/", &[]).unwrap();
        assert_eq!(req.url.as_str(), "http://user:pw@localhost:8080/users");
        assert_eq!(req.url.port(), Some(8080));
    }

    #[test]
    fn non_http_scheme_is_invalid_request() {
        let err = resolve(&RequestDescriptor::get("/file"), "ftp://files.example.com", &[]).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidRequest(msg) if msg.contains("ftp")));
    }

    #[test]
    fn default_headers_are_merged() {
        let req = resolve(&RequestDescriptor::get("/"), BASE_URL, &defaults()).unwrap();
        assert_eq!(req.headers["accept"], "application/json");
        assert_eq!(req.headers["x-client"], "default");
    }

    #[test]
    fn request_headers_override_defaults_case_insensitively() {
        let descriptor = RequestDescriptor::get("/").with_header("x-CLIENT", "override");
        let req = resolve(&descriptor, BASE_URL, &defaults()).unwrap();
        assert_eq!(req.headers.get_all("x-client").iter().count(), 1);
        assert_eq!(req.headers["x-client"], "override");
        assert_eq!(req.headers["accept"], "application/json");
    }

    #[test]
    fn builder_header_replaces_same_name() {
        let descriptor = RequestDescriptor::get("/")
            .with_header("Authorization", "Bearer a")
            .with_header("authorization", "Bearer b");
        assert_eq!(
            descriptor.headers(),
            &[("authorization".to_string(), "Bearer b".to_string())]
        );
    }

    #[test]
    fn invalid_header_is_invalid_request() {
        let descriptor = RequestDescriptor::get("/").with_header("bad header", "v");
        let err = resolve(&descriptor, BASE_URL, &[]).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidRequest(_)));

        let defaults = vec![("x-ok".to_string(), "line\nbreak".to_string())];
        let err = resolve(&RequestDescriptor::get("/"), BASE_URL, &defaults).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidRequest(_)));
    }

    #[test]
    fn json_body_sets_content_type() {
        let descriptor = RequestDescriptor::post("/users")
            .with_json(&serde_json::json!({"name": "Ada"}))
            .unwrap();
        let req = descriptor.to_transport_request(BASE_URL, &[]).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.headers["content-type"], "application/json");
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Ada");
    }

    #[test]
    fn raw_body_is_passed_through() {
        let descriptor = RequestDescriptor::put("/blob").with_body(vec![0u8, 159, 146, 150]);
        let req = resolve(&descriptor, BASE_URL, &[]).unwrap();
        assert_eq!(req.body.as_deref(), Some(&[0u8, 159, 146, 150][..]));
    }

    struct Ping;

    impl Request for Ping {
        fn method(&self) -> HttpMethod {
            HttpMethod::Head
        }

        fn path(&self) -> &str {
            "/ping"
        }
    }

    #[test]
    fn custom_request_types_use_trait_defaults() {
        let req = Ping.to_transport_request(BASE_URL, &defaults()).unwrap();
        assert_eq!(req.method, HttpMethod::Head);
        assert_eq!(req.url.as_str(), "https://api.example.com/ping");
        assert_eq!(req.headers.len(), 2);
        assert!(req.body.is_none());
    }
}
