//! Client that resolves descriptors and hands them to a dispatcher.
//!
//! # Design
//! `ApiClient` holds the base URL, the default headers and a `Dispatcher`.
//! It carries no mutable state between calls and is cheap to clone when its
//! transport is. Resolution failures return before the transport is touched;
//! dispatch results are passed back unchanged. Payloads are never inspected
//! except by the opt-in `dispatch_json`.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{NetworkError, TransportError};
use crate::http::TransportRequest;
use crate::request::{self, Request};
use crate::transport::{ReqwestTransport, Transport};

#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    base_url: String,
    default_headers: Vec<(String, String)>,
    dispatcher: Dispatcher<T>,
}

impl ApiClient<ReqwestTransport> {
    /// Client for `base_url` with default settings and a reqwest transport.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Client using any transport. Transport-specific settings in `config`
    /// (timeouts, redirects, user agent) are the transport's concern.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let dispatcher =
            Dispatcher::new(transport).with_log_response_bodies(config.log_response_bodies());
        Self {
            base_url: config.base_url().to_string(),
            default_headers: config.default_headers().to_vec(),
            dispatcher,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn resolve<R: Request + ?Sized>(&self, request: &R) -> Result<TransportRequest, NetworkError> {
        request::resolve(request, &self.base_url, &self.default_headers)
    }

    /// Resolve and execute `request`, returning the raw payload.
    pub async fn dispatch<R: Request + ?Sized>(&self, request: &R) -> Result<Bytes, NetworkError> {
        let resolved = self.resolve(request)?;
        self.dispatcher.dispatch(resolved).await
    }

    /// Like `dispatch`, then decode the payload as JSON.
    pub async fn dispatch_json<R, O>(&self, request: &R) -> Result<O, NetworkError>
    where
        R: Request + ?Sized,
        O: DeserializeOwned,
    {
        let bytes = self.dispatch(request).await?;
        serde_json::from_slice(&bytes).map_err(|e| NetworkError::decoding(e, &bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;
    use crate::request::RequestDescriptor;
    use crate::test_support::StubTransport;

    fn client(stub: &Arc<StubTransport>) -> ApiClient<Arc<StubTransport>> {
        let config = ClientConfig::new("https://api.example.com")
            .with_default_header("Accept", "application/json")
            .with_default_header("X-Api-Version", "1");
        ApiClient::with_transport(config, Arc::clone(stub))
    }

    #[tokio::test]
    async fn get_user_scenario_yields_not_found() {
        let stub = Arc::new(StubTransport::respond(404, "not found"));
        let err = client(&stub)
            .dispatch(&RequestDescriptor::get("/users/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, NetworkError::NotFound(body) if body == "not found"));
        let sent = stub.requests();
        assert_eq!(sent[0].url.as_str(), "https://api.example.com/users/1");
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_transport() {
        let stub = Arc::new(StubTransport::respond(200, "unused"));
        let config = ClientConfig::new("not a base url");
        let client = ApiClient::with_transport(config, Arc::clone(&stub));

        let err = client.dispatch(&RequestDescriptor::get("/users/1")).await.unwrap_err();

        assert!(matches!(err, NetworkError::InvalidRequest(_)));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn default_headers_merge_with_request_precedence() {
        let stub = Arc::new(StubTransport::respond(200, "{}"));
        let descriptor = RequestDescriptor::get("/").with_header("x-api-version", "2");

        client(&stub).dispatch(&descriptor).await.unwrap();

        let sent = stub.requests();
        assert_eq!(sent[0].headers["accept"], "application/json");
        assert_eq!(sent[0].headers["x-api-version"], "2");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    #[tokio::test]
    async fn dispatch_json_decodes_payload() {
        let stub = Arc::new(StubTransport::respond(200, r#"{"id":1,"name":"Ada"}"#));
        let user: User = client(&stub).dispatch_json(&RequestDescriptor::get("/users/1")).await.unwrap();
        assert_eq!(
            user,
            User {
                id: 1,
                name: "Ada".to_string()
            }
        );
    }

    #[tokio::test]
    async fn dispatch_json_reports_decoding_error() {
        let stub = Arc::new(StubTransport::respond(200, "not json"));
        let err = client(&stub)
            .dispatch_json::<_, User>(&RequestDescriptor::get("/users/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::DecodingError(msg) if msg.ends_with("not json")));
    }

    #[tokio::test]
    async fn dispatch_json_passes_status_errors_through() {
        let stub = Arc::new(StubTransport::respond(401, "token expired"));
        let err = client(&stub)
            .dispatch_json::<_, User>(&RequestDescriptor::get("/me"))
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Unauthorized(body) if body == "token expired"));
    }

    #[tokio::test]
    async fn concurrent_dispatches_are_independent() {
        let stub = Arc::new(StubTransport::respond(200, "ok"));
        let client = client(&stub);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .dispatch(&RequestDescriptor::get(format!("/items/{i}")))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().as_ref(), b"ok");
        }
        assert_eq!(stub.calls(), 8);
    }
}
