//! Network transports that execute a `TransportRequest`.
//!
//! # Design
//! A `Transport` only moves bytes: it returns whatever status the server
//! sent, or a `TransportError` when no complete response was received.
//! Status classification happens in the dispatcher, so every transport
//! reports 4xx/5xx responses as data rather than as errors.
//!
//! `ReqwestTransport` is the default and owns a pooled `reqwest::Client`
//! that is cheap to clone and safe to share across concurrent dispatches.
//! `UreqTransport` (cargo feature `ureq`) runs a blocking agent on tokio's
//! blocking pool.

use std::future::Future;
use std::sync::Arc;

use reqwest::redirect::Policy;

use crate::config::ClientConfig;
use crate::error::{TransportError, TransportErrorKind};
use crate::http::{TransportRequest, TransportResponse};

/// Executes one request and returns the raw response.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn execute(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        (**self).execute(request)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else if err.is_builder() || err.is_request() || err.is_redirect() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };
        TransportError::new(kind, err)
    }
}

/// Async transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let redirect = if config.follow_redirects() {
            Policy::default()
        } else {
            Policy::none()
        };
        let http = builder.redirect(redirect).build()?;
        Ok(Self { http })
    }

    /// Use an already configured `reqwest::Client`.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.http.request(method.into(), url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(feature = "ureq")]
pub use blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use bytes::Bytes;
    use reqwest::header::USER_AGENT;

    use super::Transport;
    use crate::config::ClientConfig;
    use crate::error::{TransportError, TransportErrorKind};
    use crate::http::{TransportRequest, TransportResponse};

    const MAX_REDIRECTS: u32 = 10;

    /// Blocking `ureq` agent driven from `tokio::task::spawn_blocking`.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
        user_agent: String,
    }

    impl UreqTransport {
        pub fn new(config: &ClientConfig) -> Self {
            let max_redirects = if config.follow_redirects() { MAX_REDIRECTS } else { 0 };
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(config.timeout())
                .timeout_connect(config.connect_timeout())
                .max_redirects(max_redirects)
                .build()
                .new_agent();
            Self {
                agent,
                user_agent: config.user_agent().to_string(),
            }
        }
    }

    impl Transport for UreqTransport {
        async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
            let agent = self.agent.clone();
            let user_agent = self.user_agent.clone();

            match tokio::task::spawn_blocking(move || run(&agent, &user_agent, request)).await {
                Ok(result) => result,
                // Only seen on runtime shutdown; dropping this future detaches the task.
                Err(join) if join.is_cancelled() => {
                    Err(TransportError::new(TransportErrorKind::Canceled, join))
                }
                Err(join) => Err(TransportError::new(TransportErrorKind::Other, join)),
            }
        }
    }

    fn run(
        agent: &ureq::Agent,
        user_agent: &str,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        if !request.headers.contains_key(USER_AGENT) {
            builder = builder.header(USER_AGENT.as_str(), user_agent);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_bytes());
        }

        let sent = match request.body {
            Some(body) => builder
                .body(body.to_vec())
                .map_err(|e| TransportError::new(TransportErrorKind::Request, e))
                .and_then(|req| agent.run(req).map_err(map_error)),
            None => builder
                .body(())
                .map_err(|e| TransportError::new(TransportErrorKind::Request, e))
                .and_then(|req| agent.run(req).map_err(map_error)),
        };
        let mut response = sent?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.body_mut().read_to_vec().map_err(map_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body: Bytes::from(body),
        })
    }

    fn map_error(err: ureq::Error) -> TransportError {
        let kind = match &err {
            ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
            ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
                TransportErrorKind::Connect
            }
            ureq::Error::BodyExceedsLimit(_) => TransportErrorKind::Body,
            _ => TransportErrorKind::Other,
        };
        TransportError::new(kind, err)
    }
}
