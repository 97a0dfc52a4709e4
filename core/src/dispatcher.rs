//! Executes resolved requests and classifies their outcome.
//!
//! # Design
//! One dispatch is one transport exchange: no retries, no partial results.
//! The outcome is exactly one of raw bytes (2xx) or one `NetworkError`.
//! The dispatcher holds no per-call state, so a single instance can serve
//! any number of concurrent dispatches.
//!
//! Diagnostic logging goes through `tracing`. Response bodies are only
//! logged when `log_response_bodies` is enabled, and logging never feeds
//! back into classification.

use std::time::Instant;

use bytes::Bytes;
use tracing::debug;

use crate::error::NetworkError;
use crate::http::{TransportRequest, TransportResponse};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    transport: T,
    log_response_bodies: bool,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            log_response_bodies: false,
        }
    }

    #[must_use]
    pub fn with_log_response_bodies(mut self, enabled: bool) -> Self {
        self.log_response_bodies = enabled;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `request` and return the payload of a 2xx response, or the
    /// classified error.
    pub async fn dispatch(&self, request: TransportRequest) -> Result<Bytes, NetworkError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "dispatching request");

        let started = Instant::now();
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(%method, %url, kind = %err.kind(), error = %err, "transport failure");
                return Err(NetworkError::transport(err));
            }
        };

        debug!(
            %method,
            %url,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );
        if self.log_response_bodies {
            debug!(body = %String::from_utf8_lossy(&response.body), "response body");
        }

        classify(response)
    }
}

/// Turn a complete response into the dispatch result.
pub fn classify(response: TransportResponse) -> Result<Bytes, NetworkError> {
    if response.is_success() {
        return Ok(response.body);
    }
    Err(NetworkError::from_status(response.status, response.body_text()))
}
