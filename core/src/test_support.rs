//! Test-only utilities: a scripted transport and an environment guard.

use std::sync::{Mutex, PoisonError};

use bytes::Bytes;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{TransportRequest, TransportResponse};
use crate::transport::Transport;

#[derive(Debug)]
enum Outcome {
    Respond { status: u16, body: Bytes },
    Fail { kind: TransportErrorKind, message: String },
}

/// Transport that returns a fixed outcome and records every request it
/// receives.
#[derive(Debug)]
pub struct StubTransport {
    outcome: Outcome,
    requests: Mutex<Vec<TransportRequest>>,
}

impl StubTransport {
    pub fn respond(status: u16, body: impl Into<Bytes>) -> Self {
        Self::with_outcome(Outcome::Respond {
            status,
            body: body.into(),
        })
    }

    pub fn fail(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Fail {
            kind,
            message: message.into(),
        })
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Transport for StubTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        match &self.outcome {
            Outcome::Respond { status, body } => Ok(TransportResponse::new(*status, body.clone())),
            Outcome::Fail { kind, message } => Err(TransportError::new(*kind, message.clone())),
        }
    }
}

/// RAII guard for temporarily setting an environment variable.
///
/// The previous value (or its absence) is restored on drop. Use with
/// `#[serial(env)]`.
pub struct EnvGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    #[must_use]
    pub fn set(key: &'static str, val: &str) -> Self {
        let prev = std::env::var(key).ok();
        std::env::set_var(key, val);
        Self { key, prev }
    }

    #[must_use]
    pub fn remove(key: &'static str) -> Self {
        let prev = std::env::var(key).ok();
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}
