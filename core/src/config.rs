use std::time::Duration;

/// Environment variable holding the default base URL.
pub const ENV_BASE_URL: &str = "NETDISPATCH_BASE_URL";
/// Environment variable enabling response-body diagnostics (`1` or `true`).
pub const ENV_LOG_BODIES: &str = "NETDISPATCH_LOG_BODIES";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_USER_AGENT: &str = concat!("netdispatch/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every request a client sends.
///
/// `new` uses built-in defaults; `from_env` (and `Default`) additionally
/// read `NETDISPATCH_BASE_URL` and `NETDISPATCH_LOG_BODIES`. An empty base
/// URL is allowed; every request then fails resolution with
/// `NetworkError::InvalidRequest`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    default_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    follow_redirects: bool,
    user_agent: String,
    log_response_bodies: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: Vec::new(),
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_response_bodies: false,
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_BASE_URL)
            .ok()
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let log_response_bodies = std::env::var(ENV_LOG_BODIES)
            .ok()
            .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"));

        Self::new(base_url).with_log_response_bodies(log_response_bodies)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Add a header sent with every request. A later call with the same
    /// name (any case) replaces the earlier value.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    /// Total per-request timeout. `None` disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Log response bodies at debug level. Never affects classification.
    #[must_use]
    pub fn with_log_response_bodies(mut self, enabled: bool) -> Self {
        self.log_response_bodies = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn log_response_bodies(&self) -> bool {
        self.log_response_bodies
    }
}
