use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Construction-time settings for an `HttpClient`
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Prefix for every endpoint; falls back to `API_BASE_URL`, then `/api`
    pub base_url: Option<String>,
    /// Zero or `None` selects the 10 second default
    pub timeout: Option<Duration>,
    /// Merged over the `Content-Type: application/json` default
    pub headers: HeaderMap,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Per-call overrides of the instance configuration
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub headers: HeaderMap,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}
