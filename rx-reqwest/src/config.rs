//! Client and per-request configuration

use crate::cancel::{AbortSignal, CancelToken};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Client-wide defaults, used by [`RxClient::create`](crate::RxClient::create)
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base URL that relative request URLs are resolved against
    pub base_url: Option<String>,
    /// Default request timeout
    pub timeout: Option<Duration>,
    /// Headers sent with every request
    pub headers: HeaderMap,
    /// Optional bearer token
    pub auth_token: Option<String>,
    /// User-Agent header
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the timeout for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a default header
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the authentication token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// HTTP basic auth credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// How the response body is turned into `data`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// Parse as JSON; an empty body is `null`
    #[default]
    Json,
    /// Keep the body as a string
    Text,
}

/// Decides whether a status resolves or rejects the request
pub type ValidateStatus = fn(StatusCode) -> bool;

/// Default status check: 2xx resolves
pub fn default_validate_status(status: StatusCode) -> bool {
    status.is_success()
}

/// Per-request configuration bag
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Extra headers for this request
    pub headers: HeaderMap,
    /// Query string parameters
    pub params: Vec<(String, String)>,
    /// Request timeout, overriding the client default
    pub timeout: Option<Duration>,
    /// Basic auth credentials
    pub auth: Option<BasicCredentials>,
    /// Body decoding
    pub response_type: ResponseType,
    /// Status check, `2xx` when unset
    pub validate_status: Option<ValidateStatus>,
    /// Token-based cancellation. Has no effect, stripped with a warning.
    pub cancel_token: Option<CancelToken>,
    /// Caller-supplied signal. Has no effect, stripped with a warning.
    pub signal: Option<AbortSignal>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(BasicCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_validate_status(mut self, validate_status: ValidateStatus) -> Self {
        self.validate_status = Some(validate_status);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Apply the status check configured for this request
    pub(crate) fn accepts(&self, status: StatusCode) -> bool {
        self.validate_status.unwrap_or(default_validate_status)(status)
    }
}
