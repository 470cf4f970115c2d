//! Request descriptors

use crate::config::RequestConfig;
use crate::error::{Result, RxHttpError};
use crate::form::{FormData, to_form_data};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Encoded request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`
    Json(Value),
    /// Sent as `multipart/form-data`, one text part per entry
    Form(FormData),
}

impl RequestBody {
    /// Encode `data` as a JSON body
    pub fn json<D: Serialize + ?Sized>(data: &D) -> Result<Self> {
        serde_json::to_value(data)
            .map(RequestBody::Json)
            .map_err(|e| RxHttpError::InvalidBody(e.to_string()))
    }

    /// Encode `data` as a form body
    pub fn form<D: Serialize + ?Sized>(data: &D) -> Result<Self> {
        to_form_data(data, None).map(RequestBody::Form)
    }
}

/// Everything needed to issue one request
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub body: Option<RequestBody>,
    pub config: RequestConfig,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            config: RequestConfig::default(),
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve the target URL against an optional base URL
    ///
    /// Absolute URLs are used as-is. Otherwise base and path are joined with a
    /// single `/`.
    pub fn resolve_url(&self, base_url: Option<&str>) -> Result<Url> {
        match base_url {
            Some(base) if !is_absolute_url(&self.url) => {
                let joined = if self.url.is_empty() {
                    base.to_string()
                } else {
                    format!(
                        "{}/{}",
                        base.trim_end_matches('/'),
                        self.url.trim_start_matches('/')
                    )
                };
                Ok(Url::parse(&joined)?)
            }
            _ => Ok(Url::parse(&self.url)?),
        }
    }
}

/// `scheme://` or protocol-relative `//`
fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    match url.find("://") {
        Some(pos) => {
            let scheme = &url[..pos];
            !scheme.is_empty()
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
