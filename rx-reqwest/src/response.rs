//! Response type

use crate::config::ResponseType;
use crate::error::Result;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Settled HTTP response with its decoded body
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub data: T,
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
    pub url: Url,
}

impl<T> Response<T> {
    /// Replace the body, keeping status and headers
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            data: f(self.data),
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
            url: self.url,
        }
    }
}

/// Decode a raw body into `T`
///
/// An empty JSON body decodes as `null`, so `()`, `Option<_>` and `Value` all
/// work for bodiless responses.
pub(crate) fn decode_body<T: DeserializeOwned>(
    body: &str,
    response_type: ResponseType,
) -> Result<T> {
    let value = match response_type {
        ResponseType::Json if body.trim().is_empty() => Value::Null,
        ResponseType::Json => serde_json::from_str(body)?,
        ResponseType::Text => Value::String(body.to_string()),
    };
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}
