//! Observable HTTP client

use crate::cancel::AbortSignal;
use crate::config::{ClientConfig, RequestConfig};
use crate::error::{Result, RxHttpError};
use crate::form::{self, FormData, FormSerializerOptions};
use crate::request::{RequestBody, RequestDescriptor};
use crate::response::{Response, decode_body, status_text};
use crate::rx::{Observable, observify};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

const INSTEAD_MSG: &str = "Instead, unsubscribe from the observable to cancel the request.";

/// Observable returned by every request method
pub type HttpObservable<T> = Observable<Response<T>, RxHttpError>;

/// HTTP client whose requests are cold observables
///
/// Nothing is sent until the returned observable is subscribed to (or
/// awaited). Unsubscribing before the response arrives aborts the request.
///
/// # Example
/// ```no_run
/// use rx_reqwest::{ClientConfig, RxClient};
/// use serde_json::Value;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RxClient::create(ClientConfig::new().with_base_url("http://localhost:8080"))?;
///
/// let subscription = client.get::<Value>("/users", None).subscribe_with(
///     |response| println!("{}: {:?}", response.status, response.data),
///     |error| eprintln!("request failed: {}", error),
///     || println!("done"),
/// );
///
/// // Changed our mind: cancels the request if it is still in flight
/// subscription.unsubscribe();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RxClient {
    config: Arc<ClientConfig>,
    http_client: Client,
}

impl RxClient {
    /// Client with default settings
    pub fn new() -> Self {
        Self::of(Client::new())
    }

    /// Wrap an existing reqwest client
    pub fn of(http_client: Client) -> Self {
        Self {
            config: Arc::new(ClientConfig::default()),
            http_client,
        }
    }

    /// Build a client from configuration
    pub fn create(config: ClientConfig) -> Result<Self> {
        if let Some(ref base_url) = config.base_url {
            Url::parse(base_url)?;
        }

        let mut builder = Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let mut headers = config.headers.clone();
        if let Some(ref token) = config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| RxHttpError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        builder = builder.default_headers(headers);

        let http_client = builder.build()?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    /// Whether `error` came from this client or the HTTP layer beneath it
    pub fn is_client_error(error: &(dyn std::error::Error + 'static)) -> bool {
        error.is::<RxHttpError>() || error.is::<reqwest::Error>()
    }

    /// Whether `error` is the result of an aborted request
    pub fn is_cancel(error: &(dyn std::error::Error + 'static)) -> bool {
        error
            .downcast_ref::<RxHttpError>()
            .is_some_and(RxHttpError::is_cancel)
    }

    /// See [`form::to_form_data`]
    pub fn to_form_data<S: Serialize + ?Sized>(
        source: &S,
        options: Option<FormSerializerOptions>,
    ) -> Result<FormData> {
        form::to_form_data(source, options)
    }

    /// See [`form::form_to_json`]
    pub fn form_to_json(form: &FormData) -> Value {
        form::form_to_json(form)
    }

    /// Client-wide defaults
    pub fn defaults(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying reqwest client
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Issue a request from a full descriptor
    pub fn request<T>(&self, descriptor: RequestDescriptor) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let RequestDescriptor {
            method,
            url,
            body,
            config,
        } = descriptor;
        let descriptor = Arc::new(RequestDescriptor {
            method,
            url,
            body,
            config: sanitize_config(config),
        });
        let client = self.clone();

        observify(move |signal| {
            let client = client.clone();
            let descriptor = Arc::clone(&descriptor);
            async move { client.execute(&descriptor, signal).await }
        })
    }

    pub fn get<T>(&self, url: &str, config: Option<RequestConfig>) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.without_body(Method::GET, url, config)
    }

    pub fn delete<T>(&self, url: &str, config: Option<RequestConfig>) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.without_body(Method::DELETE, url, config)
    }

    pub fn head<T>(&self, url: &str, config: Option<RequestConfig>) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.without_body(Method::HEAD, url, config)
    }

    pub fn options<T>(&self, url: &str, config: Option<RequestConfig>) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.without_body(Method::OPTIONS, url, config)
    }

    /// POST with a JSON body
    pub fn post<T, D>(
        &self,
        url: &str,
        data: Option<&D>,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
        D: Serialize + ?Sized,
    {
        self.with_body(Method::POST, url, data.map(RequestBody::json), config)
    }

    /// PUT with a JSON body
    pub fn put<T, D>(
        &self,
        url: &str,
        data: Option<&D>,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
        D: Serialize + ?Sized,
    {
        self.with_body(Method::PUT, url, data.map(RequestBody::json), config)
    }

    /// PATCH with a JSON body
    pub fn patch<T, D>(
        &self,
        url: &str,
        data: Option<&D>,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
        D: Serialize + ?Sized,
    {
        self.with_body(Method::PATCH, url, data.map(RequestBody::json), config)
    }

    /// POST with a multipart form body
    pub fn post_form<T, D>(
        &self,
        url: &str,
        data: Option<&D>,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
        D: Serialize + ?Sized,
    {
        self.with_body(Method::POST, url, data.map(RequestBody::form), config)
    }

    /// PUT with a multipart form body
    pub fn put_form<T, D>(
        &self,
        url: &str,
        data: Option<&D>,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
        D: Serialize + ?Sized,
    {
        self.with_body(Method::PUT, url, data.map(RequestBody::form), config)
    }

    /// PATCH with a multipart form body
    pub fn patch_form<T, D>(
        &self,
        url: &str,
        data: Option<&D>,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
        D: Serialize + ?Sized,
    {
        self.with_body(Method::PATCH, url, data.map(RequestBody::form), config)
    }

    fn without_body<T>(
        &self,
        method: Method,
        url: &str,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.request(RequestDescriptor::new(method, url).with_config(config.unwrap_or_default()))
    }

    fn with_body<T>(
        &self,
        method: Method,
        url: &str,
        body: Option<Result<RequestBody>>,
        config: Option<RequestConfig>,
    ) -> HttpObservable<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let config = config.unwrap_or_default();

        match body.transpose() {
            Ok(Some(body)) => self.request(
                RequestDescriptor::new(method, url)
                    .with_body(body)
                    .with_config(config),
            ),
            Ok(None) => self.request(RequestDescriptor::new(method, url).with_config(config)),
            Err(error) => {
                // Same advisories as a request that got this far
                sanitize_config(config);
                // Encoding failures surface on subscription like any other request failure
                let message = match error {
                    RxHttpError::InvalidBody(message) => message,
                    other => other.to_string(),
                };
                observify(move |_| {
                    let message = message.clone();
                    async move { Err(RxHttpError::InvalidBody(message)) }
                })
            }
        }
    }

    async fn execute<T>(
        &self,
        descriptor: &RequestDescriptor,
        signal: AbortSignal,
    ) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let url = descriptor.resolve_url(self.config.base_url.as_deref())?;
        let config = &descriptor.config;

        tracing::debug!(method = %descriptor.method, url = %url, "sending request");

        let mut builder = self
            .http_client
            .request(descriptor.method.clone(), url)
            .headers(config.headers.clone());

        if !config.params.is_empty() {
            builder = builder.query(&config.params);
        }

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(ref auth) = config.auth {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }

        builder = match descriptor.body {
            Some(RequestBody::Json(ref value)) => builder.json(value),
            Some(RequestBody::Form(ref form)) => {
                let multipart = form
                    .iter()
                    .fold(Form::new(), |multipart, (key, value)| {
                        multipart.text(key.to_string(), value.to_string())
                    });
                builder.multipart(multipart)
            }
            None => builder,
        };

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let url = response.url().clone();
            let body = response.text().await?;
            Ok::<_, RxHttpError>((status, headers, url, body))
        };

        let (status, headers, url, body) = tokio::select! {
            biased;
            _ = signal.aborted() => {
                tracing::debug!(method = %descriptor.method, "request aborted");
                return Err(RxHttpError::Canceled);
            }
            exchange = exchange => exchange?,
        };

        if !config.accepts(status) {
            return Err(RxHttpError::Status { status, body });
        }

        let data = decode_body(&body, config.response_type)?;
        tracing::trace!(status = %status, "request settled");

        Ok(Response {
            data,
            status,
            status_text: status_text(status),
            headers,
            url,
        })
    }
}

impl Default for RxClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip cancellation options the client cannot honour
///
/// Each subscription owns its own abort signal, so a caller-supplied signal or
/// cancel token would never be observed. They are removed with a warning.
pub(crate) fn sanitize_config(mut config: RequestConfig) -> RequestConfig {
    if config.cancel_token.take().is_some() {
        tracing::warn!(
            "Use of \"cancel_token\" is deprecated and has no effect on rx-reqwest. {}",
            INSTEAD_MSG
        );
    }

    if config.signal.take().is_some() {
        tracing::warn!("Use of \"signal\" has no effect on rx-reqwest. {}", INSTEAD_MSG);
    }

    config
}
