use std::{fmt, sync::Arc, time::Duration};

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::{
    logging::{Logger, TracingLogger},
    options::{ClientOptions, RequestOptions},
    policy::RetryPolicy,
    retry::Retrying,
    schema::{decode_body, ResponseSchema},
    transport::{ReqwestTransport, Transport, TransportRequest},
    HttpError, Method, RequestConfig, Result,
};

/// HTTP client that retries transient failures and validates responses.
///
/// Cloning is cheap; clones share the transport, policy, logger and defaults.
pub struct HttpClient<T = ReqwestTransport> {
    inner: Arc<Inner<T>>,
}

/// Client state; the retry policy lives only in `retrying`.
#[derive(Clone)]
struct Inner<T> {
    retrying: Retrying<T>,
    timeout_ms: u64,
    base_url: Option<String>,
    default_headers: HeaderMap,
}

impl<T> Inner<T> {
    fn apply(&mut self, options: ClientOptions) {
        let ClientOptions {
            timeout_ms,
            retry,
            base_url,
            default_headers,
        } = options;
        self.retrying.policy = retry;
        self.timeout_ms = timeout_ms;
        self.base_url = base_url;
        self.default_headers = default_headers;
    }
}

impl<T> Clone for HttpClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for HttpClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout_ms", &self.inner.timeout_ms)
            .field("retry", &self.inner.retrying.policy)
            .field("default_headers", &"<redacted>")
            .finish()
    }
}

impl HttpClient<ReqwestTransport> {
    /// Creates a client over a fresh `reqwest` transport with default options.
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }
}

impl Default for HttpClient<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport + Clone> HttpClient<T> {
    /// Applies client options such as timeout and retry behavior.
    ///
    /// Existing clones keep the options they were created with.
    pub fn with_options(self, options: ClientOptions) -> Self {
        let mut inner = self.into_inner();
        inner.apply(options);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Replaces the logger retry events are written to.
    pub fn with_logger(self, logger: Arc<dyn Logger>) -> Self {
        let mut inner = self.into_inner();
        inner.retrying.logger = logger;
        Self {
            inner: Arc::new(inner),
        }
    }

    fn into_inner(self) -> Inner<T> {
        Arc::try_unwrap(self.inner).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl<T: Transport> HttpClient<T> {
    /// Creates a client over `transport` with default options and a
    /// [`TracingLogger`].
    pub fn with_transport(transport: T) -> Self {
        Self::from_parts(
            transport,
            ClientOptions::default(),
            Arc::new(TracingLogger::default()),
        )
    }

    /// Creates a client from all of its dependencies.
    pub fn from_parts(transport: T, options: ClientOptions, logger: Arc<dyn Logger>) -> Self {
        let ClientOptions {
            timeout_ms,
            retry,
            base_url,
            default_headers,
        } = options;
        let inner = Inner {
            retrying: Retrying::new(transport, retry, logger),
            timeout_ms,
            base_url,
            default_headers,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Retry budget and backoff shared by every call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        self.inner.retrying.policy()
    }

    /// Default per-attempt timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.inner.timeout_ms
    }

    /// Prefix applied to relative request URLs.
    pub fn base_url(&self) -> Option<&str> {
        self.inner.base_url.as_deref()
    }

    /// Issues `config`, retrying transient failures, and validates the body.
    pub async fn request<S: ResponseSchema>(&self, config: RequestConfig<S>) -> Result<S::Output> {
        let RequestConfig {
            method,
            url,
            body,
            options,
        } = config;
        let request = self.build_request(method, &url, body, &options);

        let response = self.inner.retrying.execute(&request).await?;
        let body = decode_body(&response.body);
        options.schema.validate(body).map_err(HttpError::from)
    }

    /// Sends a `GET` request.
    pub async fn get<S: ResponseSchema>(
        &self,
        url: &str,
        options: RequestOptions<S>,
    ) -> Result<S::Output> {
        self.request(RequestConfig::new(Method::Get, url).options(options))
            .await
    }

    /// Sends a `POST` request with an optional JSON body.
    pub async fn post<S: ResponseSchema>(
        &self,
        url: &str,
        body: Option<Value>,
        options: RequestOptions<S>,
    ) -> Result<S::Output> {
        self.request(with_body(Method::Post, url, body).options(options))
            .await
    }

    /// Sends a `PUT` request with an optional JSON body.
    pub async fn put<S: ResponseSchema>(
        &self,
        url: &str,
        body: Option<Value>,
        options: RequestOptions<S>,
    ) -> Result<S::Output> {
        self.request(with_body(Method::Put, url, body).options(options))
            .await
    }

    /// Sends a `PATCH` request with an optional JSON body.
    pub async fn patch<S: ResponseSchema>(
        &self,
        url: &str,
        body: Option<Value>,
        options: RequestOptions<S>,
    ) -> Result<S::Output> {
        self.request(with_body(Method::Patch, url, body).options(options))
            .await
    }

    /// Sends a `DELETE` request.
    pub async fn delete<S: ResponseSchema>(
        &self,
        url: &str,
        options: RequestOptions<S>,
    ) -> Result<S::Output> {
        self.request(RequestConfig::new(Method::Delete, url).options(options))
            .await
    }

    fn build_request<S>(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        options: &RequestOptions<S>,
    ) -> TransportRequest {
        let defaults = &self.inner;
        let mut headers = defaults.default_headers.clone();
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }
        let timeout_ms = options.timeout_ms.unwrap_or(defaults.timeout_ms);

        TransportRequest {
            method,
            url: resolve_url(defaults.base_url.as_deref(), url),
            headers,
            body,
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

fn with_body(method: Method, url: &str, body: Option<Value>) -> RequestConfig {
    let config = RequestConfig::new(method, url);
    match body {
        Some(body) => config.body(body),
        None => config,
    }
}

/// Joins `url` onto `base_url` unless it is already absolute.
fn resolve_url(base_url: Option<&str>, url: &str) -> String {
    match base_url {
        Some(base) if !is_absolute(url) => {
            let base = base.trim_end_matches('/');
            let path = url.trim_start_matches('/');
            if path.is_empty() {
                base.to_owned()
            } else {
                format!("{base}/{path}")
            }
        }
        _ => url.to_owned(),
    }
}

fn is_absolute(url: &str) -> bool {
    let prefix = |scheme: &str| {
        url.get(..scheme.len())
            .is_some_and(|value| value.eq_ignore_ascii_case(scheme))
    };
    prefix("http://") || prefix("https://")
}
