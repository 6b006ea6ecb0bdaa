use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{
    policy::RetryPolicy,
    schema::{Json, Raw},
};

/// Configures base URL, default headers, timeout and retry behavior.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retry budget and backoff curve.
    pub retry: RetryPolicy,
    /// Prefix for request URLs that are not absolute.
    pub base_url: Option<String>,
    /// Sent with every request; per-call headers win on conflict.
    pub default_headers: HeaderMap,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            retry: RetryPolicy::default(),
            base_url: None,
            default_headers: HeaderMap::new(),
        }
    }
}

/// Per-call transport options and response contract.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions<S = Raw> {
    /// Extra headers for this call.
    pub headers: HeaderMap,
    /// Overrides [`ClientOptions::timeout_ms`] for this call.
    pub timeout_ms: Option<u64>,
    /// Contract the response body is validated against.
    pub schema: S,
}

impl RequestOptions<Raw> {
    /// Options with no headers, the client timeout and an untyped response.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> RequestOptions<S> {
    /// Adds a header for this call, overriding a default of the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Overrides the per-attempt timeout for this call.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Replaces the response contract.
    pub fn schema<S2>(self, schema: S2) -> RequestOptions<S2> {
        RequestOptions {
            headers: self.headers,
            timeout_ms: self.timeout_ms,
            schema,
        }
    }

    /// Types the response as `T` through `serde`.
    pub fn json<T>(self) -> RequestOptions<Json<T>> {
        self.schema(Json::new())
    }
}
