use std::{future::Future, time::Duration};

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::{error::BoxError, Method};

/// One fully resolved HTTP attempt.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Timeout for this attempt alone.
    pub timeout: Duration,
}

/// Status and raw body of a response, whatever the status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    /// Creates a response from a status code and raw body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request could not be built or sent as given; retrying cannot help.
///
/// Transports box this as their error to opt out of the retry loop.
#[derive(Debug, thiserror::Error)]
#[error("invalid request: {0}")]
pub struct InvalidRequest(#[source] pub BoxError);

/// Performs a single network round trip.
///
/// Any response, error statuses included, is `Ok`. `Err` means no response
/// was obtained at all, unless the error is an [`InvalidRequest`].
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, BoxError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport over a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses an existing `reqwest::Client` and its connection pool.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, BoxError> {
        let mut builder = self
            .http
            .request(request.method.into(), &request.url)
            .headers(request.headers.clone())
            .timeout(request.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| -> BoxError {
            if err.is_builder() {
                Box::new(InvalidRequest(Box::new(err)))
            } else {
                Box::new(err)
            }
        })?;
        let status = response.status();
        match response.text().await {
            Ok(body) => Ok(TransportResponse::new(status.as_u16(), body)),
            // An error status is still worth classifying without its body.
            Err(_) if !status.is_success() => Ok(TransportResponse::new(status.as_u16(), "")),
            Err(err) => Err(err.into()),
        }
    }
}
