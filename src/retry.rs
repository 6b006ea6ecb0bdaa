use std::sync::Arc;

use serde_json::json;
use tokio::time::sleep;

use crate::{
    logging::{Logger, Metadata},
    policy::{Outcome, RetryPolicy},
    transport::{InvalidRequest, Transport, TransportRequest, TransportResponse},
    HttpError, Result,
};

/// Wraps a [`Transport`] with the retry loop.
///
/// The wrapped transport is never reconfigured; all retry state lives in
/// the stack frame of [`Retrying::execute`], so one instance serves any
/// number of concurrent calls. Dropping the returned future aborts the
/// in-flight attempt and any pending backoff sleep.
#[derive(Clone)]
pub struct Retrying<T> {
    inner: T,
    pub(crate) policy: RetryPolicy,
    pub(crate) logger: Arc<dyn Logger>,
}

impl<T: Transport> Retrying<T> {
    /// Wraps `inner`, retrying under `policy` and reporting retries to `logger`.
    pub fn new(inner: T, policy: RetryPolicy, logger: Arc<dyn Logger>) -> Self {
        Self {
            inner,
            policy,
            logger,
        }
    }

    /// Retry budget and backoff applied to every call.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends `request` until it succeeds, fails terminally or runs out of retries.
    ///
    /// 2xx responses are returned as-is. A non-transient failure is returned
    /// unchanged; a transient one that used up the budget comes back as
    /// [`HttpError::RetryExhausted`] wrapping the final attempt's error.
    pub async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let mut attempt = 0u32;
        loop {
            let err = match self.inner.send(request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => HttpError::Http {
                    status: response.status,
                    body: response.body,
                },
                Err(err) => match err.downcast::<InvalidRequest>() {
                    Ok(invalid) => return Err(HttpError::InvalidRequest(invalid.0)),
                    Err(err) => HttpError::Network(err),
                },
            };
            let outcome = match err.outcome() {
                Some(outcome) => outcome,
                None => return Err(err),
            };

            if self.policy.should_retry(&outcome, attempt) {
                attempt += 1;
                self.log_retry(request, attempt, outcome);
                sleep(self.policy.next_delay(attempt - 1)).await;
                continue;
            }

            if self.policy.is_transient(&outcome) {
                return Err(HttpError::RetryExhausted {
                    attempts: attempt + 1,
                    last: Box::new(err),
                });
            }
            return Err(err);
        }
    }

    fn log_retry(&self, request: &TransportRequest, attempt: u32, outcome: Outcome) {
        let max = self.policy.max_retries;
        let status = match outcome {
            Outcome::Status(status) => json!(status),
            Outcome::NetworkFailure => json!(outcome.to_string()),
        };

        let mut metadata = Metadata::new();
        metadata.insert("method".to_owned(), json!(request.method.as_str()));
        metadata.insert("url".to_owned(), json!(request.url));
        metadata.insert("attempt".to_owned(), json!(attempt));
        metadata.insert("max_retries".to_owned(), json!(max));
        metadata.insert("status".to_owned(), status);

        self.logger.warn(
            &format!(
                "Retrying {} {} (attempt {attempt}/{max}) - {outcome}",
                request.method, request.url
            ),
            &metadata,
        );
    }
}
